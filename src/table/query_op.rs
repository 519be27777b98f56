use super::reader::TableReader;
use crate::wdbc_value::{QueryRow, Record, WdbcValue};
use std::collections::BTreeMap;

/// Conjunctive equality filter: field index → required value.
pub type Filter = BTreeMap<u32, WdbcValue>;

#[inline]
fn passes(record: &Record, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(idx, want)| record.get(*idx).is_some_and(|have| have.matches(want)))
}

impl TableReader {
    /// First record whose `field` matches `key`, in row order.
    ///
    /// Linear scan. Callers doing repeated lookups should build their own
    /// index over [`TableReader::records`].
    pub fn record_by_key(&self, field: u32, key: &WdbcValue) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.get(field).is_some_and(|v| v.matches(key)))
    }

    /// Lookup on the conventional identity field 0.
    pub fn record_by_id(&self, id: u32) -> Option<&Record> {
        self.record_by_key(0, &WdbcValue::U32(id))
    }

    /// Filter then project, preserving row order.
    ///
    /// A filter index the record does not have never matches. With a
    /// projection each row holds exactly the requested indices, `None` for
    /// the ones the record lacks; without one, or with an empty one, every
    /// field is returned.
    pub fn query(&self, filter: &Filter, projection: Option<&[u32]>) -> Vec<QueryRow> {
        let rows: Vec<QueryRow> = self
            .records
            .iter()
            .filter(|r| passes(r, filter))
            .map(|r| match projection {
                Some(cols) if !cols.is_empty() => r.project(cols),
                _ => r.to_row(),
            })
            .collect();
        tracing::trace!(
            table = self.label.as_str(),
            filters = filter.len(),
            hits = rows.len(),
            "query"
        );
        rows
    }

    /// Like [`TableReader::query`] without projection, borrowing the records.
    pub fn filter<'a>(&'a self, filter: &'a Filter) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| passes(r, filter))
    }
}
