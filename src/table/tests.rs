// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════
mod table_reader_tests {
    use crate::error::WdbcError;
    use crate::format::FormatSpecification;
    use crate::table::{Filter, TableReader};
    use crate::types::{HEADER_SIZE, WDBC_SIGNATURE};
    use crate::wdbc_value::{QueryRow, WdbcValue};
    use std::io::Write;

    /// Assemble a WDBC image from already-encoded rows.
    fn build_wdbc(field_count: u32, record_size: u32, rows: &[Vec<u8>], strings: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&WDBC_SIGNATURE);
        buf.extend_from_slice(&(rows.len() as u32).to_le_bytes());
        buf.extend_from_slice(&field_count.to_le_bytes());
        buf.extend_from_slice(&record_size.to_le_bytes());
        buf.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        for row in rows {
            assert_eq!(row.len(), record_size as usize);
            buf.extend_from_slice(row);
        }
        buf.extend_from_slice(strings);
        buf
    }

    fn row_ifs(id: u32, f: f32, off: u32) -> Vec<u8> {
        let mut row = Vec::with_capacity(12);
        row.extend_from_slice(&id.to_le_bytes());
        row.extend_from_slice(&f.to_le_bytes());
        row.extend_from_slice(&off.to_le_bytes());
        row
    }

    /// Two rows, format "ifs": (1, 2.5, "foo") and (2, -1.0, "").
    fn sample_image() -> Vec<u8> {
        build_wdbc(
            3,
            12,
            &[row_ifs(1, 2.5, 1), row_ifs(2, -1.0, 0)],
            b"\0foo\0",
        )
    }

    fn sample_reader() -> TableReader {
        let spec = FormatSpecification::parse("ifs").unwrap();
        TableReader::from_bytes(&sample_image(), spec, "Sample.dbc").unwrap()
    }

    /// Five rows of "nib": id, group, flag.
    fn grouped_reader() -> TableReader {
        let rows: Vec<Vec<u8>> = [(10u32, 1u32, 0u8), (11, 2, 1), (12, 1, 1), (13, 3, 0), (14, 1, 0)]
            .iter()
            .map(|(id, group, flag)| {
                let mut r = Vec::new();
                r.extend_from_slice(&id.to_le_bytes());
                r.extend_from_slice(&group.to_le_bytes());
                r.push(*flag);
                r
            })
            .collect();
        let spec = FormatSpecification::parse("nib").unwrap();
        TableReader::from_bytes(&build_wdbc(3, 9, &rows, b"\0"), spec, "Grouped.dbc").unwrap()
    }

    fn ids(rows: &[QueryRow]) -> Vec<u32> {
        rows.iter()
            .map(|r| r[&0].as_ref().and_then(WdbcValue::as_u32).unwrap())
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Round-trip scenario
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_record_at() {
        let reader = sample_reader();
        assert_eq!(reader.len(), 2);

        let first = reader.record_at(0).unwrap();
        assert_eq!(first.get(0), Some(&WdbcValue::U32(1)));
        assert_eq!(first.get(1), Some(&WdbcValue::F32(2.5)));
        assert_eq!(first.get(2), Some(&WdbcValue::from("foo")));

        let second = reader.record_at(1).unwrap();
        assert_eq!(second.get(0), Some(&WdbcValue::U32(2)));
        assert_eq!(second.get(1), Some(&WdbcValue::F32(-1.0)));
        assert_eq!(second.get(2), Some(&WdbcValue::from("")));

        assert!(reader.record_at(2).is_none());
    }

    #[test]
    fn test_record_by_key() {
        let reader = sample_reader();
        let hit = reader.record_by_key(0, &WdbcValue::U32(2)).unwrap();
        assert_eq!(hit, reader.record_at(1).unwrap());
        assert!(reader.record_by_key(0, &WdbcValue::U32(3)).is_none());
        // index past the field count never matches
        assert!(reader.record_by_key(9, &WdbcValue::U32(1)).is_none());
        assert_eq!(reader.record_by_id(1), reader.record_at(0));
    }

    #[test]
    fn test_query_filter_and_projection() {
        let reader = sample_reader();
        let filter: Filter = [(1, WdbcValue::F32(2.5))].into_iter().collect();
        let rows = reader.query(&filter, Some(&[0, 2]));

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.len(), 2);
        assert_eq!(row[&0], Some(WdbcValue::U32(1)));
        assert_eq!(row[&2], Some(WdbcValue::from("foo")));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Query engine
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let reader = grouped_reader();
        let rows = reader.query(&Filter::new(), None);
        assert_eq!(ids(&rows), vec![10, 11, 12, 13, 14]);
        for (row, rec) in rows.iter().zip(reader.records()) {
            assert_eq!(*row, rec.to_row());
        }
    }

    #[test]
    fn test_filter_on_field_zero_matches_key_lookup() {
        let reader = grouped_reader();
        let filter: Filter = [(0, WdbcValue::U32(12))].into_iter().collect();
        let rows = reader.query(&filter, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], reader.record_by_key(0, &WdbcValue::U32(12)).unwrap().to_row());
    }

    #[test]
    fn test_filter_keeps_row_order() {
        let reader = grouped_reader();
        let filter: Filter = [(1, WdbcValue::U32(1))].into_iter().collect();
        assert_eq!(ids(&reader.query(&filter, None)), vec![10, 12, 14]);
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let reader = grouped_reader();
        let filter: Filter = [(1, WdbcValue::U32(1)), (2, WdbcValue::U8(1))]
            .into_iter()
            .collect();
        assert_eq!(ids(&reader.query(&filter, None)), vec![12]);
        assert_eq!(reader.filter(&filter).count(), 1);
    }

    #[test]
    fn test_filter_integer_widths_compare_by_value() {
        let reader = grouped_reader();
        // field 2 is a u8 column, filter given as u32
        let filter: Filter = [(2, WdbcValue::U32(1))].into_iter().collect();
        assert_eq!(ids(&reader.query(&filter, None)), vec![11, 12]);
    }

    #[test]
    fn test_filter_on_missing_field_excludes_all() {
        let reader = grouped_reader();
        let filter: Filter = [(7, WdbcValue::Empty)].into_iter().collect();
        assert!(reader.query(&filter, None).is_empty());
    }

    #[test]
    fn test_projection_marks_absent_fields() {
        let reader = grouped_reader();
        let rows = reader.query(&Filter::new(), Some(&[0, 42]));
        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert_eq!(row.keys().copied().collect::<Vec<_>>(), vec![0, 42]);
            assert!(row[&0].is_some());
            assert_eq!(row[&42], None);
        }
    }

    #[test]
    fn test_empty_projection_returns_every_field() {
        let reader = grouped_reader();
        let filter: Filter = [(1, WdbcValue::U32(1))].into_iter().collect();
        assert_eq!(reader.query(&filter, Some(&[])), reader.query(&filter, None));
        let rows = reader.query(&Filter::new(), Some(&[]));
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].len(), 3);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_bad_signature() {
        let mut image = sample_image();
        image[0..4].copy_from_slice(b"WDB2");
        let spec = FormatSpecification::parse("ifs").unwrap();
        let err = TableReader::from_bytes(&image, spec, "x").unwrap_err();
        assert!(matches!(err, WdbcError::BadSignature { found } if &found == b"WDB2"));
    }

    #[test]
    fn test_bad_signature_checked_before_anything_else() {
        // wrong magic and a header that would fail every later check too
        let mut image = vec![0u8; HEADER_SIZE];
        image[0..4].copy_from_slice(b"ABCD");
        image[8..12].copy_from_slice(&99u32.to_le_bytes());
        let spec = FormatSpecification::parse("i").unwrap();
        let err = TableReader::from_bytes(&image, spec, "x").unwrap_err();
        assert!(matches!(err, WdbcError::BadSignature { .. }));
    }

    #[test]
    fn test_field_count_mismatch() {
        let spec = FormatSpecification::parse("if").unwrap();
        let err = TableReader::from_bytes(&sample_image(), spec, "x").unwrap_err();
        assert!(matches!(err, WdbcError::FormatMismatch { format: 2, header: 3 }));
    }

    #[test]
    fn test_record_size_mismatch() {
        // same field count, but "ifb" is 9 bytes wide instead of 12
        let spec = FormatSpecification::parse("ifb").unwrap();
        let err = TableReader::from_bytes(&sample_image(), spec, "x").unwrap_err();
        assert!(matches!(err, WdbcError::RecordSizeMismatch { format: 9, header: 12 }));
    }

    #[test]
    fn test_truncated_header() {
        let spec = FormatSpecification::parse("ifs").unwrap();
        let err = TableReader::from_bytes(b"WDBC\x01\0", spec, "x").unwrap_err();
        assert!(matches!(err, WdbcError::TruncatedFile { expected: HEADER_SIZE, actual: 6 }));
    }

    #[test]
    fn test_truncated_body() {
        let mut image = sample_image();
        let full = image.len();
        image.truncate(full - 2);
        let spec = FormatSpecification::parse("ifs").unwrap();
        let err = TableReader::from_bytes(&image, spec, "x").unwrap_err();
        match err {
            WdbcError::TruncatedFile { expected, actual } => {
                assert_eq!(expected, full);
                assert_eq!(actual, full - 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let mut image = sample_image();
        image.extend_from_slice(b"garbage");
        let spec = FormatSpecification::parse("ifs").unwrap();
        let reader = TableReader::from_bytes(&image, spec, "x").unwrap();
        assert_eq!(reader.len(), 2);
        assert_eq!(reader.strings().len(), 5);
    }

    #[test]
    fn test_empty_table() {
        let spec = FormatSpecification::parse("ifs").unwrap();
        let reader = TableReader::from_bytes(&build_wdbc(3, 12, &[], b""), spec, "x").unwrap();
        assert!(reader.is_empty());
        assert!(reader.query(&Filter::new(), None).is_empty());
        assert!(reader.record_at(0).is_none());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // On-disk + metadata
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_open_from_disk() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".dbc").tempfile()?;
        file.write_all(&sample_image())?;
        file.flush()?;

        let spec = FormatSpecification::parse("ifs")?;
        let reader = TableReader::open(file.path(), spec)?;
        assert_eq!(reader.record_at(0).and_then(|r| r.get(2)), Some(&WdbcValue::from("foo")));
        assert!(reader.label().ends_with(".dbc"));
        Ok(())
    }

    #[test]
    fn test_open_missing_file() {
        let spec = FormatSpecification::parse("ifs").unwrap();
        let err = TableReader::open("/no/such/dir/Spell.dbc", spec).unwrap_err();
        assert!(matches!(err, WdbcError::SourceNotFound { .. }));
    }

    #[test]
    fn test_info() {
        let info = sample_reader().info();
        assert_eq!(info.file, "Sample.dbc");
        assert_eq!(info.signature, "WDBC");
        assert_eq!(info.record_count, 2);
        assert_eq!(info.field_count, 3);
        assert_eq!(info.record_size, 12);
        assert_eq!(info.string_block_size, 5);
        assert_eq!(info.format, "ifs");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["format"], "ifs");
    }

    #[test]
    fn test_row_bytes() {
        let reader = sample_reader();
        assert_eq!(reader.row_bytes(1), Some(row_ifs(2, -1.0, 0).as_slice()));
        assert!(reader.row_bytes(2).is_none());
    }

    #[test]
    fn test_reader_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TableReader>();
    }
}
