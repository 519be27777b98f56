mod query_op;
pub mod reader;

pub use query_op::Filter;
pub use reader::{TableInfo, TableReader};

#[cfg(test)]
mod tests;
