//! Table output: the row sink contract and its CSV implementation.

mod sink;

pub use sink::{create_table, CsvSink, RowSink};
