//! Reading and writing series as CSV tables.

pub mod csv;

pub use self::csv::{read_csv, read_csv_from, write_csv, write_csv_to};
