//! Spreadsheet and clipboard renderings of the result table.

pub mod tsv;
pub mod xlsx;
