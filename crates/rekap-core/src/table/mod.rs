//! Flattening extraction results into spreadsheet rows.

mod aggregate;
mod flatten;
mod schema;

pub use aggregate::RowTable;
pub use flatten::{flatten, GRAND_TOTAL_LABEL, UNREADABLE_ITEMS};
pub use schema::{Column, ColumnKind, Field, Schema};

use std::fmt;

use rust_decimal::Decimal;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(Decimal),
    /// Deliberately blank (used on the grand-total row).
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Default value for a column when the source had nothing.
    pub fn default_for(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => Cell::Text(String::new()),
            ColumnKind::Number => Cell::Number(Decimal::ZERO),
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n.normalize()),
            Cell::Empty => Ok(()),
        }
    }
}

/// What produced a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// One extracted line item, or one invoice in the summary layout.
    Item,
    /// An invoice whose items could not be read.
    Placeholder,
    /// A document whose extraction failed.
    Error,
    /// The synthetic sum row at the end of a batch.
    GrandTotal,
}

/// One flat row; `cells` follows the schema's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

impl ResultRow {
    pub fn is_grand_total(&self) -> bool {
        self.kind == RowKind::GrandTotal
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }
}
