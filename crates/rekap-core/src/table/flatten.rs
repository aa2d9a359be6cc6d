//! Converting one extraction result into rows.

use rust_decimal::Decimal;

use crate::models::record::{ExtractionResult, LineItem};

use super::{Cell, ColumnKind, Field, ResultRow, RowKind, Schema};

/// Item description written when a readable invoice has no line items.
pub const UNREADABLE_ITEMS: &str = "(item tidak terbaca)";

/// Label placed on the grand-total row.
pub const GRAND_TOTAL_LABEL: &str = "GRAND TOTAL";

enum ItemSlot<'a> {
    Invoice,
    Item(&'a LineItem),
    Unreadable,
}

impl ItemSlot<'_> {
    fn item(&self) -> Option<&LineItem> {
        match self {
            ItemSlot::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// Flatten one result into rows following `schema`.
///
/// - failed extraction: one row with the filename and the error note;
/// - invoice-level layout: one row per document;
/// - items present: one row per item, header fields repeated;
/// - no items: one placeholder row marked [`UNREADABLE_ITEMS`].
pub fn flatten(result: &ExtractionResult, schema: &Schema) -> Vec<ResultRow> {
    if let Some(error) = &result.error {
        return vec![error_row(&result.filename, error, schema)];
    }

    if !schema.is_item_level() {
        return vec![build_row(result, &ItemSlot::Invoice, RowKind::Item, schema)];
    }

    if result.record.items.is_empty() {
        return vec![build_row(result, &ItemSlot::Unreadable, RowKind::Placeholder, schema)];
    }

    result
        .record
        .items
        .iter()
        .map(|item| build_row(result, &ItemSlot::Item(item), RowKind::Item, schema))
        .collect()
}

fn build_row(result: &ExtractionResult, slot: &ItemSlot<'_>, kind: RowKind, schema: &Schema) -> ResultRow {
    let cells = schema
        .columns()
        .iter()
        .map(|column| field_cell(column.field, result, slot))
        .collect();
    ResultRow { kind, cells }
}

fn field_cell(field: Field, result: &ExtractionResult, slot: &ItemSlot<'_>) -> Cell {
    let record = &result.record;
    let item = slot.item();

    match field {
        Field::FileName => Cell::text(&result.filename),
        Field::Date => Cell::text(&record.date),
        Field::InvoiceNumber => Cell::text(&record.invoice_number),
        Field::Vendor => Cell::text(&record.vendor),
        Field::Buyer => Cell::text(&record.buyer),
        Field::ItemList => Cell::text(record.item_list_text()),
        Field::InvoiceTotal => Cell::Number(record.invoice_total),
        Field::ItemName => match slot {
            ItemSlot::Item(item) => Cell::text(&item.name),
            ItemSlot::Unreadable => Cell::text(UNREADABLE_ITEMS),
            ItemSlot::Invoice => Cell::text(""),
        },
        Field::Quantity => Cell::Number(item.map(|i| i.quantity).unwrap_or(Decimal::ZERO)),
        Field::UnitPrice => Cell::Number(item.map(|i| i.unit_price).unwrap_or(Decimal::ZERO)),
        Field::LineTotal => Cell::Number(item.map(|i| i.subtotal).unwrap_or(Decimal::ZERO)),
        Field::AuditNote => Cell::text(&record.audit_note),
        Field::Note => Cell::text(""),
    }
}

fn error_row(filename: &str, error: &str, schema: &Schema) -> ResultRow {
    let cells = schema
        .columns()
        .iter()
        .map(|column| match column.field {
            Field::FileName => Cell::text(filename),
            Field::Note => Cell::text(format!("Error: {error}")),
            _ => Cell::default_for(column.kind),
        })
        .collect();
    ResultRow {
        kind: RowKind::Error,
        cells,
    }
}

/// Build the grand-total row: label, sum, blanks elsewhere.
pub(super) fn grand_total_row(total: Decimal, schema: &Schema) -> ResultRow {
    let cells = schema
        .columns()
        .iter()
        .map(|column| {
            if column.field == schema.total_field() && column.kind == ColumnKind::Number {
                Cell::Number(total)
            } else if column.field == schema.label_field() {
                Cell::text(GRAND_TOTAL_LABEL)
            } else {
                Cell::Empty
            }
        })
        .collect();
    ResultRow {
        kind: RowKind::GrandTotal,
        cells,
    }
}
