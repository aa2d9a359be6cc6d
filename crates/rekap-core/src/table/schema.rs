//! Fixed column layouts for each schema variant.

use crate::extraction::SchemaVariant;

/// Whether a column holds text or numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
}

/// Where a column's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FileName,
    Date,
    InvoiceNumber,
    Vendor,
    Buyer,
    ItemList,
    InvoiceTotal,
    ItemName,
    Quantity,
    UnitPrice,
    LineTotal,
    AuditNote,
    Note,
}

impl Field {
    /// Fields that vary per line item.
    pub fn is_item_field(&self) -> bool {
        matches!(
            self,
            Field::ItemName | Field::Quantity | Field::UnitPrice | Field::LineTotal
        )
    }
}

/// One spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub field: Field,
    pub kind: ColumnKind,
}

const fn text(header: &'static str, field: Field) -> Column {
    Column { header, field, kind: ColumnKind::Text }
}

const fn number(header: &'static str, field: Field) -> Column {
    Column { header, field, kind: ColumnKind::Number }
}

const SUMMARY_COLUMNS: &[Column] = &[
    text("Nama File", Field::FileName),
    text("Tanggal", Field::Date),
    text("No Invoice", Field::InvoiceNumber),
    text("Vendor", Field::Vendor),
    text("Pembeli", Field::Buyer),
    text("List Item", Field::ItemList),
    number("Total Tagihan", Field::InvoiceTotal),
    text("Catatan", Field::Note),
];

const ITEMIZED_COLUMNS: &[Column] = &[
    text("Nama File", Field::FileName),
    text("Tanggal", Field::Date),
    text("No Invoice", Field::InvoiceNumber),
    text("Vendor", Field::Vendor),
    text("Pembeli", Field::Buyer),
    text("Nama Item", Field::ItemName),
    number("Qty", Field::Quantity),
    number("Harga Satuan", Field::UnitPrice),
    number("Total Baris", Field::LineTotal),
    text("Catatan", Field::Note),
];

const AUDITED_COLUMNS: &[Column] = &[
    text("Nama File", Field::FileName),
    text("Tanggal", Field::Date),
    text("No Invoice", Field::InvoiceNumber),
    text("Vendor", Field::Vendor),
    text("Pembeli", Field::Buyer),
    text("Nama Item", Field::ItemName),
    number("Qty", Field::Quantity),
    number("Harga Satuan", Field::UnitPrice),
    number("Total Baris", Field::LineTotal),
    text("Catatan Audit", Field::AuditNote),
    text("Catatan", Field::Note),
];

/// Column layout plus the column summed into the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    columns: &'static [Column],
    total_field: Field,
    label_field: Field,
}

impl Schema {
    pub fn for_variant(variant: SchemaVariant) -> Self {
        match variant {
            SchemaVariant::Summary => Self {
                columns: SUMMARY_COLUMNS,
                total_field: Field::InvoiceTotal,
                label_field: Field::FileName,
            },
            SchemaVariant::Itemized => Self {
                columns: ITEMIZED_COLUMNS,
                total_field: Field::LineTotal,
                label_field: Field::FileName,
            },
            SchemaVariant::Audited => Self {
                columns: AUDITED_COLUMNS,
                total_field: Field::LineTotal,
                label_field: Field::FileName,
            },
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        self.columns
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn total_field(&self) -> Field {
        self.total_field
    }

    pub fn label_field(&self) -> Field {
        self.label_field
    }

    /// Position of the column summed into the grand total.
    pub fn total_index(&self) -> Option<usize> {
        self.index_of(self.total_field)
    }

    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    /// Whether rows are emitted per line item rather than per invoice.
    pub fn is_item_level(&self) -> bool {
        self.columns.iter().any(|c| c.field.is_item_field())
    }
}
