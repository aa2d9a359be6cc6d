//! Accumulating rows across a batch.

use rust_decimal::Decimal;
use tracing::warn;

use crate::amounts::saturating_sum;
use crate::models::record::ExtractionResult;

use super::flatten::{flatten, grand_total_row};
use super::{ResultRow, Schema};

/// Ordered, append-only row collection for one batch.
#[derive(Debug, Clone)]
pub struct RowTable {
    schema: Schema,
    rows: Vec<ResultRow>,
}

impl RowTable {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Flatten a result and append its rows; returns how many were added.
    pub fn push_result(&mut self, result: &ExtractionResult) -> usize {
        let rows = flatten(result, &self.schema);
        let added = rows.len();
        self.rows.extend(rows);
        added
    }

    pub fn data_rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the total column over all data rows.
    pub fn total(&self) -> Decimal {
        rows_total(&self.rows, &self.schema)
    }

    /// Consume the table, optionally appending the grand-total row.
    pub fn finish(self, grand_total: bool) -> Vec<ResultRow> {
        let mut rows = self.rows;
        if grand_total {
            let total = rows_total(&rows, &self.schema);
            rows.push(grand_total_row(total, &self.schema));
        }
        rows
    }
}

fn rows_total(rows: &[ResultRow], schema: &Schema) -> Decimal {
    let Some(index) = schema.total_index() else {
        return Decimal::ZERO;
    };
    let total = saturating_sum(
        rows.iter()
            .filter(|r| !r.is_grand_total())
            .filter_map(|r| r.cell(index).and_then(|c| c.as_number())),
    );
    if total == Decimal::MAX || total == Decimal::MIN {
        warn!("Grand total is out of range, clamped to {}", total);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::SchemaVariant;
    use crate::models::record::InvoiceRecord;
    use crate::table::{Cell, RowKind, GRAND_TOTAL_LABEL};

    fn example(filename: &str) -> ExtractionResult {
        let record = InvoiceRecord::from_json(
            r#"{"tanggal":"01-01-2025","items":[{"nama_item":"A","qty":2,"harga_satuan":100,"total":200}]}"#,
        )
        .unwrap();
        ExtractionResult::success(filename, record)
    }

    #[test]
    fn test_two_documents_grand_total() {
        let mut table = RowTable::new(SchemaVariant::Itemized.schema());
        assert_eq!(table.push_result(&example("1.jpg")), 1);
        assert_eq!(table.push_result(&example("2.jpg")), 1);
        assert_eq!(table.total(), Decimal::from(400));

        let rows = table.finish(true);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cells[0], Cell::text("1.jpg"));
        assert_eq!(rows[1].cells[0], Cell::text("2.jpg"));
        assert_eq!(rows[2].kind, RowKind::GrandTotal);
        assert_eq!(rows[2].cells[0], Cell::text(GRAND_TOTAL_LABEL));
        assert_eq!(rows[2].cells[8], Cell::Number(Decimal::from(400)));
    }

    #[test]
    fn test_errors_do_not_affect_total_or_order() {
        let mut table = RowTable::new(SchemaVariant::Audited.schema());
        table.push_result(&example("1.jpg"));
        table.push_result(&ExtractionResult::failure("2.jpg", "HTTP 500"));
        table.push_result(&example("3.jpg"));

        let files: Vec<String> = table.data_rows().iter().map(|r| r.cells[0].to_string()).collect();
        assert_eq!(files, vec!["1.jpg", "2.jpg", "3.jpg"]);
        assert_eq!(table.total(), Decimal::from(400));
    }

    #[test]
    fn test_finish_without_grand_total() {
        let mut table = RowTable::new(SchemaVariant::Summary.schema());
        table.push_result(&example("1.jpg"));
        let rows = table.finish(false);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_grand_total());
    }

    #[test]
    fn test_empty_batch_grand_total_is_zero() {
        let table = RowTable::new(SchemaVariant::Itemized.schema());
        assert!(table.is_empty());
        let rows = table.finish(true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[8], Cell::Number(Decimal::ZERO));
    }

    #[test]
    fn test_oversized_amounts_clamp_grand_total() {
        let payload = r#"{"items":[{"nama_item":"A","qty":1,"harga_satuan":1,"total":"50000000000000000000000000000"}]}"#;
        let mut table = RowTable::new(SchemaVariant::Itemized.schema());
        for name in ["1.jpg", "2.jpg"] {
            let record = InvoiceRecord::from_json(payload).unwrap();
            table.push_result(&ExtractionResult::success(name, record));
        }

        let rows = table.finish(true);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].cells[8], Cell::Number(Decimal::MAX));
    }
}
