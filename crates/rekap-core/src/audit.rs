//! Read-only arithmetic checks on extracted records.
//!
//! The model is asked to keep `qty × harga_satuan = total`; nothing in the
//! pipeline enforces it. These checks only report discrepancies, they
//! never change the data that ends up in the table.

use rust_decimal::Decimal;

use crate::models::record::InvoiceRecord;

/// Largest difference still treated as equal (rounding on printed invoices).
fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Whether two amounts differ by more than the tolerance. A difference
/// too large to represent always counts.
fn differs(a: Decimal, b: Decimal) -> bool {
    a.checked_sub(b).is_none_or(|d| d.abs() > tolerance())
}

/// Validate a record and return any issues found.
pub fn audit_record(record: &InvoiceRecord) -> Vec<String> {
    let mut issues = Vec::new();

    for (i, item) in record.items.iter().enumerate() {
        let name = if item.name.is_empty() { "?" } else { item.name.as_str() };
        let Some(expected) = item.quantity.checked_mul(item.unit_price) else {
            issues.push(format!(
                "Item {} ({}): {} x {} is out of range",
                i + 1,
                name,
                item.quantity.normalize(),
                item.unit_price.normalize()
            ));
            continue;
        };
        if differs(expected, item.subtotal) {
            issues.push(format!(
                "Item {} ({}): {} x {} = {}, but total is {}",
                i + 1,
                name,
                item.quantity.normalize(),
                item.unit_price.normalize(),
                expected.normalize(),
                item.subtotal.normalize()
            ));
        }
    }

    if !record.items.is_empty() && !record.invoice_total.is_zero() {
        let items_total = record.items_total();
        if differs(items_total, record.invoice_total) {
            issues.push(format!(
                "Line item total ({}) differs from invoice total ({})",
                items_total.normalize(),
                record.invoice_total.normalize()
            ));
        }
    }

    if !record.date.trim().is_empty() && record.invoice_date().is_none() {
        issues.push(format!("Unrecognised date format: {}", record.date));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::LineItem;

    fn item(qty: i64, price: i64, total: i64) -> LineItem {
        LineItem {
            name: "Kopi".to_string(),
            quantity: Decimal::from(qty),
            unit_price: Decimal::from(price),
            subtotal: Decimal::from(total),
        }
    }

    #[test]
    fn test_consistent_record_has_no_issues() {
        let record = InvoiceRecord {
            date: "05-02-2025".to_string(),
            invoice_total: Decimal::from(500),
            items: vec![item(2, 100, 200), item(3, 100, 300)],
            ..Default::default()
        };
        assert!(audit_record(&record).is_empty());
    }

    #[test]
    fn test_line_mismatch_reported() {
        let record = InvoiceRecord {
            items: vec![item(2, 100, 250)],
            ..Default::default()
        };
        let issues = audit_record(&record);
        assert_eq!(issues, vec!["Item 1 (Kopi): 2 x 100 = 200, but total is 250".to_string()]);
    }

    #[test]
    fn test_invoice_total_mismatch_reported() {
        let record = InvoiceRecord {
            invoice_total: Decimal::from(999),
            items: vec![item(2, 100, 200)],
            ..Default::default()
        };
        let issues = audit_record(&record);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("differs from invoice total (999)"));
    }

    #[test]
    fn test_zero_invoice_total_is_not_compared() {
        let record = InvoiceRecord {
            items: vec![item(2, 100, 200)],
            ..Default::default()
        };
        assert!(audit_record(&record).is_empty());
    }

    #[test]
    fn test_bad_date_reported() {
        let record = InvoiceRecord {
            date: "sekitar Maret".to_string(),
            ..Default::default()
        };
        assert_eq!(audit_record(&record), vec!["Unrecognised date format: sekitar Maret".to_string()]);
    }

    #[test]
    fn test_oversized_amounts_are_reported_not_panicking() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let record = InvoiceRecord {
            invoice_total: -huge,
            items: vec![
                LineItem { name: "A".to_string(), quantity: huge, unit_price: huge, subtotal: huge },
                LineItem { name: "B".to_string(), quantity: Decimal::ONE, unit_price: huge, subtotal: huge },
            ],
            ..Default::default()
        };

        let issues = audit_record(&record);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].starts_with("Item 1 (A):"));
        assert!(issues[0].ends_with("is out of range"));
        assert!(issues[1].starts_with("Line item total (79228162514264337593543950335)"));
    }
}
