//! Structured invoice records parsed from model output.
//!
//! Every field is optional: absent keys, `null`s and placeholder strings
//! fall back to empty text or zero. Only an unparseable payload is an
//! error.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::amounts::{coerce_amount, saturating_sum};
use crate::error::ExtractionError;

/// Record-level keys the model is known to use instead of the requested ones.
const RECORD_ALIASES: &[(&str, &[&str])] = &[
    ("tanggal", &["date", "tanggal_invoice", "invoice_date", "tgl"]),
    ("no_invoice", &["nomor_invoice", "invoice_number", "invoice_no", "no_faktur", "nomor"]),
    ("vendor", &["penjual", "seller", "supplier", "nama_vendor"]),
    ("pembeli", &["buyer", "customer", "nama_pembeli"]),
    ("total_tagihan", &["total_invoice", "grand_total", "invoice_total", "total_akhir"]),
    ("list_item", &["daftar_item"]),
    ("items", &["line_items", "list_items", "item"]),
    ("catatan_audit", &["audit_note", "audit", "catatan_koreksi"]),
];

/// Line-item keys the model is known to use instead of the requested ones.
const ITEM_ALIASES: &[(&str, &[&str])] = &[
    ("nama_item", &["nama", "nama_barang", "deskripsi", "description", "item"]),
    ("qty", &["kuantitas", "quantity", "banyak"]),
    ("harga_satuan", &["harga", "unit_price", "price"]),
    ("total", &["subtotal", "amount", "total_harga", "line_total"]),
];

/// Header and line items read from one invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice date, as written (DD-MM-YYYY requested).
    #[serde(rename = "tanggal", default, deserialize_with = "lenient_text")]
    pub date: String,

    /// Invoice number.
    #[serde(rename = "no_invoice", default, deserialize_with = "lenient_text")]
    pub invoice_number: String,

    /// Seller name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub vendor: String,

    /// Buyer name.
    #[serde(rename = "pembeli", default, deserialize_with = "lenient_text")]
    pub buyer: String,

    /// Comma-separated item names (summary variant).
    #[serde(rename = "list_item", default, deserialize_with = "lenient_text")]
    pub item_list: String,

    /// Invoice-level total.
    #[serde(
        rename = "total_tagihan",
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient_amount"
    )]
    pub invoice_total: Decimal,

    /// Line items in the order the model listed them.
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<LineItem>,

    /// Corrections the model reports having made.
    #[serde(rename = "catatan_audit", default, deserialize_with = "lenient_text")]
    pub audit_note: String,

    /// Keys outside the requested schema, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single line item on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description.
    #[serde(rename = "nama_item", default, deserialize_with = "lenient_text")]
    pub name: String,

    #[serde(
        rename = "qty",
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient_amount"
    )]
    pub quantity: Decimal,

    #[serde(
        rename = "harga_satuan",
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient_amount"
    )]
    pub unit_price: Decimal,

    /// Line subtotal. Expected to equal `quantity * unit_price`; not enforced.
    #[serde(
        rename = "total",
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient_amount"
    )]
    pub subtotal: Decimal,
}

impl InvoiceRecord {
    /// Parse a JSON object payload.
    pub fn from_json(payload: &str) -> Result<Self, ExtractionError> {
        let value: Value = serde_json::from_str(payload)?;
        let Value::Object(map) = value else {
            return Err(ExtractionError::NoJsonPayload);
        };

        let mut map = canonicalize(map, RECORD_ALIASES);
        if let Some(Value::Array(items)) = map.get_mut("items") {
            for item in items.iter_mut() {
                if let Value::Object(fields) = item {
                    *fields = canonicalize(std::mem::take(fields), ITEM_ALIASES);
                }
            }
        }

        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Item names for display: the model's list, or the joined item names.
    pub fn item_list_text(&self) -> String {
        if !self.item_list.is_empty() || self.items.is_empty() {
            return self.item_list.clone();
        }
        self.items
            .iter()
            .map(|i| i.name.as_str())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Sum of all line subtotals, saturating on overflow.
    pub fn items_total(&self) -> Decimal {
        saturating_sum(self.items.iter().map(|i| i.subtotal))
    }

    /// Parse the invoice date if it uses a recognised day-first format.
    pub fn invoice_date(&self) -> Option<NaiveDate> {
        let date = self.date.trim();
        ["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y-%m-%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
    }
}

/// Rename known aliases to their canonical key.
///
/// An exact canonical key always wins over an alias; a second alias for
/// an already present key is kept under its original name.
fn canonicalize(map: Map<String, Value>, aliases: &[(&str, &[&str])]) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    let mut from_alias: HashMap<String, String> = HashMap::new();

    for (key, value) in map {
        let normalized = key.trim().to_lowercase().replace([' ', '-'], "_");
        let matched = aliases
            .iter()
            .find(|(name, alts)| *name == normalized || alts.contains(&normalized.as_str()));

        match matched {
            Some((name, _)) if *name == normalized => {
                if let Some(original) = from_alias.remove(*name) {
                    if let Some(previous) = out.remove(*name) {
                        out.insert(original, previous);
                    }
                }
                out.insert(name.to_string(), value);
            }
            Some((name, _)) if !out.contains_key(*name) => {
                from_alias.insert(name.to_string(), key);
                out.insert(name.to_string(), value);
            }
            _ => {
                out.insert(key, value);
            }
        }
    }

    out
}

/// Render any JSON value as cell text.
fn text_from_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(values) => values
            .iter()
            .map(text_from_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value))
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

fn lenient_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<LineItem>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(values) = value else {
        return Ok(Vec::new());
    };

    Ok(values
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

/// Outcome of extracting one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionResult {
    /// Original upload filename.
    #[serde(rename = "nama_file_asli")]
    pub filename: String,

    /// Parsed fields; all defaults when extraction failed.
    #[serde(flatten)]
    pub record: InvoiceRecord,

    /// Failure description, set only when extraction failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock time spent on this document.
    #[serde(skip)]
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    pub fn success(filename: impl Into<String>, record: InvoiceRecord) -> Self {
        Self {
            filename: filename.into(),
            record,
            error: None,
            processing_time_ms: 0,
        }
    }

    pub fn failure(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            record: InvoiceRecord::default(),
            error: Some(error.into()),
            processing_time_ms: 0,
        }
    }

    pub fn with_processing_time(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_itemized_payload() {
        let record = InvoiceRecord::from_json(
            r#"{"tanggal":"01-01-2025","items":[{"nama_item":"A","qty":2,"harga_satuan":100,"total":200}]}"#,
        )
        .unwrap();

        assert_eq!(record.date, "01-01-2025");
        assert_eq!(record.invoice_number, "");
        assert_eq!(
            record.items,
            vec![LineItem {
                name: "A".to_string(),
                quantity: Decimal::from(2),
                unit_price: Decimal::from(100),
                subtotal: Decimal::from(200),
            }]
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let record = InvoiceRecord::from_json("{}").unwrap();
        assert_eq!(record, InvoiceRecord::default());
    }

    #[test]
    fn test_placeholders_coerce_to_zero() {
        let record = InvoiceRecord::from_json(
            r#"{"total_tagihan":"-","vendor":null,"items":[{"nama_item":"Kertas","qty":"N/A","harga_satuan":"Rp 5.000","total":null}]}"#,
        )
        .unwrap();

        assert_eq!(record.invoice_total, Decimal::ZERO);
        assert_eq!(record.vendor, "");
        assert_eq!(record.items[0].quantity, Decimal::ZERO);
        assert_eq!(record.items[0].unit_price, Decimal::from(5000));
        assert_eq!(record.items[0].subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_aliases_and_exact_keys() {
        let record = InvoiceRecord::from_json(
            r#"{"Invoice Number":"INV-7","seller":"PT Maju","total_tagihan":1000,"grand_total":999,
                "line_items":[{"description":"Jasa","quantity":1,"unit_price":1000,"subtotal":1000}]}"#,
        )
        .unwrap();

        assert_eq!(record.invoice_number, "INV-7");
        assert_eq!(record.vendor, "PT Maju");
        assert_eq!(record.invoice_total, Decimal::from(1000));
        assert_eq!(record.extra.get("grand_total"), Some(&serde_json::json!(999)));
        assert_eq!(record.items[0].name, "Jasa");
        assert_eq!(record.items[0].subtotal, Decimal::from(1000));
    }

    #[test]
    fn test_list_item_array_is_joined() {
        let record = InvoiceRecord::from_json(r#"{"list_item":["Beras", "Gula", ""]}"#).unwrap();
        assert_eq!(record.item_list, "Beras, Gula");
    }

    #[test]
    fn test_non_array_items_are_ignored() {
        let record = InvoiceRecord::from_json(r#"{"items":"tidak ada","no_invoice":123}"#).unwrap();
        assert!(record.items.is_empty());
        assert_eq!(record.invoice_number, "123");
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        assert!(matches!(
            InvoiceRecord::from_json("[1, 2]"),
            Err(ExtractionError::NoJsonPayload)
        ));
        assert!(matches!(
            InvoiceRecord::from_json("{not json"),
            Err(ExtractionError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_item_list_text_falls_back_to_items() {
        let record = InvoiceRecord {
            items: vec![
                LineItem { name: "A".to_string(), ..Default::default() },
                LineItem { name: "B".to_string(), ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(record.item_list_text(), "A, B");
        assert_eq!(record.items_total(), Decimal::ZERO);
    }

    #[test]
    fn test_invoice_date_formats() {
        let mut record = InvoiceRecord { date: "17-08-2025".to_string(), ..Default::default() };
        assert_eq!(record.invoice_date(), NaiveDate::from_ymd_opt(2025, 8, 17));

        record.date = "2025-08-17".to_string();
        assert_eq!(record.invoice_date(), NaiveDate::from_ymd_opt(2025, 8, 17));

        record.date = "17 Agustus 2025".to_string();
        assert_eq!(record.invoice_date(), None);
    }

    #[test]
    fn test_failure_result_serializes_filename_and_error() {
        let result = ExtractionResult::failure("nota.jpg", "boom");
        let json = serde_json::to_value(&result).unwrap();

        assert!(result.is_error());
        assert_eq!(json["nama_file_asli"], "nota.jpg");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["total_tagihan"].as_f64(), Some(0.0));
    }

    #[test]
    fn test_amounts_serialize_as_numbers() {
        let record = InvoiceRecord::from_json(
            r#"{"total_tagihan":"Rp 150.000","items":[{"nama_item":"Teh","qty":3,"harga_satuan":"12,5","total":37.5}]}"#,
        )
        .unwrap();
        let json = serde_json::to_value(ExtractionResult::success("nota.jpg", record)).unwrap();

        assert_eq!(json["total_tagihan"].as_f64(), Some(150000.0));
        assert_eq!(json["items"][0]["qty"].as_f64(), Some(3.0));
        assert_eq!(json["items"][0]["harga_satuan"].as_f64(), Some(12.5));
        assert_eq!(json["items"][0]["total"].as_f64(), Some(37.5));
        assert_eq!(json["error"], serde_json::Value::Null);
    }
}
