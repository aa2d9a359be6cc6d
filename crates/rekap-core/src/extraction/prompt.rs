//! Instruction prompts and the schema variant they belong to.

use serde::{Deserialize, Serialize};

use crate::table::Schema;

/// Flat summary: one row per invoice, item names joined into one field.
pub const SUMMARY_PROMPT: &str = r#"Kamu adalah mesin ekstraksi data invoice bulk.
Tugas: Ekstrak data dari gambar ini ke JSON.

Field Wajib:
- 'tanggal': (DD-MM-YYYY)
- 'no_invoice': (string)
- 'vendor': (nama penjual)
- 'pembeli': (nama pembeli)
- 'total_tagihan': (angka/integer dari total akhir)
- 'list_item': (gabungkan semua nama item jadi satu string dipisah koma jika banyak)

ATURAN:
Hanya output JSON valid. Tanpa markdown."#;

/// Line items: one row per item with quantity and prices.
pub const ITEMIZED_PROMPT: &str = r#"Kamu adalah mesin ekstraksi data invoice bulk.
Tugas: Ekstrak data dari gambar ini ke JSON dengan rincian setiap baris item.

Format output:
{
  "tanggal": "DD-MM-YYYY",
  "no_invoice": "string",
  "vendor": "nama penjual",
  "pembeli": "nama pembeli",
  "total_tagihan": integer,
  "items": [
    {"nama_item": "string", "qty": integer, "harga_satuan": integer, "total": integer}
  ]
}

ATURAN:
- Semua angka ditulis sebagai integer tanpa titik, koma, atau simbol mata uang.
- Jika sebuah field tidak terbaca, isi string kosong atau 0.
- Hanya output JSON valid. Tanpa markdown."#;

/// Line items plus arithmetic correction and an audit note.
pub const AUDITED_PROMPT: &str = r#"Kamu adalah auditor dan mesin ekstraksi data invoice bulk.
Tugas: Ekstrak data dari gambar ini ke JSON dengan rincian setiap baris item, lalu periksa hitungannya.

Format output:
{
  "tanggal": "DD-MM-YYYY",
  "no_invoice": "string",
  "vendor": "nama penjual",
  "pembeli": "nama pembeli",
  "total_tagihan": integer,
  "items": [
    {"nama_item": "string", "qty": integer, "harga_satuan": integer, "total": integer}
  ],
  "catatan_audit": "string"
}

ATURAN KOREKSI:
- Untuk setiap item, 'total' WAJIB sama dengan 'qty' x 'harga_satuan'. Jika tulisan di gambar salah hitung atau tidak terbaca, hitung ulang dan pakai hasil hitunganmu.
- 'total_tagihan' adalah total akhir yang tertulis di invoice.
- Tulis setiap koreksi yang kamu lakukan di 'catatan_audit'. Jika tidak ada koreksi, isi string kosong.

ATURAN:
- Semua angka ditulis sebagai integer tanpa titik, koma, atau simbol mata uang.
- Jika sebuah field tidak terbaca, isi string kosong atau 0.
- Hanya output JSON valid. Tanpa markdown."#;

/// A prompt plus the table schema its output is flattened into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Invoice-level totals only.
    Summary,
    /// Line items, taken as read.
    Itemized,
    /// Line items with arithmetic correction by the model.
    #[default]
    Audited,
}

impl SchemaVariant {
    pub fn default_prompt(&self) -> &'static str {
        match self {
            SchemaVariant::Summary => SUMMARY_PROMPT,
            SchemaVariant::Itemized => ITEMIZED_PROMPT,
            SchemaVariant::Audited => AUDITED_PROMPT,
        }
    }

    pub fn schema(&self) -> Schema {
        Schema::for_variant(*self)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchemaVariant::Summary => "summary",
            SchemaVariant::Itemized => "itemized",
            SchemaVariant::Audited => "audited",
        }
    }
}

impl std::fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_name_their_schema_keys() {
        for key in ["tanggal", "no_invoice", "vendor", "pembeli", "total_tagihan"] {
            assert!(SUMMARY_PROMPT.contains(key));
            assert!(ITEMIZED_PROMPT.contains(key));
            assert!(AUDITED_PROMPT.contains(key));
        }
        assert!(SUMMARY_PROMPT.contains("list_item"));
        assert!(ITEMIZED_PROMPT.contains("harga_satuan"));
        assert!(AUDITED_PROMPT.contains("catatan_audit"));
    }

    #[test]
    fn test_variant_serde_names() {
        assert_eq!(serde_json::to_string(&SchemaVariant::Itemized).unwrap(), "\"itemized\"");
        let variant: SchemaVariant = serde_json::from_str("\"summary\"").unwrap();
        assert_eq!(variant, SchemaVariant::Summary);
        assert_eq!(SchemaVariant::default().to_string(), "audited");
    }
}
