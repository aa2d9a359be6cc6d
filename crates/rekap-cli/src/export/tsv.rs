//! Tab-separated rendering for pasting into a spreadsheet.

use rekap_core::{ResultRow, Schema};

/// Render headers and rows as TSV text.
pub fn render(schema: &Schema, rows: &[ResultRow]) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(vec![]);

    wtr.write_record(schema.headers())?;
    for row in rows {
        wtr.write_record(row.cells.iter().map(|c| c.to_string()))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rekap_core::extraction::parse_completion;
    use rekap_core::{RowTable, SchemaVariant};

    #[test]
    fn test_render_with_grand_total() {
        let schema = SchemaVariant::Itemized.schema();
        let mut table = RowTable::new(schema);
        let payload = r#"{"tanggal":"01-01-2025","items":[{"nama_item":"A","qty":2,"harga_satuan":100,"total":200}]}"#;
        table.push_result(&parse_completion("1.jpg", payload));
        table.push_result(&parse_completion("2.jpg", payload));

        let text = render(&schema, &table.finish(true)).unwrap();

        assert_eq!(
            text,
            "Nama File\tTanggal\tNo Invoice\tVendor\tPembeli\tNama Item\tQty\tHarga Satuan\tTotal Baris\tCatatan\n\
             1.jpg\t01-01-2025\t\t\t\tA\t2\t100\t200\t\n\
             2.jpg\t01-01-2025\t\t\t\tA\t2\t100\t200\t\n\
             GRAND TOTAL\t\t\t\t\t\t\t\t400\t\n"
        );
    }

    #[test]
    fn test_render_quotes_embedded_tabs() {
        let schema = SchemaVariant::Summary.schema();
        let mut table = RowTable::new(schema);
        table.push_result(&parse_completion("x.jpg", "{\"vendor\": \"PT\\tSatu\"}"));

        let text = render(&schema, table.data_rows()).unwrap();
        assert!(text.lines().nth(1).unwrap().contains("\"PT\tSatu\""));
    }
}
