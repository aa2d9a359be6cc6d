//! Excel workbook export.

use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, XlsxError};

use rekap_core::{Cell, ResultRow, Schema};

/// Longest string Excel accepts in one cell.
const MAX_CELL_CHARS: usize = 32_767;

/// Build a single-sheet workbook: header row, data rows, autofit widths.
pub fn build_workbook(
    sheet_name: &str,
    schema: &Schema,
    rows: &[ResultRow],
) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x2563EB))
        .set_font_color(Color::RGB(0xFFFFFF));
    let number_format = Format::new()
        .set_num_format("#,##0")
        .set_align(FormatAlign::Right);
    let total_format = Format::new()
        .set_bold()
        .set_num_format("#,##0")
        .set_align(FormatAlign::Right);
    let label_format = Format::new().set_bold();

    for (col, header) in schema.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        let (text_format, num_format) = if row.is_grand_total() {
            (Some(&label_format), &total_format)
        } else {
            (None, &number_format)
        };

        for (col_idx, cell) in row.cells.iter().enumerate() {
            let c = col_idx as u16;
            match cell {
                Cell::Text(s) => {
                    let value = sanitize_cell(s);
                    match text_format {
                        Some(format) => worksheet.write_string_with_format(r, c, value, format)?,
                        None => worksheet.write_string(r, c, value)?,
                    };
                }
                Cell::Number(n) => {
                    worksheet.write_number_with_format(r, c, n.to_f64().unwrap_or(0.0), num_format)?;
                }
                Cell::Empty => {}
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();

    Ok(workbook)
}

/// Build the workbook and save it to `path`.
pub fn write_workbook(
    path: &Path,
    sheet_name: &str,
    schema: &Schema,
    rows: &[ResultRow],
) -> anyhow::Result<()> {
    let mut workbook = build_workbook(sheet_name, schema, rows)?;
    workbook.save(path)?;
    Ok(())
}

/// Drop control characters Excel rejects and cap the length.
fn sanitize_cell(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_CELL_CHARS)
        .collect()
}
