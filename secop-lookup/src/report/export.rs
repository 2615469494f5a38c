//! Spreadsheet export of the display table
//!
//! The workbook is built in memory and handed back as bytes; nothing touches
//! the filesystem.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::aggregate::DisplayTable;

/// Sheet holding the exported rows
pub const SHEET_NAME: &str = "Datos";

/// MIME type of the produced file
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Write the table as a single-sheet workbook: bold header row, then one
/// row per display row.
pub fn table_to_xlsx(table: &DisplayTable) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, label) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, label, &header)?;
    }

    for (row_ix, row) in table.rows.iter().enumerate() {
        let sheet_row = row_ix as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                worksheet.write_string(sheet_row, col as u16, cell)?;
            }
        }
    }

    workbook.save_to_buffer()
}
