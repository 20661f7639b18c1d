use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::config::ColumnNames;
use crate::error::Result;
use crate::model::{CellValue, QuestionRow, QuestionTable};

/// Writes the question table to `path`, one worksheet, columns in table
/// order. The options column wraps so each option shows on its own line.
pub fn write_table(path: &Path, table: &QuestionTable, columns: &ColumnNames) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    let wrap = Format::new().set_text_wrap();

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, header) in table.columns.iter().enumerate() {
            let cell = cell_for(row, header, columns);
            let format = (*header == columns.options).then_some(&wrap);
            write_cell(worksheet, excel_row, col_idx as u16, &cell, format)?;
        }
    }

    if !table.columns.is_empty() {
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        worksheet.autofilter(0, 0, table.rows.len() as u32, col_end)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn cell_for(row: &QuestionRow, header: &str, columns: &ColumnNames) -> CellValue {
    if header == columns.id {
        row.id.clone()
    } else if header == columns.question {
        CellValue::Text(row.question.clone())
    } else if header == columns.options {
        CellValue::Text(row.options.clone())
    } else if header == columns.answers {
        CellValue::Text(row.answers.clone())
    } else if header == columns.times_attempted {
        row.times_attempted.clone()
    } else if header == columns.errors {
        row.errors.clone()
    } else {
        row.extra.get(header).cloned().unwrap_or_default()
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> Result<()> {
    match (cell, format) {
        (CellValue::Empty, _) => {}
        (CellValue::Text(value), _) if value.is_empty() => {}
        (CellValue::Text(value), Some(format)) => {
            worksheet.write_string_with_format(row, col, value, format)?;
        }
        (CellValue::Text(value), None) => {
            worksheet.write_string(row, col, value)?;
        }
        (CellValue::Number(value), _) => {
            worksheet.write_number(row, col, *value)?;
        }
        (CellValue::Bool(value), _) => {
            worksheet.write_boolean(row, col, *value)?;
        }
    }
    Ok(())
}
