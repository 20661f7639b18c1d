use std::collections::BTreeMap;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::{debug, warn};

use crate::config::ColumnNames;
use crate::error::{Result, RepairError};
use crate::model::{CellValue, QuestionRow, QuestionTable};

/// Reads the question sheet (the first worksheet) of an Excel workbook.
///
/// The first row holds the headers. The options and correct-answer columns
/// are required; every other column is optional and carried through as-is.
pub fn read_table(path: &Path, columns: &ColumnNames) -> Result<QuestionTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| RepairError::InvalidWorkbook("workbook has no sheets".into()))?;
    let range = read_required_sheet(&mut workbook, &sheet_name)?;

    parse_table(&sheet_name, &range, columns)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| RepairError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(RepairError::from)?;
    Ok(range)
}

fn parse_table(
    sheet_name: &str,
    range: &calamine::Range<DataType>,
    columns: &ColumnNames,
) -> Result<QuestionTable> {
    let Some(header_row) = range.rows().next() else {
        return Err(RepairError::InvalidWorkbook(format!(
            "sheet '{sheet_name}' has no header row"
        )));
    };

    // Column position -> header. Blank headers are skipped; a repeated
    // header is kept as `<header> (2)`, `<header> (3)`, ...
    let mut headers: Vec<(usize, String)> = Vec::new();
    for (col_idx, cell) in header_row.iter().enumerate() {
        let header = cell_to_string(Some(cell)).trim().to_string();
        if header.is_empty() {
            debug!(column = col_idx, "skipping column without header");
            continue;
        }
        let header = if is_taken(&headers, &header) {
            let renamed = disambiguate(&headers, &header);
            warn!(
                column = col_idx,
                header = %header,
                renamed = %renamed,
                "renamed duplicate header"
            );
            renamed
        } else {
            header
        };
        headers.push((col_idx, header));
    }

    for required in [&columns.options, &columns.answers] {
        if !headers.iter().any(|(_, header)| header == required) {
            return Err(RepairError::MissingColumn(required.clone()));
        }
    }

    let mut table = QuestionTable::new(
        sheet_name,
        headers.iter().map(|(_, header)| header.clone()).collect(),
    );

    for row in range.rows().skip(1) {
        if row.iter().all(|cell| to_cell_value(cell).is_empty()) {
            continue;
        }

        let mut question = QuestionRow::default();
        let mut extra = BTreeMap::new();
        for (col_idx, header) in &headers {
            let value = row.get(*col_idx).map(to_cell_value).unwrap_or_default();
            if *header == columns.id {
                question.id = value;
            } else if *header == columns.question {
                question.question = value.as_text();
            } else if *header == columns.options {
                question.options = value.as_text();
            } else if *header == columns.answers {
                question.answers = value.as_text();
            } else if *header == columns.times_attempted {
                question.times_attempted = value;
            } else if *header == columns.errors {
                question.errors = value;
            } else if value != CellValue::Empty {
                extra.insert(header.clone(), value);
            }
        }
        question.extra = extra;
        table.rows.push(question);
    }

    debug!(rows = table.rows.len(), sheet = sheet_name, "question sheet parsed");
    Ok(table)
}

fn is_taken(headers: &[(usize, String)], header: &str) -> bool {
    headers.iter().any(|(_, existing)| existing == header)
}

fn disambiguate(headers: &[(usize, String)], header: &str) -> String {
    (2..)
        .map(|n| format!("{header} ({n})"))
        .find(|candidate| !is_taken(headers, candidate))
        .unwrap_or_else(|| header.to_string())
}

fn to_cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    cell.map(to_cell_value).unwrap_or_default().as_text()
}
