use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell as it was read from the workbook. Cells the
/// pipeline does not own are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Blank cell.
    #[default]
    Empty,
    /// Plain string content.
    Text(String),
    /// Numeric content, including integers stored by Excel as floats.
    Number(f64),
    /// Boolean content.
    Bool(bool),
}

impl CellValue {
    /// Renders the cell as text. Integral numbers are printed without a
    /// fractional part so identifiers read back the way they were typed.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) if value.fract() == 0.0 && value.is_finite() => {
                format!("{}", *value as i64)
            }
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }
}

/// One quiz question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRow {
    /// Row identifier, numeric in the source workbook but not guaranteed.
    pub id: CellValue,
    pub question: String,
    /// Newline-delimited option blob.
    pub options: String,
    /// Semicolon-delimited correct-answer blob.
    pub answers: String,
    /// Usage counters owned by the quiz session layer.
    pub times_attempted: CellValue,
    pub errors: CellValue,
    /// Every other column, keyed by header.
    pub extra: BTreeMap<String, CellValue>,
}

impl QuestionRow {
    /// Creates a row with the given id and the two repairable fields.
    pub fn new(id: CellValue, options: impl Into<String>, answers: impl Into<String>) -> Self {
        Self {
            id,
            options: options.into(),
            answers: answers.into(),
            ..Self::default()
        }
    }

    /// Resolves the identifier as an integer when it is an integral number
    /// or numeric text.
    pub fn numeric_id(&self) -> Option<i64> {
        match &self.id {
            CellValue::Number(value) if value.fract() == 0.0 && value.is_finite() => {
                Some(*value as i64)
            }
            CellValue::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }
}

/// In-memory question sheet: column order plus the parsed rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTable {
    pub sheet_name: String,
    /// Header row in display order.
    pub columns: Vec<String>,
    pub rows: Vec<QuestionRow>,
}

impl QuestionTable {
    pub fn new(sheet_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Appends a header when it is not already present. Returns `true` when
    /// the column was added.
    pub fn ensure_column(&mut self, name: &str) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.columns.push(name.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_resolve_from_numbers_and_text() {
        let row = QuestionRow::new(CellValue::Number(316.0), "", "");
        assert_eq!(row.numeric_id(), Some(316));
        let row = QuestionRow::new(CellValue::Text(" 42 ".into()), "", "");
        assert_eq!(row.numeric_id(), Some(42));
        let row = QuestionRow::new(CellValue::Number(3.5), "", "");
        assert_eq!(row.numeric_id(), None);
        let row = QuestionRow::new(CellValue::Text("Q-7".into()), "", "");
        assert_eq!(row.numeric_id(), None);
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(12.0).as_text(), "12");
        assert_eq!(CellValue::Number(1.25).as_text(), "1.25");
        assert_eq!(CellValue::Empty.as_text(), "");
    }
}
