//! Parsed spreadsheet model
//!
//! Binary spreadsheet parsing happens on the backend; this is the shape it
//! returns. A workbook is immutable once received.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw cell value as provided by the backend parser
pub type CellValue = Value;

/// One row: header to cell value, in column order
pub type SheetRow = IndexMap<String, CellValue>;

/// Parse endpoint response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedWorkbook {
    /// Sheets in workbook order
    pub sheets: Vec<ParsedSheet>,
}

impl ParsedWorkbook {
    /// Create workbook from sheets
    #[inline]
    #[must_use]
    pub fn new(sheets: Vec<ParsedSheet>) -> Self {
        Self { sheets }
    }

    /// Look up a sheet by name
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&ParsedSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Whether the workbook holds no sheets
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Total data rows across sheets
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}

/// A single parsed sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSheet {
    /// Sheet name
    pub name: String,
    /// Column headers in order
    #[serde(deserialize_with = "stringify_headers")]
    pub headers: Vec<String>,
    /// Data rows
    #[serde(default)]
    pub rows: Vec<SheetRow>,
}

impl ParsedSheet {
    /// Create an empty sheet with headers
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row given as (header, value) pairs
    #[must_use]
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = (S, CellValue)>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|(h, v)| (h.into(), v)).collect());
        self
    }

    /// Value of `header` in the first data row
    ///
    /// Used as the mapping hint; nothing past row 0 is consulted.
    #[must_use]
    pub fn sample_value(&self, header: &str) -> Option<&CellValue> {
        self.rows.first().and_then(|row| row.get(header))
    }

    /// Whether the sheet declares `header`
    #[inline]
    #[must_use]
    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }
}

/// Headers come from spreadsheet cells and may be numbers or booleans.
fn stringify_headers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect())
}
