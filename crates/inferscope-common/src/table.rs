//! Flat, already-formatted tables.
//!
//! HTML rendering and CSV export both consume a `Table`, so the exported text
//! is exactly what was shown on screen.

use crate::error::ExportError;

/// One table row: formatted cells plus presentation hints that never reach the CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<String>,
    /// CSS class describing the row state (agreement badge or tier).
    pub tone: &'static str,
    /// Identifier of the underlying record, used for drill-down links.
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self { headers: headers.to_vec(), rows: Vec::new() }
    }

    pub fn push(&mut self, row: Row) {
        debug_assert_eq!(row.cells.len(), self.headers.len(), "row width must match headers");
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| *h == header)
    }

    /// Cell text at (`row`, `header`).
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.column(header)?;
        self.rows.get(row)?.cells.get(col).map(String::as_str)
    }

    /// Serialize headers and cells as RFC 4180 CSV.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(&row.cells)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}
