//! Record source: read a CSV file fully into memory as positional rows.
//!
//! Every record is returned, header included; callers skip index 0. Cells
//! are addressed by position only, there is no header-name lookup. Ragged
//! files (rows with differing cell counts) are rejected as malformed.

use crate::error::Csv2PdfError;
use std::path::Path;
use tracing::{debug, info};

/// One CSV record as an ordered list of string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    index: usize,
    cells: Vec<String>,
}

impl Row {
    pub fn new(index: usize, cells: Vec<String>) -> Self {
        Self { index, cells }
    }

    /// Zero-based position of this record in the file (the header is 0).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell at `column`, or [`Csv2PdfError::MissingCell`].
    pub fn cell(&self, column: usize) -> Result<&str, Csv2PdfError> {
        self.cells
            .get(column)
            .map(String::as_str)
            .ok_or(Csv2PdfError::MissingCell {
                row: self.index,
                column,
                len: self.cells.len(),
            })
    }
}

/// Read and parse every record in the CSV file at `path`.
pub async fn read_records(path: &Path) -> Result<Vec<Row>, Csv2PdfError> {
    info!("Reading CSV: {}", path.display());

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Csv2PdfError::from_read(path, e))?;

    let rows = parse_records(path, &bytes)?;
    debug!("Parsed {} CSV records", rows.len());
    Ok(rows)
}

/// Parse CSV bytes already in memory. `path` is used for error context only.
pub fn parse_records(path: &Path, bytes: &[u8]) -> Result<Vec<Row>, Csv2PdfError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes);

    reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            let record = record.map_err(|e| Csv2PdfError::CsvParse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
            Ok(Row::new(index, record.iter().map(str::to_string).collect()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(text: &str) -> Result<Vec<Row>, Csv2PdfError> {
        parse_records(Path::new("test.csv"), text.as_bytes())
    }

    #[test]
    fn header_is_returned_as_row_zero() {
        let rows = parse("Name,Weight\npork belly,5 lb\nham hock,2 lb\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cells(), ["Name", "Weight"]);
        assert_eq!(rows[1].index(), 1);
        assert_eq!(rows[1].cell(0).unwrap(), "pork belly");
        assert_eq!(rows[2].cell(1).unwrap(), "2 lb");
    }

    #[test]
    fn quoted_cells_keep_commas() {
        let rows = parse("a,b\n\"chops, bone-in\",\"1,5 lb\"\n").unwrap();
        assert_eq!(rows[1].cell(0).unwrap(), "chops, bone-in");
        assert_eq!(rows[1].cell(1).unwrap(), "1,5 lb");
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let err = parse("a,b\n1,2,3\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = parse_records(Path::new("x.csv"), b"a,b\n\xff\xfe,1\n").unwrap_err();
        assert!(matches!(err, Csv2PdfError::CsvParse { .. }));
    }

    #[test]
    fn missing_cell_names_row_and_column() {
        let row = Row::new(3, vec!["pork".into()]);
        match row.cell(2) {
            Err(Csv2PdfError::MissingCell { row, column, len }) => {
                assert_eq!((row, column, len), (3, 2, 1));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = read_records(Path::new("/definitely/not/here.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, Csv2PdfError::FileNotFound { .. }));
    }
}
