//! Comma-delimited item tables with a header row.
//!
//! Cells holding `[...]` or `{...}` are JSON literals; `Infinity` is
//! numeric infinity.

use std::str::FromStr;

use csv::ReaderBuilder;
use tracing::warn;

use crate::core_api::CoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Empty,
    Infinity,
    Json(serde_json::Value),
    Text(&'a str),
}

pub fn decode_cell(raw: &str) -> Cell<'_> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if trimmed == "Infinity" {
        return Cell::Infinity;
    }
    let looks_like_json = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'));
    if looks_like_json {
        match serde_json::from_str(trimmed) {
            Ok(value) => return Cell::Json(value),
            Err(e) => warn!(cell = trimmed, "malformed JSON cell kept as text: {e}"),
        }
    }
    Cell::Text(trimmed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    source: String,
    headers: Vec<String>,
    rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line: usize,
    cells: Vec<String>,
}

/// One row viewed through its table's header.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    row: &'a Row,
}

impl Table {
    /// Parses `text`. `source` names the table in error messages.
    pub fn parse(source: &str, text: &str) -> Result<Self, CoreError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(source, &e))?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(CoreError::parse(format!("{source}: table has no header row")));
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| csv_error(source, &e))?;
            if record.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            rows.push(Row {
                line: record.position().map_or(0, |p| p.line() as usize),
                cells: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(Self {
            source: source.to_string(),
            headers,
            rows,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |row| RowRef { table: self, row })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

impl<'a> RowRef<'a> {
    pub fn line(&self) -> usize {
        self.row.line
    }

    /// Raw trimmed cell text; missing columns read as empty.
    pub fn raw(&self, column: &str) -> &'a str {
        self.table
            .column_index(column)
            .and_then(|index| self.row.cells.get(index))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }

    pub fn cell(&self, column: &str) -> Cell<'a> {
        decode_cell(self.raw(column))
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        let raw = self.raw(column);
        (!raw.is_empty()).then_some(raw)
    }

    pub fn required_text(&self, column: &str) -> Result<&'a str, CoreError> {
        self.text(column)
            .ok_or_else(|| self.error(column, "value is required"))
    }

    /// Parses a numeric cell; empty cells yield `default`.
    pub fn number<T: FromStr>(&self, column: &str, default: T) -> Result<T, CoreError> {
        match self.text(column) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| self.error(column, &format!("expected a number, found {raw:?}"))),
        }
    }

    /// Reads `0`/`1` style flags. Empty is false.
    pub fn flag(&self, column: &str) -> Result<bool, CoreError> {
        match self.text(column) {
            None | Some("0") | Some("false") => Ok(false),
            Some("1") | Some("true") => Ok(true),
            Some(other) => Err(self.error(column, &format!("expected 0 or 1, found {other:?}"))),
        }
    }

    /// Reads a list column. A JSON array of strings is the normal form; a
    /// bare word is a one-element list and a broken literal reads as empty.
    pub fn list(&self, column: &str) -> Result<Vec<String>, CoreError> {
        match self.cell(column) {
            Cell::Empty => Ok(Vec::new()),
            Cell::Json(serde_json::Value::Array(values)) => values
                .into_iter()
                .map(|value| match value {
                    serde_json::Value::String(s) => Ok(s),
                    other => Err(self.error(column, &format!("expected strings, found {other}"))),
                })
                .collect(),
            Cell::Json(other) => Err(self.error(column, &format!("expected a list, found {other}"))),
            Cell::Text(text) if text.starts_with('[') => Ok(Vec::new()),
            Cell::Text(text) => Ok(vec![text.to_string()]),
            Cell::Infinity => Err(self.error(column, "expected a list, found Infinity")),
        }
    }

    pub fn error(&self, column: &str, message: &str) -> CoreError {
        CoreError::parse(format!(
            "{}:{}: column {column}: {message}",
            self.table.source, self.row.line
        ))
    }
}

fn csv_error(source: &str, e: &csv::Error) -> CoreError {
    match e.position() {
        Some(pos) => CoreError::parse(format!("{source}:{}: {e}", pos.line())),
        None => CoreError::parse(format!("{source}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_api::CoreErrorCode;

    const SAMPLE: &str = "ID,WEIGHT,QUALITIES,RES\n\
weaponPipePistol,1,\"[\"\"qualityCloseQuarters\"\",\"\"qualityUnreliable\"\"]\",2\n\
\n\
weaponFlamer,16,[],Infinity\n";

    #[test]
    fn parses_header_rows_and_quoted_json() {
        let table = Table::parse("smallGuns.csv", SAMPLE).unwrap();
        assert_eq!(table.headers(), ["ID", "WEIGHT", "QUALITIES", "RES"]);
        assert_eq!(table.len(), 2);

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].raw("ID"), "weaponPipePistol");
        assert_eq!(
            rows[0].list("QUALITIES").unwrap(),
            vec!["qualityCloseQuarters", "qualityUnreliable"]
        );
        assert_eq!(rows[1].line(), 4);
        assert_eq!(rows[1].cell("RES"), Cell::Infinity);
        assert!(rows[1].list("QUALITIES").unwrap().is_empty());
    }

    #[test]
    fn numeric_errors_name_file_and_line() {
        let table = Table::parse("food.csv", "ID,HP_GAIN\nfoodIguana,lots\n").unwrap();
        let row = table.rows().next().unwrap();
        let err = row.number::<i32>("HP_GAIN", 0).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::Parse);
        assert!(err.message.starts_with("food.csv:2: column HP_GAIN"));
        assert_eq!(row.number::<i32>("MISSING", 7).unwrap(), 7);
    }

    #[test]
    fn malformed_json_cells_stay_text() {
        assert_eq!(decode_cell("[oops"), Cell::Text("[oops"));
        assert_eq!(decode_cell("[\"a\""), Cell::Text("[\"a\""));
        assert!(matches!(decode_cell("{\"a\":1}"), Cell::Json(_)));
    }

    #[test]
    fn quotes_inside_bare_cells_are_literal() {
        let table = Table::parse("x.csv", "ID,NOTE\nitemA,6\" barrel\nitemB,plain\n").unwrap();
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].raw("NOTE"), "6\" barrel");
        assert_eq!(rows[1].raw("ID"), "itemB");
        assert_eq!(rows[1].line(), 3);
    }

    #[test]
    fn empty_text_has_no_header() {
        let err = Table::parse("x.csv", "").unwrap_err();
        assert_eq!(err.code, CoreErrorCode::Parse);
    }
}
