//! Spreadsheet upload: map two user-chosen columns straight to `(term, definition)`.
//!
//! Spreadsheets already have structure, so they bypass the text parser
//! entirely. Only delimited exports are read (CSV, or TSV by extension);
//! workbooks must be exported first.

use crate::entry::Entry;
use crate::error::FlashDeckError;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Identifies a spreadsheet column by header name or zero-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSelector {
    /// Header name, matched case-insensitively after trimming.
    Name(String),
    /// Zero-based column index.
    Index(usize),
}

impl FromStr for ColumnSelector {
    type Err = std::convert::Infallible;

    /// All-digit strings are indices; anything else is a header name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<usize>() {
            Ok(i) => ColumnSelector::Index(i),
            Err(_) => ColumnSelector::Name(s.to_string()),
        })
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Name(n) => write!(f, "{n}"),
            ColumnSelector::Index(i) => write!(f, "#{i}"),
        }
    }
}

impl ColumnSelector {
    fn resolve(&self, headers: &StringRecord) -> Result<usize, FlashDeckError> {
        let found = match self {
            ColumnSelector::Index(i) if *i < headers.len() => Some(*i),
            ColumnSelector::Index(_) => None,
            ColumnSelector::Name(name) => {
                let wanted = name.trim().to_lowercase();
                headers
                    .iter()
                    .position(|h| h.trim().to_lowercase() == wanted)
            }
        };
        found.ok_or_else(|| FlashDeckError::ColumnNotFound {
            column: self.to_string(),
            available: headers.iter().map(|h| h.trim().to_string()).collect(),
        })
    }
}

/// Read a CSV/TSV export at `path` and map the two selected columns.
///
/// `None` selectors default to the first and second columns.
pub fn read_spreadsheet(
    path: &Path,
    term: Option<&ColumnSelector>,
    definition: Option<&ColumnSelector>,
) -> Result<Vec<Entry>, FlashDeckError> {
    if is_workbook(path) {
        return Err(FlashDeckError::SpreadsheetInvalid {
            path: path.to_path_buf(),
            detail: "workbook formats (.xlsx/.xls/.ods) are not read directly".into(),
        });
    }
    let delimiter = if has_extension(path, "tsv") { b'\t' } else { b',' };
    let file = File::open(path).map_err(|e| FlashDeckError::SpreadsheetInvalid {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let rows = read_delimited(BufReader::new(file), delimiter, term, definition).map_err(
        |e| match e {
            FlashDeckError::SpreadsheetInvalid { detail, .. } => {
                FlashDeckError::SpreadsheetInvalid {
                    path: path.to_path_buf(),
                    detail,
                }
            }
            other => other,
        },
    )?;
    info!("Read {} rows from spreadsheet {}", rows.len(), path.display());
    Ok(rows)
}

/// Read delimited records with a header row from any reader.
pub fn read_delimited<R: Read>(
    reader: R,
    delimiter: u8,
    term: Option<&ColumnSelector>,
    definition: Option<&ColumnSelector>,
) -> Result<Vec<Entry>, FlashDeckError> {
    let invalid = |detail: String| FlashDeckError::SpreadsheetInvalid {
        path: Default::default(),
        detail,
    };

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| invalid(e.to_string()))?.clone();
    if headers.is_empty() {
        return Err(invalid("the file has no header row".into()));
    }

    let term_idx = term.unwrap_or(&ColumnSelector::Index(0)).resolve(&headers)?;
    let def_idx = definition
        .unwrap_or(&ColumnSelector::Index(1))
        .resolve(&headers)?;
    debug!("Spreadsheet columns: term=#{term_idx}, definition=#{def_idx}");

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| invalid(e.to_string()))?;
        let entry = Entry::new(
            record.get(term_idx).unwrap_or(""),
            record.get(def_idx).unwrap_or(""),
        );
        if !entry.is_blank() {
            rows.push(entry);
        }
    }
    Ok(rows)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn is_workbook(path: &Path) -> bool {
    ["xlsx", "xls", "xlsm", "ods"]
        .iter()
        .any(|ext| has_extension(path, ext))
}
