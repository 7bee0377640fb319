//! Tabular ingestion: CSV bytes into named columns.
//!
//! Parses a header row plus data rows, selects one measurement column and
//! drops missing entries, producing the cleaned ordered sequence that the
//! [`spc`](crate::spc) module consumes.
//!
//! # Format
//!
//! - Comma separated, first non-blank line is the header
//! - Fields may be double-quoted; `""` inside quotes is a literal quote and
//!   quoted fields may span lines
//! - `\n` and `\r\n` line endings, a leading UTF-8 BOM is ignored
//! - Blank lines are skipped
//! - Rows shorter than the header are padded with missing values
//!
//! Missing markers follow the common dataframe defaults (`""`, `NA`, `N/A`,
//! `NaN`, `null`, `None`, ...). Matching is exact, not case-folded.

use tracing::debug;

use crate::error::{Result, SpcError};

/// Field values treated as missing.
const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A parsed data row and the 1-based line it started on.
#[derive(Debug, Clone)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// An in-memory table of string cells addressed by column name.
///
/// # Examples
///
/// ```
/// use spc_sensitize::dataset::Dataset;
///
/// let data = Dataset::from_csv_bytes(b"trial,width\n1,4.2\n2,NA\n3,4.4\n").unwrap();
/// assert_eq!(data.columns(), ["trial", "width"]);
/// assert_eq!(data.cleaned_column("width").unwrap(), vec![4.2, 4.4]);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Parses CSV bytes.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// - [`SpcError::EmptyInput`] if there is no header row.
    /// - [`SpcError::MalformedRow`] if a row has more fields than the header.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&*text);

        let mut records = split_records(text).into_iter();
        let headers = records.next().ok_or(SpcError::EmptyInput)?.fields;
        let width = headers.len();

        let mut rows = Vec::new();
        for mut record in records {
            if record.fields.len() > width {
                return Err(SpcError::MalformedRow {
                    line: record.line,
                    expected: width,
                    found: record.fields.len(),
                });
            }
            record.fields.resize(width, String::new());
            rows.push(record);
        }

        debug!(columns = width, rows = rows.len(), "parsed dataset");
        Ok(Self {
            headers,
            records: rows,
        })
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when the table has a header but no data rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of `name` in row order, `None` for missing cells.
    ///
    /// # Errors
    ///
    /// - [`SpcError::MissingColumn`] if no column is called `name`.
    /// - [`SpcError::InvalidValue`] for a non-missing cell that is not a
    ///   finite number.
    pub fn column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SpcError::MissingColumn {
                column: name.to_string(),
                available: self.headers.clone(),
            })?;

        self.records
            .iter()
            .map(|record| {
                parse_cell(&record.fields[idx]).ok_or_else(|| SpcError::InvalidValue {
                    line: record.line,
                    column: name.to_string(),
                    value: record.fields[idx].clone(),
                })
            })
            .collect()
    }

    /// Non-missing values of `name`, re-indexed contiguously from 0.
    pub fn cleaned_column(&self, name: &str) -> Result<Vec<f64>> {
        let raw = self.column(name)?;
        let total = raw.len();
        let cleaned: Vec<f64> = raw.into_iter().flatten().collect();
        debug!(
            column = name,
            total,
            dropped = total - cleaned.len(),
            "selected column"
        );
        Ok(cleaned)
    }
}

/// Parses one cell: `Some(None)` for missing, `Some(Some(x))` for a finite
/// number, `None` when the cell is neither.
fn parse_cell(cell: &str) -> Option<Option<f64>> {
    let trimmed = cell.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return Some(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(Some(v)),
        _ => None,
    }
}

/// Splits CSV text into records, honouring quoted fields.
fn split_records(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                flush_record(&mut records, &mut fields, &mut field, start_line);
                line += 1;
                start_line = line;
            }
            _ => field.push(c),
        }
    }
    flush_record(&mut records, &mut fields, &mut field, start_line);

    records
}

fn flush_record(
    records: &mut Vec<Record>,
    fields: &mut Vec<String>,
    field: &mut String,
    line: usize,
) {
    fields.push(std::mem::take(field));
    let fields = std::mem::take(fields);
    // Blank line
    if fields.len() == 1 && fields[0].trim().is_empty() {
        return;
    }
    records.push(Record { line, fields });
}
