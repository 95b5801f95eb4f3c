//! Raw tabular shape handed from catalog sources to the loader.

/// Header row plus data rows, all as text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CatalogTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Convenience constructor for literal tables.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|value| value.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|value| value.to_string()).collect())
                .collect(),
        }
    }

    /// Position of a header, matched exactly.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Parses CSV text with the first record as header.
    ///
    /// Supports double-quoted cells (with `""` escapes and embedded newlines),
    /// CRLF line endings and a leading UTF-8 BOM. Blank lines are skipped.
    ///
    /// Parsing is lenient and never fails: text after a closing quote is kept
    /// in the same cell (`"a"b` reads as `ab`) and an unterminated quote runs
    /// to the end of the input.
    pub fn parse_csv(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = split_records(text).into_iter();
        let headers = records.next().unwrap_or_default();
        Self {
            headers,
            rows: records.collect(),
        }
    }
}

fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                other => cell.push(other),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut cell));
                push_record(&mut records, std::mem::take(&mut record));
            }
            other => cell.push(other),
        }
    }

    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        push_record(&mut records, record);
    }

    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.iter().all(|cell| cell.trim().is_empty());
    if !blank {
        records.push(record);
    }
}
