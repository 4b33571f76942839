//! CSV tokenizing and document parsing.
//!
//! Quoting is RFC-4180-like: fields may be wrapped in double quotes to carry
//! embedded commas, and `""` inside a quoted field is a literal quote.
//! Unbalanced quotes are tolerated; whatever was scanned up to end-of-line
//! becomes the last field.

use std::collections::BTreeMap;

use crate::entity::EntityKind;
use crate::error::FormatError;

/// One data line as a header-to-value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow(BTreeMap<String, String>);

impl ImportRow {
    /// Value for a lower-cased column name, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ImportRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ImportRow(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A parsed CSV document: the normalized header and the rows that survived
/// the blank-row filter, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<ImportRow>,
}

/// Split one line into trimmed fields.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Parse a whole CSV document for the given entity kind.
///
/// Fails when there is no data row or when the header lacks one of the
/// kind's required columns. Rows whose two identifying fields are both empty
/// are dropped without being counted.
pub fn parse_document(text: &str, kind: EntityKind) -> Result<ParsedCsv, FormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let lines: Vec<&str> = normalized
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(FormatError::TooFewLines);
    }

    let headers: Vec<String> = tokenize_line(lines[0])
        .iter()
        .map(|h| strip_quote_pair(&h.trim().to_lowercase()).to_string())
        .collect();

    let missing: Vec<String> = kind
        .required_columns()
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(FormatError::MissingColumns(missing));
    }

    let [first_key, second_key] = kind.primary_fields();

    let rows = lines[1..]
        .iter()
        .map(|line| {
            let values = tokenize_line(line);
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = values.get(i).map(|v| strip_quote_pair(v)).unwrap_or("");
                    (header.clone(), value.trim().to_string())
                })
                .collect::<ImportRow>()
        })
        .filter(|row| !(row.get(first_key).is_empty() && row.get(second_key).is_empty()))
        .collect();

    Ok(ParsedCsv { headers, rows })
}

/// Remove one leading and one trailing `"` if present.
fn strip_quote_pair(s: &str) -> &str {
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}
