//! Relations
//!
//! A relation is a fixed schema (primary key first) plus insertion-ordered
//! rows, persisted as one delimiter-separated text file: a header line with
//! the schema, then one line per row in the same column order.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use super::value::Value;
use crate::error::{Error, Result};

/// Field delimiter of the backing file format
const DELIMITER: char = ',';

/// One row: schema column -> value, iterated in schema order
pub type Row = IndexMap<String, Value>;

/// An in-memory relation, loaded from and saved to a backing file as a
/// whole. The schema is fixed at creation and never altered.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Primary key column name
    primary_key: String,
    /// Non-key column names, in schema order
    columns: Vec<String>,
    /// Rows in insertion order
    rows: Vec<Row>,
}

impl Relation {
    /// Create an empty relation with the given schema
    pub fn new(primary_key: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Load a relation from its backing file.
    ///
    /// Field values are re-typed by content: a field of ASCII digits becomes
    /// an integer, everything else text. A structurally invalid file (no
    /// header, or a row whose arity differs from the header) is an error.
    pub fn load(name: &str, path: &Path) -> Result<Relation> {
        let text = fs::read_to_string(path)?;
        let mut records = parse_records(&text).into_iter();

        let mut header = records
            .next()
            .ok_or_else(|| Error::CorruptRelation(name.to_string(), "missing header".to_string()))?
            .into_iter();
        let primary_key = header.next().filter(|field| !field.is_empty()).ok_or_else(|| {
            Error::CorruptRelation(name.to_string(), "missing primary key column".to_string())
        })?;
        let columns: Vec<String> = header.collect();

        let mut relation = Relation::new(primary_key, columns);
        let schema = relation.schema();

        for (index, record) in records.enumerate() {
            if record.len() != schema.len() {
                return Err(Error::CorruptRelation(
                    name.to_string(),
                    format!(
                        "row {} has {} fields, schema has {}",
                        index + 1,
                        record.len(),
                        schema.len()
                    ),
                ));
            }
            let row: Row = schema
                .iter()
                .cloned()
                .zip(record.iter().map(|field| Value::from_field(field)))
                .collect();
            relation.rows.push(row);
        }

        Ok(relation)
    }

    /// Rewrite the whole backing file: header line, then one line per row
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = String::new();

        let header: Vec<&str> = std::iter::once(self.primary_key.as_str())
            .chain(self.columns.iter().map(String::as_str))
            .collect();
        push_record(&mut out, header.iter().copied());

        for row in &self.rows {
            let fields: Vec<String> = row.values().map(Value::to_string).collect();
            push_record(&mut out, fields.iter().map(String::as_str));
        }

        fs::write(path, out)?;
        Ok(())
    }

    /// Ordered schema: primary key first, then the other columns
    pub fn schema(&self) -> Vec<String> {
        std::iter::once(self.primary_key.clone())
            .chain(self.columns.iter().cloned())
            .collect()
    }

    /// Name of the primary key column
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Check whether a column is part of the schema
    pub fn column_exists(&self, name: &str) -> bool {
        name == self.primary_key || self.columns.iter().any(|column| column == name)
    }

    /// All rows, in insertion order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Append one row. The caller has already checked the schema and key
    /// constraints; the row must hold every schema column, in schema order.
    pub fn insert_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Evaluate a query against this relation, in fixed order:
    /// filter, then order, then project, then limit.
    ///
    /// All conditions are ANDed equality tests. A condition on the primary
    /// key short-circuits to a direct key lookup instead of a scan; when
    /// several conditions name the key, the last one wins. Ordering is a
    /// stable sort on the named column. Projection reduces each row to
    /// `result_columns` in the requested order, duplicates included. A
    /// positive limit truncates; zero or absent is unbounded.
    pub fn select(
        &self,
        result_columns: &[String],
        conditions: &[(String, Value)],
        order: Option<(&str, bool)>,
        limit: Option<u64>,
    ) -> Vec<Vec<Value>> {
        let mut key = None;
        let mut scans = Vec::new();
        for (column, value) in conditions {
            if *column == self.primary_key {
                key = Some(value);
            } else {
                scans.push((column, value));
            }
        }

        let mut matched: Vec<&Row> = match key {
            // Key values are unique, so the lookup yields at most one row.
            Some(value) => self
                .rows
                .iter()
                .find(|row| &row[self.primary_key.as_str()] == value)
                .into_iter()
                .collect(),
            None => self.rows.iter().collect(),
        };

        matched.retain(|row| scans.iter().all(|(column, value)| row[column.as_str()] == **value));

        if let Some((column, ascending)) = order {
            matched.sort_by(|a, b| {
                let ordering = a[column].cmp(&b[column]);
                if ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let mut rows: Vec<Vec<Value>> = matched
            .into_iter()
            .map(|row| {
                result_columns
                    .iter()
                    .map(|column| row[column.as_str()].clone())
                    .collect()
            })
            .collect();

        if let Some(limit) = limit {
            if limit > 0 {
                rows.truncate(limit as usize);
            }
        }

        rows
    }
}

/// Append one record line to `out`, quoting only the fields that need it
fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(DELIMITER);
        }
        first = false;
        push_field(out, field);
    }
    out.push('\n');
}

/// Write one field, double-quoting it when it contains the delimiter, a
/// quote or a line break; inner quotes are doubled
fn push_field(out: &mut String, field: &str) {
    if field.contains([DELIMITER, '"', '\n', '\r']) {
        out.push('"');
        for ch in field.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Split a file into records and fields, honoring quoted fields (which may
/// contain delimiters and line breaks)
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }
        match ch {
            // A quote at the start of a field opens a quoted field; the
            // writer quotes every field that contains a quote, so a literal
            // quote never appears here.
            '"' if field.is_empty() => in_quotes = true,
            DELIMITER => fields.push(std::mem::take(&mut field)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                fields.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut fields));
            }
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut fields));
            }
            _ => field.push(ch),
        }
    }

    // A final record without a trailing newline.
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push(fields);
    }

    records
}
