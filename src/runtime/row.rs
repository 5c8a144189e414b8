//! Report row decoding
//!
//! Rows are unescaped comma-separated strings whose first two fields are
//! always date and time.

use super::columns::ColumnKind;
use super::types::{Record, RecordKind};
use thiserror::Error;

/// A row that could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("row has {found} fields, expected at least {expected}")]
    TooFewFields { expected: usize, found: usize },
}

/// A row split into its timestamp and data fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub fields: Vec<&'a str>,
}

impl<'a> RawRow<'a> {
    /// Split a row on `,` and strip the leading date and time
    pub fn split(raw: &'a str) -> Result<Self, RowError> {
        let mut parts = raw.split(',');
        match (parts.next(), parts.next()) {
            (Some(date), Some(time)) => Ok(Self {
                date,
                time,
                fields: parts.collect(),
            }),
            _ => Err(RowError::TooFewFields {
                expected: 2,
                found: raw.split(',').count(),
            }),
        }
    }
}

/// One resolved report column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// Column layout for thermostat report rows, resolved once per response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSpec {
    columns: Vec<Column>,
}

impl ColumnSpec {
    /// Build from column names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                Column {
                    kind: ColumnKind::for_column(&name),
                    name,
                }
            })
            .collect();
        Self { columns }
    }

    /// Build from the vendor's comma-joined column string
    pub fn parse(joined: &str) -> Self {
        if joined.is_empty() {
            return Self::default();
        }
        Self::new(joined.split(','))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Decode one report row into a thermostat record
    ///
    /// Fields past the last column are ignored.
    pub fn decode_row(&self, raw: &str) -> Result<Record, RowError> {
        let row = RawRow::split(raw)?;
        if row.fields.len() < self.columns.len() {
            return Err(RowError::TooFewFields {
                expected: self.columns.len() + 2,
                found: row.fields.len() + 2,
            });
        }

        let mut record = Record::new(RecordKind::Thermostat, row.date, row.time);
        for (column, field) in self.columns.iter().zip(row.fields) {
            record.insert(column.name.clone(), column.kind.decode(field));
        }
        Ok(record)
    }
}
