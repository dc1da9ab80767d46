use crate::errors::{AppError, AppResult};
use rusqlite::Row;
use rusqlite::types::Value;

/// A result row keyed by column name, built from the statement's column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn from_row(row: &Row, columns: &[String]) -> rusqlite::Result<Self> {
        let mut fields = Vec::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            fields.push((name.clone(), row.get::<_, Value>(idx)?));
        }
        Ok(Self { fields })
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn integer(&self, column: &str) -> AppResult<i64> {
        match self.get(column) {
            Some(Value::Integer(v)) => Ok(*v),
            _ => Err(missing(column)),
        }
    }

    /// Text column; NULL reads as an empty string.
    pub fn text(&self, column: &str) -> AppResult<&str> {
        match self.get(column) {
            Some(Value::Text(s)) => Ok(s.as_str()),
            Some(Value::Null) => Ok(""),
            _ => Err(missing(column)),
        }
    }
}

fn missing(column: &str) -> AppError {
    AppError::MissingColumn {
        column: column.to_string(),
    }
}
