//! # In-Memory Rows
//!
//! A [`RowSource`] over JSON values held in memory.

use serde_json::Value;

use crate::{
    errors::TCResult,
    readers::{FieldValue, RowSource, json_reader::field_value},
};

/// An in-memory [`RowSource`] of JSON rows.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    name: String,
    rows: Vec<Value>,
}

impl MemorySource {
    /// Build a source over `rows`.
    pub fn new<S: Into<String>>(
        name: S,
        rows: Vec<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build a source with a single field, one row per value.
    pub fn from_texts<S, I, T>(
        name: S,
        field: &str,
        texts: I,
    ) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let rows = texts
            .into_iter()
            .map(|text| {
                let mut row = serde_json::Map::new();
                row.insert(field.to_string(), Value::String(text.into()));
                Value::Object(row)
            })
            .collect();
        Self::new(name, rows)
    }
}

impl RowSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn count_rows(&self) -> TCResult<u64> {
        Ok(self.rows.len() as u64)
    }

    fn read_field(
        &self,
        field: &str,
        offset: u64,
        limit: usize,
    ) -> TCResult<Vec<FieldValue>> {
        Ok(self
            .rows
            .iter()
            .skip(offset as usize)
            .take(limit)
            .map(|row| field_value(row.clone(), field))
            .collect())
    }
}
