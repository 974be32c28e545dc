//! # Structured-File Readers
//!
//! Row-range access to the fields of data files.
//!
//! Every reader exposes the same two operations through [`RowSource`]:
//! * [`RowSource::count_rows`] - count rows without keeping them.
//! * [`RowSource::read_field`] - read one field of a contiguous row range.
//!
//! Readers hold no open handles between calls; each call opens the file
//! (and any compression container) afresh, so concurrent workers never
//! share a handle.

use std::fmt::Debug;

use crate::{
    errors::TCResult,
    formats::{FileEntry, FormatTag},
};

pub mod containers;
pub mod delimited;
pub mod json_reader;
pub mod memory;
pub mod parquet_reader;

#[doc(inline)]
pub use memory::MemorySource;

/// The value of the requested field on one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// A text value; possibly empty.
    Text(String),

    /// The field is null or absent on this row.
    Null,

    /// The field holds a non-text value (number, list, object, ...).
    NonText,
}

impl FieldValue {
    /// Get the tokenizable text, if any.
    ///
    /// Only non-empty text is tokenizable.
    pub fn tokenizable(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) if !text.is_empty() => Some(text.as_str()),
            _ => None,
        }
    }
}

/// A source of rows with named fields.
pub trait RowSource: Send + Sync + Debug {
    /// A short description, for logs.
    fn describe(&self) -> String;

    /// Count the rows of the source.
    fn count_rows(&self) -> TCResult<u64>;

    /// Read `field` from up to `limit` rows, starting at row `offset`.
    ///
    /// Returns fewer than `limit` values only when the source ends.
    fn read_field(
        &self,
        field: &str,
        offset: u64,
        limit: usize,
    ) -> TCResult<Vec<FieldValue>>;
}

/// A [`RowSource`] over a single supported data file.
#[derive(Clone, Debug)]
pub struct FileSource {
    entry: FileEntry,
}

impl FileSource {
    /// Build a source for `entry`.
    ///
    /// Returns `None` for unsupported entries.
    pub fn new(entry: FileEntry) -> Option<Self> {
        if entry.is_supported() {
            Some(Self { entry })
        } else {
            None
        }
    }

    /// Get the file entry.
    pub fn entry(&self) -> &FileEntry {
        &self.entry
    }
}

impl RowSource for FileSource {
    fn describe(&self) -> String {
        format!(
            "{} ({}, {})",
            self.entry.path.display(),
            self.entry.format,
            self.entry.compression
        )
    }

    fn count_rows(&self) -> TCResult<u64> {
        let entry = &self.entry;
        match entry.format {
            FormatTag::Parquet => parquet_reader::count_rows(&entry.path),
            FormatTag::Csv | FormatTag::Tsv => {
                delimited::count_rows(containers::open_reader(entry)?, delimiter(entry.format))
            }
            FormatTag::Json | FormatTag::Jsonl => {
                json_reader::count_rows(containers::open_reader(entry)?)
            }
            FormatTag::Unsupported => Ok(0),
        }
    }

    fn read_field(
        &self,
        field: &str,
        offset: u64,
        limit: usize,
    ) -> TCResult<Vec<FieldValue>> {
        let entry = &self.entry;
        match entry.format {
            FormatTag::Parquet => parquet_reader::read_field(&entry.path, field, offset, limit),
            FormatTag::Csv | FormatTag::Tsv => delimited::read_field(
                containers::open_reader(entry)?,
                delimiter(entry.format),
                field,
                offset,
                limit,
            ),
            FormatTag::Json | FormatTag::Jsonl => {
                json_reader::read_field(containers::open_reader(entry)?, field, offset, limit)
            }
            FormatTag::Unsupported => Ok(Vec::new()),
        }
    }
}

fn delimiter(format: FormatTag) -> u8 {
    match format {
        FormatTag::Tsv => b'\t',
        _ => b',',
    }
}

/// Skip `offset` items, then collect up to `limit` of them.
///
/// Shared by the streaming (CSV / JSON) readers, which have no random access.
pub(crate) fn skip_take<I>(
    rows: I,
    offset: u64,
    limit: usize,
) -> TCResult<Vec<FieldValue>>
where
    I: Iterator<Item = TCResult<FieldValue>>,
{
    let mut rows = rows;
    let mut skipped = 0;
    while skipped < offset {
        match rows.next() {
            Some(row) => {
                row?;
                skipped += 1;
            }
            None => return Ok(Vec::new()),
        }
    }

    let mut values = Vec::with_capacity(limit.min(1 << 16));
    for row in rows.take(limit) {
        values.push(row?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizable() {
        assert_eq!(FieldValue::Text("hi".into()).tokenizable(), Some("hi"));
        assert_eq!(FieldValue::Text(String::new()).tokenizable(), None);
        assert_eq!(FieldValue::Null.tokenizable(), None);
        assert_eq!(FieldValue::NonText.tokenizable(), None);
    }

    #[test]
    fn test_unsupported_entry_has_no_source() {
        assert!(FileSource::new(FileEntry::new("notes.txt")).is_none());
        assert!(FileSource::new(FileEntry::new("rows.jsonl")).is_some());
    }

    #[test]
    fn test_skip_take() -> TCResult<()> {
        let rows = || (0..10).map(|i| -> TCResult<FieldValue> { Ok(FieldValue::Text(i.to_string())) });

        let values = skip_take(rows(), 3, 4)?;
        assert_eq!(
            values,
            (3..7)
                .map(|i| FieldValue::Text(i.to_string()))
                .collect::<Vec<_>>()
        );

        assert_eq!(skip_take(rows(), 8, 4)?.len(), 2);
        assert!(skip_take(rows(), 10, 4)?.is_empty());
        assert!(skip_take(rows(), 42, 4)?.is_empty());

        Ok(())
    }
}
