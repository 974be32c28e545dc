//! # CSV / TSV Reader
//!
//! Delimited text with a header row. Every cell is text; a column missing
//! from the header, or a short record, reads as [`FieldValue::Null`].

use std::io::Read;

use crate::{errors::TCResult, readers::FieldValue};

fn reader_builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter);
    builder
}

/// Count the data records (excluding the header) of a delimited stream.
pub fn count_rows<R: Read>(
    reader: R,
    delimiter: u8,
) -> TCResult<u64> {
    let mut rdr = reader_builder(delimiter).from_reader(reader);
    let mut record = csv::ByteRecord::new();
    let mut count = 0;
    while rdr.read_byte_record(&mut record)? {
        count += 1;
    }
    Ok(count)
}

/// Read `field` from up to `limit` records, starting at record `offset`.
pub fn read_field<R: Read>(
    reader: R,
    delimiter: u8,
    field: &str,
    offset: u64,
    limit: usize,
) -> TCResult<Vec<FieldValue>> {
    let mut rdr = reader_builder(delimiter).from_reader(reader);
    let column = rdr.headers()?.iter().position(|name| name.trim() == field);

    // Skipped records are only framed, never decoded as UTF-8.
    let mut skip_record = csv::ByteRecord::new();
    let mut skipped = 0;
    while skipped < offset {
        if !rdr.read_byte_record(&mut skip_record)? {
            return Ok(Vec::new());
        }
        skipped += 1;
    }

    let rows = rdr.into_records().map(|record| -> TCResult<FieldValue> {
        let record = record?;
        Ok(match column.and_then(|idx| record.get(idx)) {
            Some(text) => FieldValue::Text(text.to_string()),
            None => FieldValue::Null,
        })
    });

    super::skip_take(rows, 0, limit)
}
