//! # Parquet Reader
//!
//! Row counts come from the footer metadata; reads push the row window and
//! a single-column projection down into the Parquet decoder.

use std::{fs::File, path::Path};

use arrow::{
    array::{Array, ArrayRef, AsArray},
    datatypes::DataType,
};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};

use crate::{errors::TCResult, readers::FieldValue};

/// Upper bound on decoded batch rows per read.
const MAX_DECODE_BATCH: usize = 8192;

fn open_builder(path: &Path) -> TCResult<ParquetRecordBatchReaderBuilder<File>> {
    let file = File::open(path)?;
    Ok(ParquetRecordBatchReaderBuilder::try_new(file)?)
}

fn footer_rows(builder: &ParquetRecordBatchReaderBuilder<File>) -> u64 {
    builder.metadata().file_metadata().num_rows().max(0) as u64
}

/// Count the rows of a Parquet file, from its footer.
pub fn count_rows(path: &Path) -> TCResult<u64> {
    Ok(footer_rows(&open_builder(path)?))
}

/// Read `field` from up to `limit` rows, starting at row `offset`.
///
/// A column missing from the file reads as [`FieldValue::Null`] rows.
pub fn read_field(
    path: &Path,
    field: &str,
    offset: u64,
    limit: usize,
) -> TCResult<Vec<FieldValue>> {
    let builder = open_builder(path)?;
    let num_rows = footer_rows(&builder);
    if offset >= num_rows || limit == 0 {
        return Ok(Vec::new());
    }
    let available = (num_rows - offset).min(limit as u64) as usize;

    let Some(column) = builder
        .schema()
        .fields()
        .iter()
        .position(|f| f.name() == field)
    else {
        return Ok(vec![FieldValue::Null; available]);
    };

    let mask = ProjectionMask::roots(builder.parquet_schema(), [column]);
    let reader = builder
        .with_projection(mask)
        .with_batch_size(available.min(MAX_DECODE_BATCH))
        .with_offset(offset as usize)
        .with_limit(available)
        .build()?;

    let mut values = Vec::with_capacity(available);
    for batch in reader {
        let batch = batch?;
        extend_field_values(&mut values, batch.column(0))?;
    }
    Ok(values)
}

fn is_text_type(data_type: &DataType) -> bool {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, value) => is_text_type(value),
        _ => false,
    }
}

/// Append the [`FieldValue`]s of an arrow column.
pub fn extend_field_values(
    values: &mut Vec<FieldValue>,
    column: &ArrayRef,
) -> TCResult<()> {
    if is_text_type(column.data_type()) {
        let text = arrow::compute::cast(column.as_ref(), &DataType::Utf8)?;
        values.extend(text.as_string::<i32>().iter().map(|value| match value {
            Some(text) => FieldValue::Text(text.to_string()),
            None => FieldValue::Null,
        }));
    } else {
        let nulls = column.logical_nulls();
        values.extend((0..column.len()).map(|idx| {
            if nulls.as_ref().is_some_and(|n| n.is_null(idx)) {
                FieldValue::Null
            } else {
                FieldValue::NonText
            }
        }));
    }
    Ok(())
}
