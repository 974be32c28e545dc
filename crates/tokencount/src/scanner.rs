//! # Batch Scanning
//!
//! Streams one partition of a [`CorpusView`] as bounded batches of field values.

use crate::{corpus::CorpusView, errors::TCResult, partition::Partition, readers::FieldValue};

/// A contiguous run of field values from one partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    /// The global row index of the first value.
    pub start_row: u64,

    /// The field values, in row order.
    pub values: Vec<FieldValue>,
}

impl Batch {
    /// The number of rows in the batch.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Is the batch empty?
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A lazy, finite, non-restartable iterator over the batches of a partition.
///
/// Each step issues one bounded `scan` against the view and advances the
/// cursor by the number of rows actually returned. Iteration ends when the
/// cursor reaches the partition end, when the view returns a short read, or
/// after the first error.
pub struct BatchScanner<'a> {
    view: &'a CorpusView,
    field: &'a str,
    cursor: u64,
    end_row: u64,
    batch_size: usize,
    done: bool,
}

impl<'a> BatchScanner<'a> {
    /// Scan `partition` of `view`, projected to `field`.
    ///
    /// A `batch_size` of 0 is treated as 1.
    pub fn new(
        view: &'a CorpusView,
        field: &'a str,
        partition: &Partition,
        batch_size: usize,
    ) -> Self {
        Self {
            view,
            field,
            cursor: partition.start_row,
            end_row: partition.end_row,
            batch_size: batch_size.max(1),
            done: partition.is_empty(),
        }
    }

    /// The next row to be read.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}

impl Iterator for BatchScanner<'_> {
    type Item = TCResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor >= self.end_row {
            return None;
        }

        let limit = (self.end_row - self.cursor).min(self.batch_size as u64) as usize;
        let values = match self.view.scan(self.field, self.cursor, limit) {
            Ok(values) => values,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        if values.is_empty() {
            self.done = true;
            return None;
        }
        if values.len() < limit {
            self.done = true;
        }

        let start_row = self.cursor;
        self.cursor += values.len() as u64;

        log::trace!(
            "scanned rows {}..{} of field {:?}",
            start_row,
            self.cursor,
            self.field
        );

        Some(Ok(Batch { start_row, values }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        partition::plan,
        readers::{MemorySource, RowSource},
    };

    fn view_of(n: usize) -> CorpusView {
        let source: Arc<dyn RowSource> = Arc::new(MemorySource::from_texts(
            "rows",
            "text",
            (0..n).map(|i| i.to_string()),
        ));
        CorpusView::from_sources([source]).unwrap()
    }

    #[test]
    fn test_batches_cover_partition() -> TCResult<()> {
        let view = view_of(2500);
        let parts = plan(view.total_rows(), 4);

        for part in &parts {
            let batches = BatchScanner::new(&view, "text", part, 250).collect::<TCResult<Vec<_>>>()?;
            assert_eq!(
                batches.iter().map(|b| b.len()).collect::<Vec<_>>(),
                vec![250, 250, 125]
            );

            let mut cursor = part.start_row;
            for batch in &batches {
                assert_eq!(batch.start_row, cursor);
                cursor += batch.len() as u64;
            }
            assert_eq!(cursor, part.end_row);

            let first = &batches[0].values[0];
            assert_eq!(first, &FieldValue::Text(part.start_row.to_string()));
        }

        Ok(())
    }

    #[test]
    fn test_batch_larger_than_partition() -> TCResult<()> {
        let view = view_of(10);
        let parts = plan(10, 3);

        let batches = BatchScanner::new(&view, "text", &parts[2], 1000).collect::<TCResult<Vec<_>>>()?;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].start_row, 6);
        assert_eq!(batches[0].len(), 4);

        Ok(())
    }

    #[test]
    fn test_empty_partition() {
        let view = view_of(0);
        let parts = plan(0, 2);
        assert_eq!(BatchScanner::new(&view, "text", &parts[0], 10).count(), 0);
    }

    #[test]
    fn test_partition_past_end_of_data() -> TCResult<()> {
        // A stale partition, planned over more rows than the view holds.
        let view = view_of(5);
        let part = Partition {
            index: 0,
            num_partitions: 1,
            start_row: 3,
            end_row: 20,
        };

        let mut scanner = BatchScanner::new(&view, "text", &part, 4);
        let batch = scanner.next().unwrap()?;
        assert_eq!(batch.len(), 2);
        assert!(scanner.next().is_none());
        assert_eq!(scanner.cursor(), 5);

        Ok(())
    }
}
