//! # Partition Planning
//!
//! Splits `[0, total_rows)` into `num_partitions` contiguous, disjoint
//! ranges, one per worker.
//!
//! Every partition but the last has `total_rows / num_partitions` rows; the
//! last also absorbs the division remainder, so it may be up to
//! `num_partitions - 1` rows larger than the others.

use std::ops::Range;

use serde::Serialize;

/// A contiguous row range owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Partition {
    /// The partition index, in `[0, num_partitions)`.
    pub index: usize,

    /// The number of partitions in the plan.
    pub num_partitions: usize,

    /// The first row (inclusive).
    pub start_row: u64,

    /// The end row (exclusive).
    pub end_row: u64,
}

impl Partition {
    /// The number of rows.
    pub fn len(&self) -> u64 {
        self.end_row - self.start_row
    }

    /// Is this partition empty?
    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }

    /// The row range.
    pub fn rows(&self) -> Range<u64> {
        self.start_row..self.end_row
    }

    /// A display label, `"Partition {index+1}/{num_partitions}"`.
    pub fn label(&self) -> String {
        format!("Partition {}/{}", self.index + 1, self.num_partitions)
    }
}

/// Plan `num_partitions` partitions over `total_rows` rows.
///
/// Returns exactly `num_partitions` partitions, ordered by index; if
/// `total_rows == 0` they are all empty. `num_partitions == 0` yields no
/// partitions.
pub fn plan(
    total_rows: u64,
    num_partitions: usize,
) -> Vec<Partition> {
    if num_partitions == 0 {
        return Vec::new();
    }

    let chunk_size = total_rows / num_partitions as u64;
    (0..num_partitions)
        .map(|index| {
            let start_row = index as u64 * chunk_size;
            let end_row = if index + 1 == num_partitions {
                total_rows
            } else {
                start_row + chunk_size
            };
            Partition {
                index,
                num_partitions,
                start_row,
                end_row,
            }
        })
        .collect()
}
