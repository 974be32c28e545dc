//! # Result Aggregation
//!
//! Combines per-partition [`WorkerResult`]s into a [`Report`].

use serde::Serialize;

/// The outcome of one worker task over one partition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WorkerResult {
    /// The partition index.
    pub index: usize,

    /// A display label for the partition.
    pub label: String,

    /// Tokens counted.
    pub token_count: u64,

    /// Rows whose field held tokenizable text.
    pub items_processed: u64,

    /// Rows read, tokenizable or not.
    pub rows_scanned: u64,

    /// A diagnostic, if the partition failed part way.
    ///
    /// The counts are then partial: everything accumulated before the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Did the worker stop early because the run was cancelled?
    pub cancelled: bool,
}

impl WorkerResult {
    /// Did this partition fail?
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// The combined result of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Report {
    /// Total tokens across all partitions.
    pub total_tokens: u64,

    /// Total tokenizable items across all partitions.
    pub total_items: u64,

    /// Total rows scanned across all partitions.
    pub total_rows: u64,

    /// Per-partition results; by `token_count` descending, then `index` ascending.
    pub per_partition: Vec<WorkerResult>,

    /// `total_tokens / total_items`; `None` when there are no items.
    pub average_tokens_per_item: Option<f64>,
}

impl Report {
    /// The partitions which reported an error.
    pub fn failed_partitions(&self) -> impl Iterator<Item = &WorkerResult> {
        self.per_partition.iter().filter(|r| r.is_failed())
    }

    /// Were any partitions cut short by cancellation?
    pub fn was_cancelled(&self) -> bool {
        self.per_partition.iter().any(|r| r.cancelled)
    }

    /// The average, to two decimal places; `"0.00"` when undefined.
    pub fn format_average(&self) -> String {
        format!("{:.2}", self.average_tokens_per_item.unwrap_or(0.0))
    }
}

/// Combine worker results into a [`Report`].
///
/// Totals do not depend on the input order; the echoed results are re-sorted.
pub fn aggregate(results: Vec<WorkerResult>) -> Report {
    let total_tokens = results.iter().map(|r| r.token_count).sum::<u64>();
    let total_items = results.iter().map(|r| r.items_processed).sum::<u64>();
    let total_rows = results.iter().map(|r| r.rows_scanned).sum::<u64>();

    let mut per_partition = results;
    per_partition.sort_by(|a, b| {
        b.token_count
            .cmp(&a.token_count)
            .then_with(|| a.index.cmp(&b.index))
    });

    let average_tokens_per_item = if total_items > 0 {
        Some(total_tokens as f64 / total_items as f64)
    } else {
        None
    };

    Report {
        total_tokens,
        total_items,
        total_rows,
        per_partition,
        average_tokens_per_item,
    }
}
