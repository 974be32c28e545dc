//! # Execution Coordination
//!
//! Plans partitions over a [`CorpusView`], runs one worker task per partition
//! on a dedicated [`rayon`] pool, and aggregates the results.
//!
//! Workers share nothing mutable: each owns its partition, reads through its
//! own file handles, and accumulates into its own [`WorkerResult`]. The only
//! join point is the final collection before aggregation.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use rayon::prelude::*;

use crate::{
    aggregate::{Report, WorkerResult, aggregate},
    corpus::CorpusView,
    counting::{BatchCount, TokenCounter, count_batch},
    errors::{TCResult, TokencountError},
    partition::{Partition, plan},
    scanner::BatchScanner,
};

/// The default number of rows per batch request.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// The default worker count: the available parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// A shared cancellation flag.
///
/// Workers check it before each batch request; once set, they stop and
/// return what they have accumulated.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Has cancellation been requested?
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for a counting run.
#[derive(Clone, Debug)]
pub struct CountOptions {
    /// The field to tokenize.
    pub field: String,

    /// The number of partitions / worker tasks.
    pub workers: usize,

    /// The maximum number of rows per batch request.
    pub batch_size: usize,

    /// Cancellation flag.
    pub cancel: CancelFlag,
}

impl CountOptions {
    /// Options for `field`, with default workers and batch size.
    pub fn new<S: Into<String>>(field: S) -> Self {
        Self {
            field: field.into(),
            workers: default_workers(),
            batch_size: DEFAULT_BATCH_SIZE,
            cancel: CancelFlag::default(),
        }
    }

    /// Set the number of workers.
    pub fn with_workers(
        mut self,
        workers: usize,
    ) -> Self {
        self.workers = workers;
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(
        mut self,
        batch_size: usize,
    ) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the cancellation flag.
    pub fn with_cancel(
        mut self,
        cancel: CancelFlag,
    ) -> Self {
        self.cancel = cancel;
        self
    }

    /// Check the options are usable.
    pub fn validate(&self) -> TCResult<()> {
        if self.field.is_empty() {
            return Err(TokencountError::InvalidOptions(
                "field name must not be empty".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(TokencountError::InvalidOptions(
                "workers must be >= 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(TokencountError::InvalidOptions(
                "batch size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Count one partition.
///
/// Never fails: a read error ends the partition early, and is recorded on
/// the result along with the counts accumulated before it.
pub fn run_partition<C: TokenCounter + ?Sized>(
    view: &CorpusView,
    counter: &C,
    partition: &Partition,
    options: &CountOptions,
) -> WorkerResult {
    let mut result = WorkerResult {
        index: partition.index,
        label: partition.label(),
        ..Default::default()
    };

    let mut count = BatchCount::default();
    let mut scanner = BatchScanner::new(view, &options.field, partition, options.batch_size);
    loop {
        if options.cancel.is_cancelled() {
            log::warn!(
                "{}: cancelled at row {} of {}..{}",
                result.label,
                scanner.cursor(),
                partition.start_row,
                partition.end_row
            );
            result.cancelled = true;
            break;
        }

        match scanner.next() {
            None => break,
            Some(Ok(batch)) => {
                count += count_batch(&batch.values, counter);
                result.rows_scanned += batch.len() as u64;
            }
            Some(Err(err)) => {
                log::error!("Error processing {}: {}", result.label, err);
                result.error = Some(err.to_string());
                break;
            }
        }
    }

    result.token_count = count.tokens;
    result.items_processed = count.items;

    log::debug!(
        "{}: rows {}..{}, {} tokens, {} items",
        result.label,
        partition.start_row,
        partition.end_row,
        result.token_count,
        result.items_processed
    );

    result
}

/// Drives the worker tasks of a run.
pub struct Coordinator<'a, C: TokenCounter + ?Sized> {
    view: &'a CorpusView,
    counter: &'a C,
    options: CountOptions,
}

impl<'a, C: TokenCounter + ?Sized> Coordinator<'a, C> {
    /// Build a coordinator.
    pub fn new(
        view: &'a CorpusView,
        counter: &'a C,
        options: CountOptions,
    ) -> Self {
        Self {
            view,
            counter,
            options,
        }
    }

    /// The run options.
    pub fn options(&self) -> &CountOptions {
        &self.options
    }

    /// Plan the partitions of this run.
    pub fn plan(&self) -> Vec<Partition> {
        plan(self.view.total_rows(), self.options.workers)
    }

    /// Run to completion.
    pub fn run(&self) -> TCResult<Report> {
        self.run_with_observer(&|_| {})
    }

    /// Run to completion, calling `observer` as each partition finishes.
    ///
    /// `observer` is called from worker threads, in completion order.
    ///
    /// # Errors
    /// Only for invalid options, or if the worker pool cannot be built;
    /// partition failures are reported in the [`Report`].
    pub fn run_with_observer(
        &self,
        observer: &(dyn Fn(&WorkerResult) + Sync),
    ) -> TCResult<Report> {
        self.options.validate()?;

        if self.view.total_rows() == 0 {
            log::info!("empty corpus; nothing to count");
            return Ok(Report::default());
        }

        let partitions = self.plan();
        log::info!(
            "counting field {:?} over {} rows in {} partitions (batch size {})",
            self.options.field,
            self.view.total_rows(),
            partitions.len(),
            self.options.batch_size
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .thread_name(|idx| format!("tokencount-worker-{idx}"))
            .build()?;

        let results: Vec<WorkerResult> = pool.install(|| {
            partitions
                .par_iter()
                .with_max_len(1)
                .map(|partition| {
                    let result = run_partition(self.view, self.counter, partition, &self.options);
                    observer(&result);
                    result
                })
                .collect()
        });

        Ok(aggregate(results))
    }
}
