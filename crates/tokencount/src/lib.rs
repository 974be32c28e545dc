//! # `tokencount` Dataset Token Counter
//!
//! Counts BPE tokens in one text field across a directory of heterogeneous
//! data files (Parquet, CSV/TSV, JSON/JSONL; optionally gzip, bzip2, zip, or
//! xz compressed), in parallel, with bounded memory.
//!
//! The pipeline:
//! * [`formats`] discovers the dataset files and resolves their formats.
//! * [`corpus`] unions the supported files into one logical row space.
//! * [`partition`] splits that row space into one contiguous range per worker.
//! * [`scanner`] streams each range in bounded batches.
//! * [`counting`] tokenizes each batch through a [`TokenCounter`].
//! * [`aggregate`] combines the per-partition results into a [`Report`].
//! * [`coordinator`] drives the workers on a [`rayon`] pool.
//!
//! Vocabularies are resolved by model name in [`vocab`], over `tiktoken-rs`.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use tokencount::{CountOptions, DiscoverOptions, count_dataset, vocab::resolve_vocabulary};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let counter = resolve_vocabulary("gpt-4o").vocabulary.load_counter()?;
//!     let report = count_dataset(
//!         Path::new("data/"),
//!         &DiscoverOptions::default(),
//!         &counter,
//!         CountOptions::new("text").with_workers(8),
//!     )?;
//!     println!("{} tokens in {} items", report.total_tokens, report.total_items);
//!     Ok(())
//! }
//! ```

use std::path::Path;

pub mod aggregate;
pub mod coordinator;
pub mod corpus;
pub mod counting;
pub mod errors;
pub mod formats;
pub mod partition;
pub mod readers;
pub mod scanner;
pub mod vocab;

#[doc(inline)]
pub use aggregate::{Report, WorkerResult};
#[doc(inline)]
pub use coordinator::{CancelFlag, Coordinator, CountOptions};
#[doc(inline)]
pub use corpus::CorpusView;
#[doc(inline)]
pub use counting::TokenCounter;
#[doc(inline)]
pub use errors::{TCResult, TokencountError};
#[doc(inline)]
pub use formats::DiscoverOptions;

/// Discover, build, and count a dataset in one call.
///
/// # Errors
/// * [`TokencountError::DatasetNotFound`] if `path` does not exist.
/// * [`TokencountError::InvalidOptions`] for unusable `options`.
///
/// Unreadable files and failing partitions are not errors; see
/// [`CorpusView::excluded`] and [`Report::failed_partitions`].
pub fn count_dataset<C: TokenCounter + ?Sized>(
    path: &Path,
    discover: &DiscoverOptions,
    counter: &C,
    options: CountOptions,
) -> TCResult<Report> {
    let files = formats::discover(path, discover)?;
    let view = CorpusView::build(&files);
    Coordinator::new(&view, counter, options).run()
}
