//! # `tokencount`
//!
//! Count the tokens of one text field across a dataset directory.

mod logging;
mod output;

use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokencount::{
    Coordinator,
    CorpusView,
    CountOptions,
    DiscoverOptions,
    WorkerResult,
    coordinator::{DEFAULT_BATCH_SIZE, default_workers},
    corpus::ExclusionReason,
    formats::discover,
    vocab::{VocabularyResolution, resolve_vocabulary},
};

use crate::logging::LogArgs;

/// Count BPE tokens in a field across Parquet, CSV/TSV, and JSON/JSONL files.
#[derive(Parser, Debug)]
#[command(name = "tokencount", version, about, long_about = None)]
pub struct Args {
    /// The dataset directory (or a single data file).
    dataset_path: PathBuf,

    /// The field (column or key) to tokenize.
    field: String,

    /// Model name, or a vocabulary name such as `cl100k_base`.
    #[arg(long, default_value = "gpt-4o")]
    model: String,

    /// Number of parallel workers.
    #[arg(long, default_value_t = default_workers())]
    workers: usize,

    /// Rows per batch request.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Descend into subdirectories.
    #[arg(long)]
    recursive: bool,

    /// Print the per-partition results.
    #[arg(long)]
    show_partitions: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    #[clap(flatten)]
    logging: LogArgs,
}

impl Args {
    fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(2)?;

        // Human-readable chatter stays off stdout in JSON mode.
        let say = |line: String| {
            if self.json {
                log::info!("{line}");
            } else {
                println!("{line}");
            }
        };

        let resolution = resolve_vocabulary(&self.model);
        if let Some(notice) = fallback_notice(&self.model, &resolution) {
            if self.json {
                log::warn!("{notice}");
            } else {
                println!("{notice}");
            }
        }
        let counter = resolution.vocabulary.load_counter()?;
        say(format!("Using encoding: {}", resolution.vocabulary));

        let options = CountOptions::new(self.field.clone())
            .with_workers(self.workers)
            .with_batch_size(self.batch_size);
        options.validate()?;

        say(format!("Processing dataset: {}", self.dataset_path.display()));
        say(format!("Field to tokenize: {}", self.field));
        say(format!("Using {} workers", self.workers));

        let files = discover(
            &self.dataset_path,
            &DiscoverOptions::default().with_recursive(self.recursive),
        )?;
        let view = CorpusView::build(&files);

        let unreadable = view
            .excluded()
            .iter()
            .filter(|e| matches!(e.reason, ExclusionReason::Unreadable(_)))
            .count();
        if unreadable > 0 {
            log::warn!("{unreadable} unreadable file(s) excluded");
        }
        log::info!(
            "{} rows in {} file(s); {} file(s) excluded",
            view.total_rows(),
            view.num_sources(),
            view.excluded().len()
        );

        let progress_bar = if self.no_progress || !io::stdout().is_terminal() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(self.workers as u64)
        };
        progress_bar.set_style(ProgressStyle::with_template(
            "{msg} [{elapsed_precise}] {wide_bar} {pos}/{len}",
        )?);
        progress_bar.set_message("Counting tokens");

        let report = Coordinator::new(&view, &counter, options).run_with_observer(
            &|result: &WorkerResult| {
                progress_bar.inc(1);
                log::debug!("{} finished: {} tokens", result.label, result.token_count);
            },
        )?;
        progress_bar.finish_and_clear();

        let failed = report.failed_partitions().count();
        if failed > 0 {
            log::warn!(
                "{failed} of {} partition(s) failed; totals are partial",
                report.per_partition.len()
            );
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if self.show_partitions {
            print!("\n{}", output::format_partitions(&report));
        }
        println!("{}", output::format_summary(&report));

        Ok(())
    }
}

/// The notice shown when `model` was not recognized.
fn fallback_notice(
    model: &str,
    resolution: &VocabularyResolution,
) -> Option<String> {
    resolution.fallback.then(|| {
        format!(
            "Model {model} not found. Using '{}' encoding instead.",
            resolution.vocabulary
        )
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Args::parse().run()
}
