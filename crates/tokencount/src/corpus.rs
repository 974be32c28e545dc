//! # Corpus View
//!
//! A read-only logical concatenation of the rows of every supported file in
//! a dataset, in discovery order.
//!
//! Each source is row-counted exactly once, when the view is built; the
//! per-source counts define the global row index space. Reads of a global
//! row window are translated into per-source windows and pushed down to the
//! sources, so no read ever materializes more than the requested rows.
//!
//! The view assumes the underlying files do not change while it is in use.

use std::{fmt, path::PathBuf, sync::Arc};

use crate::{
    errors::TCResult,
    formats::FileEntry,
    readers::{FieldValue, FileSource, RowSource},
};

/// Why a discovered file is not part of the corpus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExclusionReason {
    /// The format is not supported; a silent skip.
    Unsupported,

    /// The file could not be row-counted.
    Unreadable(String),
}

/// A discovered file left out of the corpus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcludedFile {
    /// The file path.
    pub path: PathBuf,

    /// Why it was excluded.
    pub reason: ExclusionReason,
}

struct Segment {
    source: Arc<dyn RowSource>,
    start_row: u64,
    num_rows: u64,
}

impl Segment {
    fn end_row(&self) -> u64 {
        self.start_row + self.num_rows
    }
}

/// A logical, read-only union of rows across many sources.
#[derive(Default)]
pub struct CorpusView {
    segments: Vec<Segment>,
    total_rows: u64,
    excluded: Vec<ExcludedFile>,
}

impl fmt::Debug for CorpusView {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CorpusView")
            .field(
                "sources",
                &self
                    .segments
                    .iter()
                    .map(|s| (s.source.describe(), s.start_row, s.num_rows))
                    .collect::<Vec<_>>(),
            )
            .field("total_rows", &self.total_rows)
            .field("excluded", &self.excluded)
            .finish()
    }
}

impl CorpusView {
    /// An empty corpus.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a corpus over discovered files.
    ///
    /// * Unsupported files are skipped.
    /// * Files which fail to row-count are logged and skipped.
    ///
    /// Both are recorded in [`Self::excluded`].
    pub fn build(files: &[FileEntry]) -> Self {
        let mut view = Self::empty();

        for entry in files {
            let Some(source) = FileSource::new(entry.clone()) else {
                log::debug!("skipping unsupported file: {}", entry.path.display());
                view.excluded.push(ExcludedFile {
                    path: entry.path.clone(),
                    reason: ExclusionReason::Unsupported,
                });
                continue;
            };

            match source.count_rows() {
                Ok(num_rows) => {
                    log::debug!("{}: {} rows", source.describe(), num_rows);
                    view.push_segment(Arc::new(source), num_rows);
                }
                Err(err) => {
                    log::error!("unable to read {}: {}", entry.path.display(), err);
                    view.excluded.push(ExcludedFile {
                        path: entry.path.clone(),
                        reason: ExclusionReason::Unreadable(err.to_string()),
                    });
                }
            }
        }

        log::info!(
            "corpus: {} rows across {} files ({} excluded)",
            view.total_rows,
            view.segments.len(),
            view.excluded.len()
        );

        view
    }

    /// Build a corpus over arbitrary sources, in order.
    ///
    /// # Errors
    /// Fails on the first source which fails to row-count.
    pub fn from_sources<I>(sources: I) -> TCResult<Self>
    where
        I: IntoIterator<Item = Arc<dyn RowSource>>,
    {
        let mut view = Self::empty();
        for source in sources {
            let num_rows = source.count_rows()?;
            view.push_segment(source, num_rows);
        }
        Ok(view)
    }

    fn push_segment(
        &mut self,
        source: Arc<dyn RowSource>,
        num_rows: u64,
    ) {
        if num_rows == 0 {
            return;
        }
        self.segments.push(Segment {
            source,
            start_row: self.total_rows,
            num_rows,
        });
        self.total_rows += num_rows;
    }

    /// The total number of rows.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// The number of non-empty sources.
    pub fn num_sources(&self) -> usize {
        self.segments.len()
    }

    /// The discovered files left out of the corpus.
    pub fn excluded(&self) -> &[ExcludedFile] {
        &self.excluded
    }

    /// Read `field` from up to `limit` rows, starting at global row `offset`.
    ///
    /// Returns fewer than `limit` values only at the end of the corpus.
    pub fn scan(
        &self,
        field: &str,
        offset: u64,
        limit: usize,
    ) -> TCResult<Vec<FieldValue>> {
        let end = offset.saturating_add(limit as u64).min(self.total_rows);
        if offset >= end {
            return Ok(Vec::new());
        }

        let mut values = Vec::with_capacity((end - offset) as usize);
        let mut cursor = offset;
        let mut idx = self.segments.partition_point(|s| s.end_row() <= offset);

        while cursor < end && idx < self.segments.len() {
            let segment = &self.segments[idx];
            let local_offset = cursor - segment.start_row;
            let want = (end - cursor).min(segment.num_rows - local_offset) as usize;

            let got = segment.source.read_field(field, local_offset, want)?;
            let short = got.len() < want;
            cursor += got.len() as u64;
            values.extend(got);

            if short {
                log::warn!(
                    "{}: returned fewer rows than counted; was it modified?",
                    segment.source.describe()
                );
                break;
            }
            idx += 1;
        }

        Ok(values)
    }
}
