//! # Format Resolution and Dataset Discovery
//!
//! Maps file paths to a [`FormatTag`] (and an outer [`Compression`]), and
//! lists the files of a dataset directory as [`FileEntry`] values.
//!
//! Resolution is by extension only; nothing is opened here. Files which do not
//! resolve to a known format are tagged [`FormatTag::Unsupported`] and are
//! later skipped by the corpus, rather than treated as errors.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{TCResult, TokencountError};

/// The row format of a data file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum FormatTag {
    /// Apache Parquet.
    #[strum(serialize = "parquet")]
    Parquet,

    /// Comma separated values, with a header row.
    #[strum(serialize = "csv")]
    Csv,

    /// Tab separated values, with a header row.
    #[strum(serialize = "tsv")]
    Tsv,

    /// JSON; a top-level array of objects, or a stream of objects.
    #[strum(serialize = "json")]
    Json,

    /// Newline-delimited JSON objects.
    #[strum(serialize = "jsonl")]
    Jsonl,

    /// Anything we can't read; skipped.
    #[strum(serialize = "unsupported")]
    Unsupported,
}

impl FormatTag {
    /// Is this a readable format?
    pub fn is_supported(&self) -> bool {
        !matches!(self, FormatTag::Unsupported)
    }

    /// Is this one of the JSON family formats?
    pub fn is_json_family(&self) -> bool {
        matches!(self, FormatTag::Json | FormatTag::Jsonl)
    }

    /// Is this one of the delimited text formats?
    pub fn is_csv_family(&self) -> bool {
        matches!(self, FormatTag::Csv | FormatTag::Tsv)
    }

    fn from_extension(ext: &str) -> Self {
        match ext {
            "parquet" => FormatTag::Parquet,
            "csv" => FormatTag::Csv,
            "tsv" => FormatTag::Tsv,
            "json" => FormatTag::Json,
            "jsonl" | "ndjson" => FormatTag::Jsonl,
            _ => FormatTag::Unsupported,
        }
    }
}

/// An outer compression container around a data file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
pub enum Compression {
    /// Plain file.
    #[default]
    #[strum(serialize = "none")]
    None,

    /// `.gz`
    #[strum(serialize = "gzip")]
    Gzip,

    /// `.bz2`
    #[strum(serialize = "bzip2")]
    Bzip2,

    /// `.zip`; the first file entry is read.
    #[strum(serialize = "zip")]
    Zip,

    /// `.xz`
    #[strum(serialize = "xz")]
    Xz,
}

impl Compression {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "gz" => Some(Compression::Gzip),
            "bz2" => Some(Compression::Bzip2),
            "zip" => Some(Compression::Zip),
            "xz" => Some(Compression::Xz),
            _ => None,
        }
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Resolve the format and compression of a path from its extension(s).
///
/// For compressed files, the compression suffix is stripped and the inner
/// extension decides the format. Only the CSV and JSON families may be
/// compressed; anything else (including `.parquet.gz`) is unsupported.
pub fn resolve_with_compression(path: &Path) -> (FormatTag, Compression) {
    let Some(ext) = lowercase_extension(path) else {
        return (FormatTag::Unsupported, Compression::None);
    };

    match Compression::from_extension(&ext) {
        None => (FormatTag::from_extension(&ext), Compression::None),
        Some(compression) => {
            let inner = path
                .file_stem()
                .map(Path::new)
                .and_then(lowercase_extension)
                .map(|ext| FormatTag::from_extension(&ext))
                .unwrap_or(FormatTag::Unsupported);

            if inner.is_json_family() || inner.is_csv_family() {
                (inner, compression)
            } else {
                (FormatTag::Unsupported, Compression::None)
            }
        }
    }
}

/// Resolve the [`FormatTag`] of a path.
pub fn resolve(path: &Path) -> FormatTag {
    resolve_with_compression(path).0
}

/// A discovered dataset file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// The file path.
    pub path: PathBuf,

    /// The detected row format.
    pub format: FormatTag,

    /// The detected outer compression.
    pub compression: Compression,
}

impl FileEntry {
    /// Build an entry, resolving the format from the path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let (format, compression) = resolve_with_compression(&path);
        Self {
            path,
            format,
            compression,
        }
    }

    /// Is this entry readable?
    pub fn is_supported(&self) -> bool {
        self.format.is_supported()
    }
}

/// Options for [`discover`].
#[derive(Clone, Debug, Default)]
pub struct DiscoverOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
}

impl DiscoverOptions {
    /// Set whether to descend into subdirectories.
    pub fn with_recursive(
        mut self,
        recursive: bool,
    ) -> Self {
        self.recursive = recursive;
        self
    }
}

/// List the files of a dataset.
///
/// * A directory lists its regular files (top level only, unless
///   `options.recursive`), sorted by path so the corpus order is stable.
/// * A plain file is a one-file dataset.
///
/// Unsupported files are returned, tagged [`FormatTag::Unsupported`].
/// Entries the walk cannot stat (dangling links, unreadable subdirectories)
/// are logged and skipped.
///
/// # Errors
/// * [`TokencountError::DatasetNotFound`] if `path` does not exist.
pub fn discover(
    path: &Path,
    options: &DiscoverOptions,
) -> TCResult<Vec<FileEntry>> {
    if !path.exists() {
        return Err(TokencountError::DatasetNotFound(path.to_path_buf()));
    }

    if path.is_file() {
        return Ok(vec![FileEntry::new(path)]);
    }

    let max_depth = if options.recursive { usize::MAX } else { 1 };

    let mut entries = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable dataset entry: {err}");
                continue;
            }
        };
        if entry.file_type().is_file() {
            entries.push(FileEntry::new(entry.path()));
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));

    log::debug!(
        "discovered {} files ({} supported) under {}",
        entries.len(),
        entries.iter().filter(|e| e.is_supported()).count(),
        path.display()
    );

    Ok(entries)
}
