#![allow(missing_docs)]

use std::{fs::File, io::Write, path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::ArrowWriter;
use tempdir::TempDir;
use tokencount::{
    CorpusView,
    CountOptions,
    DiscoverOptions,
    TCResult,
    TokencountError,
    count_dataset,
    corpus::ExclusionReason,
    counting::WhitespaceTokenCounter,
    formats::discover,
    vocab::{Vocabulary, resolve_vocabulary},
};

fn write_gzip(
    path: &Path,
    text: &str,
) -> TCResult<()> {
    let mut enc = flate2::write::GzEncoder::new(File::create(path)?, flate2::Compression::fast());
    enc.write_all(text.as_bytes())?;
    enc.finish()?;
    Ok(())
}

fn write_parquet(
    path: &Path,
    text: Vec<Option<&str>>,
) -> TCResult<()> {
    let schema = Arc::new(Schema::new(vec![Field::new("text", DataType::Utf8, true)]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(StringArray::from(text)) as ArrayRef],
    )?;
    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// A mixed-format dataset.
///
/// | file          | rows | items | whitespace tokens |
/// |---------------|------|-------|-------------------|
/// | a.csv         | 4    | 3     | 6                 |
/// | b.jsonl.gz    | 3    | 2     | 3                 |
/// | c.parquet     | 5    | 3     | 6                 |
/// | d.json        | 2    | 1     | 2                 |
fn write_mixed_dataset(dir: &Path) -> TCResult<()> {
    std::fs::write(
        dir.join("a.csv"),
        "id,text\n1,one two\n2,\n3,three\n4,four five six\n",
    )?;
    write_gzip(
        &dir.join("b.jsonl.gz"),
        "{\"text\": \"alpha beta\"}\n{\"text\": null}\n{\"text\": \"gamma\"}\n",
    )?;
    write_parquet(
        &dir.join("c.parquet"),
        vec![Some("p q r"), None, Some("s"), Some(""), Some("t u")],
    )?;
    std::fs::write(
        dir.join("d.json"),
        "[{\"text\": \"x y\"}, {\"body\": \"nope\"}]",
    )?;

    // Sidecars.
    std::fs::write(dir.join("README.md"), "# a dataset\n")?;
    std::fs::write(dir.join("SHA256SUMS"), "deadbeef  a.csv\n")?;
    Ok(())
}

#[test]
fn test_mixed_dataset() -> TCResult<()> {
    let tmpdir = TempDir::new("tokencount-pipeline")?;
    write_mixed_dataset(tmpdir.path())?;

    let files = discover(tmpdir.path(), &DiscoverOptions::default())?;
    assert_eq!(files.len(), 6);

    let view = CorpusView::build(&files);
    assert_eq!(view.total_rows(), 14);
    assert_eq!(view.num_sources(), 4);
    assert_eq!(view.excluded().len(), 2);

    for workers in 1..=8 {
        for batch_size in [1, 2, 3, 1000] {
            let options = CountOptions::new("text")
                .with_workers(workers)
                .with_batch_size(batch_size);
            let report = tokencount::Coordinator::new(&view, &WhitespaceTokenCounter, options).run()?;

            assert_eq!(report.total_rows, 14, "workers={workers} batch={batch_size}");
            assert_eq!(report.total_tokens, 17, "workers={workers} batch={batch_size}");
            assert_eq!(report.total_items, 9, "workers={workers} batch={batch_size}");
            assert_eq!(report.per_partition.len(), workers);
            assert!(report.failed_partitions().next().is_none());
        }
    }

    Ok(())
}

#[test]
fn test_unreadable_file_is_excluded() -> TCResult<()> {
    let tmpdir = TempDir::new("tokencount-pipeline")?;
    write_mixed_dataset(tmpdir.path())?;
    std::fs::write(tmpdir.path().join("broken.jsonl"), "{\"text\": \"ok\"}\n{not json\n")?;

    let view = CorpusView::build(&discover(tmpdir.path(), &DiscoverOptions::default())?);
    assert_eq!(view.total_rows(), 14);
    assert!(view.excluded().iter().any(|e| {
        e.path.ends_with("broken.jsonl") && matches!(e.reason, ExclusionReason::Unreadable(_))
    }));

    let report = tokencount::Coordinator::new(
        &view,
        &WhitespaceTokenCounter,
        CountOptions::new("text").with_workers(3),
    )
    .run()?;
    assert_eq!(report.total_tokens, 17);
    Ok(())
}

#[test]
fn test_no_supported_files() -> TCResult<()> {
    let tmpdir = TempDir::new("tokencount-pipeline")?;
    std::fs::write(tmpdir.path().join("README.md"), "nothing here\n")?;

    let report = count_dataset(
        tmpdir.path(),
        &DiscoverOptions::default(),
        &WhitespaceTokenCounter,
        CountOptions::new("text").with_workers(4),
    )?;

    assert_eq!(report.total_tokens, 0);
    assert_eq!(report.total_items, 0);
    assert_eq!(report.average_tokens_per_item, None);
    assert_eq!(report.format_average(), "0.00");
    Ok(())
}

#[test]
fn test_missing_dataset() {
    let err = count_dataset(
        Path::new("/no/such/dataset"),
        &DiscoverOptions::default(),
        &WhitespaceTokenCounter,
        CountOptions::new("text"),
    )
    .unwrap_err();
    assert!(matches!(err, TokencountError::DatasetNotFound(_)));
}

#[test]
fn test_o200k_single_token_rows() -> TCResult<()> {
    let tmpdir = TempDir::new("tokencount-pipeline")?;
    let body: String = (0..2500).map(|_| "{\"text\": \"hello\"}\n").collect();
    std::fs::write(tmpdir.path().join("rows.jsonl"), body)?;

    let resolution = resolve_vocabulary("gpt-4o");
    assert_eq!(resolution.vocabulary, Vocabulary::O200kBase);
    assert!(!resolution.fallback);
    let counter = resolution.vocabulary.load_counter()?;

    let report = count_dataset(
        tmpdir.path(),
        &DiscoverOptions::default(),
        &counter,
        CountOptions::new("text")
            .with_workers(4)
            .with_batch_size(1000),
    )?;

    assert_eq!(
        report
            .per_partition
            .iter()
            .map(|r| r.rows_scanned)
            .collect::<Vec<_>>(),
        vec![625, 625, 625, 625]
    );
    assert_eq!(report.total_tokens, 2500);
    assert_eq!(report.total_items, 2500);
    assert_eq!(report.format_average(), "1.00");
    Ok(())
}
