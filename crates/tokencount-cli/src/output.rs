//! Human-readable run summaries.

use tokencount::Report;

/// The closing summary block.
pub fn format_summary(report: &Report) -> String {
    format!(
        "\nTotal tokens: {}\nTotal items processed: {}\nAverage tokens per item: {}",
        report.total_tokens,
        report.total_items,
        report.format_average()
    )
}

/// The per-partition table, ranked by tokens.
pub fn format_partitions(report: &Report) -> String {
    let header = format!(
        "{:<20} {:>14} {:>12} {:>12}  status",
        "partition", "tokens", "items", "rows"
    );

    let rows = report.per_partition.iter().map(|r| {
        let status = match (&r.error, r.cancelled) {
            (Some(err), _) => format!("error: {err}"),
            (None, true) => "cancelled".to_string(),
            (None, false) => "ok".to_string(),
        };
        format!(
            "{:<20} {:>14} {:>12} {:>12}  {}",
            r.label, r.token_count, r.items_processed, r.rows_scanned, status
        )
    });

    std::iter::once(header)
        .chain(rows)
        .map(|line| line + "\n")
        .collect()
}
