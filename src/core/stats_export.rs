//! Export credit stats to CSV and a plain-text table

use super::stats::{BaseCreditStats, CreditStats};
use std::error::Error;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;

/// Trait for exporting a credit stats tree in different formats
pub trait StatsExporter {
    /// Export stats for one transcript
    ///
    /// # Errors
    /// Returns an error if export fails
    fn export(
        &self,
        label: &str,
        stats: &CreditStats,
        output_path: &Path,
    ) -> Result<(), Box<dyn Error>>;
}

/// The figures a student asks for first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditSummary {
    /// Earned credits that count toward the degree
    pub taken: f64,
    /// Planned or in-progress credits that would still count
    pub might_take: f64,
    /// Credits still needed from earned credits alone
    pub needed: f64,
    /// Credits still needed if every planned course is passed
    pub needed_after_planned: f64,
    /// Compulsory credits still needed
    pub compulsory_needed: f64,
    /// Elective credits still needed
    pub elective_needed: f64,
    /// Earned credits that count nowhere because their cell or column is full
    pub overflow_taken: f64,
}

impl CreditSummary {
    /// Summarize the compulsory and elective partitions
    #[must_use]
    pub fn from_stats(stats: &CreditStats) -> Self {
        let parts = [&stats.compulsory, &stats.elective];
        let sum = |f: fn(&BaseCreditStats) -> f64| parts.iter().map(|s| f(s)).sum::<f64>();

        let cell_overflow: f64 = stats.cells.values().map(|s| s.overflow_taken).sum();
        let column_overflow: f64 = stats.columns.values().map(|s| s.overflow_taken).sum();

        Self {
            taken: sum(|s| s.effective_taken),
            might_take: sum(|s| s.effective_might_take),
            needed: sum(BaseCreditStats::shortfall),
            needed_after_planned: sum(BaseCreditStats::planned_shortfall),
            compulsory_needed: stats.compulsory.shortfall(),
            elective_needed: stats.elective.shortfall(),
            overflow_taken: cell_overflow + column_overflow + sum(|s| s.overflow_taken),
        }
    }
}

/// CSV exporter for credit stats
pub struct CsvExporter;

impl StatsExporter for CsvExporter {
    fn export(
        &self,
        label: &str,
        stats: &CreditStats,
        output_path: &Path,
    ) -> Result<(), Box<dyn Error>> {
        export_credit_stats_csv(label, stats, output_path)
    }
}

/// Export credit stats to a CSV file
///
/// # Errors
/// Returns an error if file writing fails
pub fn export_credit_stats_csv(
    label: &str,
    stats: &CreditStats,
    output_path: &Path,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::File::create(output_path)?;
    write_credit_stats_csv(&mut file, label, stats)?;
    crate::debug!("Wrote credit stats for {label} to {}", output_path.display());
    Ok(())
}

const STATS_HEADER: &str = "Level,Id,Min,Max,Raw Might Take,Raw Taken,Raw Total,Effective Might Take,Effective Taken,Effective Total,Overflow Might Take,Overflow Taken,Overflow Total";

/// Write credit stats as CSV: a summary block, then one row per cell, column
/// and partition.
///
/// # Errors
/// Returns any error from the writer
pub fn write_credit_stats_csv<W: Write>(
    out: &mut W,
    label: &str,
    stats: &CreditStats,
) -> io::Result<()> {
    let summary = CreditSummary::from_stats(stats);

    writeln!(out, "Transcript,\"{}\"", label.replace('"', "\"\""))?;
    writeln!(out, "Taken,{}", summary.taken)?;
    writeln!(out, "Might Take,{}", summary.might_take)?;
    writeln!(out, "Needed,{}", summary.needed)?;
    writeln!(out, "Needed After Planned,{}", summary.needed_after_planned)?;

    writeln!(out, "Stats")?;
    writeln!(out, "{STATS_HEADER}")?;
    for (id, cell) in &stats.cells {
        write_stats_row(out, "cell", id.as_str(), cell)?;
    }
    for (id, column) in &stats.columns {
        write_stats_row(out, "column", &id.to_string(), column)?;
    }
    write_stats_row(out, "total", "compulsory", &stats.compulsory)?;
    write_stats_row(out, "total", "elective", &stats.elective)?;
    Ok(())
}

fn write_stats_row<W: Write>(
    out: &mut W,
    level: &str,
    id: &str,
    s: &BaseCreditStats,
) -> io::Result<()> {
    let max = s.max.value().map(|m| m.to_string()).unwrap_or_default();
    writeln!(
        out,
        "{level},{id},{},{max},{},{},{},{},{},{},{},{},{}",
        s.min,
        s.raw_might_take,
        s.raw_taken,
        s.raw_total,
        s.effective_might_take,
        s.effective_taken,
        s.effective_total,
        s.overflow_might_take,
        s.overflow_taken,
        s.overflow_total
    )
}

/// Plain-text table for terminal output
#[must_use]
pub fn format_summary_table(stats: &CreditStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>6} {:>6} {:>8} {:>6} {:>8} {:>6}",
        "", "min", "max", "taken", "might", "overflow", "needs"
    );

    let mut row = |name: &str, s: &BaseCreditStats| {
        let _ = writeln!(
            out,
            "{:<12} {:>6} {:>6} {:>8} {:>6} {:>8} {:>6}",
            name,
            s.min,
            s.max.to_string(),
            s.effective_taken,
            s.effective_might_take,
            s.overflow_total,
            s.shortfall()
        );
    };
    for (id, cell) in &stats.cells {
        row(&format!("  {id}"), cell);
    }
    for (id, column) in &stats.columns {
        row(&format!("column {id}"), column);
    }
    row("compulsory", &stats.compulsory);
    row("elective", &stats.elective);

    let summary = CreditSummary::from_stats(stats);
    let _ = writeln!(
        out,
        "\nTaken {} + might take {}; needs {} ({} after planned)",
        summary.taken, summary.might_take, summary.needed, summary.needed_after_planned
    );
    out
}
