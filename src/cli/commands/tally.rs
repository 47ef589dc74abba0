//! Tally command handler

use super::{load_program, ProgramData};
use akiko::config::Config;
use akiko::core::classify::ClassifyOptions;
use akiko::core::models::CourseId;
use akiko::core::session::Session;
use akiko::core::stats_export::{export_credit_stats_csv, format_summary_table, CreditSummary};
use akiko::{error, info, verbose};
use std::path::{Path, PathBuf};

/// Run the tally command for one or more transcripts.
///
/// # Arguments
/// * `transcripts` - Paths to transcript CSV files
/// * `plan` - Course ids planned by hand
/// * `output_files` - Optional output paths; must match inputs 1:1 when provided
/// * `no_csv` - Print the summary only
/// * `config` - Configuration with input paths and default output directory
///
/// # Errors
/// Returns a message if the program data cannot be loaded or the arguments
/// are inconsistent. Failures of single transcripts are reported and skipped.
pub fn run(
    transcripts: &[PathBuf],
    plan: &[String],
    output_files: &[PathBuf],
    no_csv: bool,
    config: &Config,
) -> Result<(), String> {
    if !output_files.is_empty() && output_files.len() != transcripts.len() {
        return Err(format!(
            "✗ When using -o/--output, provide one output path per transcript ({} transcripts, {} outputs).",
            transcripts.len(),
            output_files.len()
        ));
    }

    let planned = plan
        .iter()
        .map(|raw| {
            CourseId::parse(raw.trim()).ok_or_else(|| format!("✗ Invalid course id in --plan: '{raw}'"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ProgramData {
        catalog,
        requirements,
        rules,
    } = load_program(config)?;
    if let Err(problems) = requirements.validate() {
        for problem in &problems {
            eprintln!("✗ {problem}");
        }
        return Err("✗ Requirement table is invalid; run `akiko check` for details".to_string());
    }
    info!(
        "Loaded {} catalog courses and {} rules",
        catalog.len(),
        rules.len()
    );

    let mut session = Session::new(catalog, requirements, rules.into_program_classifiers())
        .with_options(ClassifyOptions {
            is_native: config.student.native,
        })
        .with_strict(config.student.strict);
    session.set_planned(planned);

    let mut failures = 0;
    for (idx, transcript) in transcripts.iter().enumerate() {
        let output_file = output_files.get(idx).map(PathBuf::as_path);
        if let Err(err) = tally_single(&mut session, transcript, output_file, no_csv, config) {
            error!("Tally failed for {}: {err}", transcript.display());
            eprintln!("{err}");
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("✗ {failures} of {} transcripts failed", transcripts.len()));
    }
    Ok(())
}

fn tally_single(
    session: &mut Session,
    transcript: &Path,
    output_file: Option<&Path>,
    no_csv: bool,
    config: &Config,
) -> Result<(), String> {
    let text = std::fs::read_to_string(transcript)
        .map_err(|e| format!("✗ Failed to read {}: {e}", transcript.display()))?;

    let (akiko, stats) = session.tally(&text).map_err(|e| {
        format!(
            "✗ {} ({}): please re-check the file",
            transcript.display(),
            e
        )
    })?;
    verbose!(
        "✓ Resolved {} course positions from {}",
        akiko.course_positions().len(),
        transcript.display()
    );

    let label = transcript
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("transcript");

    println!("\n=== {label} ===");
    print!("{}", format_summary_table(&stats));

    let summary = CreditSummary::from_stats(&stats);
    info!(
        "{label}: taken {}, might take {}, needs {}",
        summary.taken, summary.might_take, summary.needed
    );

    if no_csv {
        return Ok(());
    }

    let output_path = output_file.map_or_else(
        || PathBuf::from(&config.paths.out_dir).join(format!("{label}_credits.csv")),
        Path::to_path_buf,
    );
    export_credit_stats_csv(label, &stats, &output_path)
        .map_err(|e| format!("✗ Failed to export stats to {}: {e}", output_path.display()))?;
    println!("✓ Credit stats exported to: {}", output_path.display());
    Ok(())
}
