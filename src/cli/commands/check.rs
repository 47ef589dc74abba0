//! Check command handler

use super::{load_program, ProgramData};
use akiko::config::Config;
use akiko::core::classify::ClassifyOptions;
use akiko::core::models::{CellId, Transcript};
use akiko::warn;
use std::collections::BTreeSet;

/// Validate the requirement table and cross-check it with catalog and rules.
///
/// Reports every problem before failing.
///
/// # Errors
/// Returns a message if the program data cannot be loaded or any check fails
pub fn run(config: &Config) -> Result<(), String> {
    let ProgramData {
        catalog,
        requirements,
        rules,
    } = load_program(config)?;

    let mut problems: Vec<String> = requirements.validate().err().unwrap_or_default();

    let missing_ids: Vec<String> = rules
        .listed_ids()
        .into_iter()
        .filter(|id| !catalog.contains_key(*id))
        .map(ToString::to_string)
        .collect();
    if !missing_ids.is_empty() {
        // Transcripts may still carry these; only the catalog lacks them
        warn!(
            "Rules name courses missing from the catalog: {}",
            missing_ids.join(", ")
        );
        println!(
            "! {} course ids named by rules are not in the catalog: {}",
            missing_ids.len(),
            missing_ids.join(", ")
        );
    }

    let options = ClassifyOptions {
        is_native: config.student.native,
    };
    let classification =
        rules
            .into_program_classifiers()
            .classify(&catalog, &Transcript::default(), options);
    let unrequired: BTreeSet<&CellId> = classification
        .known
        .values()
        .filter(|cell| requirements.cell(cell).is_none())
        .collect();
    for cell in &unrequired {
        problems.push(format!(
            "Catalog courses are classified into {cell}, which has no requirement entry"
        ));
    }

    println!(
        "Catalog: {} courses, {} classified into {} cells",
        catalog.len(),
        classification.known.len(),
        classification.known.values().collect::<BTreeSet<_>>().len()
    );

    if problems.is_empty() {
        println!("✓ Requirement table, catalog and rules are consistent");
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("✗ {problem}");
        }
        Err(format!("✗ {} problems found", problems.len()))
    }
}
