//! End-to-end credit tally over the sample program

use akiko::core::classify::{ClassifyOptions, RuleSet};
use akiko::core::import::load_catalog;
use akiko::core::models::{CellId, ColumnId, CourseId, CreditRequirements, ListKind};
use akiko::core::session::{Session, SessionError};
use akiko::core::stats_export::{CsvExporter, StatsExporter};
use akiko::{BaseCreditStats, MoveDirection};
use std::path::PathBuf;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples").join(name)
}

fn id(s: &str) -> CourseId {
    s.parse().expect("valid course id")
}

fn cell(s: &str) -> CellId {
    s.parse().expect("valid cell id")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn session(native: bool) -> Session {
    let catalog = load_catalog(sample("catalog.csv")).expect("catalog");
    let requirements = CreditRequirements::load(sample("requirements.toml")).expect("requirements");
    requirements.validate().expect("sample requirements are valid");
    let rules = RuleSet::load(sample("rules.toml")).expect("rules");
    Session::new(catalog, requirements, rules.into_program_classifiers())
        .with_options(ClassifyOptions { is_native: native })
}

fn transcript() -> String {
    std::fs::read_to_string(sample("transcript.csv")).expect("transcript")
}

fn assert_conserves(stats: &BaseCreditStats) {
    assert!(close(stats.raw_total, stats.effective_total + stats.overflow_total));
    assert!(close(stats.raw_taken, stats.effective_taken + stats.overflow_taken));
    assert!(close(
        stats.raw_might_take,
        stats.effective_might_take + stats.overflow_might_take
    ));
}

#[test]
fn test_sample_tally() {
    let mut session = session(true);
    let (akiko, stats) = session.tally(&transcript()).expect("tally");

    let b2 = stats.cell(&cell("b2")).expect("b2");
    assert!(close(b2.raw_taken, 25.0));
    assert!(close(b2.effective_taken, 18.0));
    assert!(close(b2.overflow_taken, 7.0));

    let c1 = stats.cell(&cell("c1")).expect("c1");
    assert!(close(c1.effective_taken, 8.0));
    assert!(close(c1.effective_might_take, 2.0));

    let e3 = stats.cell(&cell("e3")).expect("e3");
    assert!(close(e3.effective_taken, 4.0));

    // The failed logic course stays out of the tally
    assert_eq!(
        akiko.position(&id("GB10234")).expect("classified").list_kind,
        ListKind::WontTake
    );
    assert!(close(stats.cell(&cell("b1")).expect("b1").raw_taken, 3.0));

    // Clamped b2 (18) plus b1 (3), not raw b2
    let b = stats.column(ColumnId::B).expect("column b");
    assert!(close(b.raw_taken, 21.0));

    assert!(close(stats.compulsory.effective_taken, 16.0));
    assert!(close(stats.compulsory.effective_might_take, 8.0));
    assert!(close(stats.compulsory.shortfall(), 8.0));
    assert!(close(stats.elective.effective_taken, 23.0));

    for s in stats.cells.values().chain(stats.columns.values()) {
        assert_conserves(s);
        if let Some(max) = s.max.value() {
            assert!(s.effective_total <= max);
        }
    }
}

#[test]
fn test_retaken_course_counts_once() {
    let mut session = session(true);
    let (akiko, _) = session.tally(&transcript()).expect("tally");

    let position = akiko.position(&id("GA15211")).expect("position");
    assert_eq!(position.cell_id, cell("c1"));
    assert_eq!(position.list_kind, ListKind::Taken);
    assert!(close(akiko.credit_of(&id("GA15211")).expect("credit"), 2.0));
}

#[test]
fn test_planned_course_overflows_full_cell() {
    let mut session = session(true);
    session.set_planned(vec![id("GB20101"), id("GB22621"), id("ZZ99999")]);
    let (akiko, stats) = session.tally(&transcript()).expect("tally");

    // Only the catalog course without a transcript record stays planned
    assert_eq!(akiko.planned_course_ids(), vec![id("GB20101")]);

    let b2 = stats.cell(&cell("b2")).expect("b2");
    assert!(close(b2.raw_might_take, 2.0));
    assert!(close(b2.effective_might_take, 0.0));
    assert!(close(b2.overflow_might_take, 2.0));
}

#[test]
fn test_move_course_round_trip() {
    let mut session = session(true);
    let (mut akiko, before) = session.tally(&transcript()).expect("tally");

    akiko
        .move_course(MoveDirection::WontTakeToMightTake, &id("GB31801"))
        .expect_err("unclassified course has no position");
    akiko
        .move_course(MoveDirection::WontTakeToMightTake, &id("GB22621"))
        .expect_err("taken courses never move");

    akiko
        .move_course(MoveDirection::WontTakeToMightTake, &id("GB10234"))
        .expect("failed course can be planned again");
    let after = akiko.credit_stats();
    let b1 = after.cell(&cell("b1")).expect("b1");
    assert!(close(b1.raw_might_take, 2.0));

    akiko
        .move_course(MoveDirection::MightTakeToWontTake, &id("GB10234"))
        .expect("move back");
    assert_eq!(akiko.credit_stats(), before);
}

#[test]
fn test_transfer_student_classification() {
    let mut session = session(false);
    let (akiko, stats) = session.tally(&transcript()).expect("tally");

    assert_eq!(
        akiko.position(&id("GA15211")).expect("position").cell_id,
        cell("d1")
    );
    assert!(close(stats.cell(&cell("d1")).expect("d1").effective_taken, 2.0));
    assert!(close(stats.cell(&cell("c1")).expect("c1").effective_taken, 6.0));
}

#[test]
fn test_strict_session_rejects_unknown_cells() {
    let catalog = load_catalog(sample("catalog.csv")).expect("catalog");
    let requirements = CreditRequirements::load(sample("requirements.toml")).expect("requirements");
    let rules = RuleSet::from_toml("[[rule]]\ncell = \"h1\"\nid_pattern = \"^GB3\"\n").expect("rules");
    let mut session = Session::new(catalog, requirements, rules.into_program_classifiers());

    match session.tally(&transcript()) {
        Err(SessionError::UnrequiredCells(cells)) => assert_eq!(cells, vec![cell("h1")]),
        other => panic!("expected unrequired cells, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_export_sample_stats() {
    let mut session = session(true);
    let (_, stats) = session.tally(&transcript()).expect("tally");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("stats").join("transcript_credits.csv");
    CsvExporter
        .export("transcript", &stats, &path)
        .expect("export");

    let text = std::fs::read_to_string(&path).expect("read export");
    assert!(text.contains("cell,b2,18,18,0,25,25,0,18,18,0,7,7"));
    assert!(text.contains("total,compulsory,24,24,8,16,24,8,16,24,0,0,0"));
}
