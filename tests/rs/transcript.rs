//! Integration tests for the catalog and transcript importers

use akiko::core::import::{load_catalog, parse_transcript_csv};
use akiko::core::models::{CourseId, FakeCourseIdAllocator, Grade};
use std::path::PathBuf;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples").join(name)
}

fn id(s: &str) -> CourseId {
    s.parse().expect("valid course id")
}

#[test]
fn test_load_sample_catalog() {
    let catalog = load_catalog(sample("catalog.csv")).expect("catalog loads");

    assert_eq!(catalog.len(), 13);
    let vis = &catalog[&id("GB22621")];
    assert_eq!(vis.name, "情報可視化");
    assert_eq!(vis.credit, Some(2.0));
    assert_eq!(vis.expectation, "3・4");
    assert_eq!(catalog[&id("GB20101")].name, "情報メディア入門A, B");
    assert_eq!(catalog[&id("GB00000")].credit, None);
}

#[test]
fn test_parse_sample_transcript() {
    let text = std::fs::read_to_string(sample("transcript.csv")).expect("read transcript");
    let mut allocator = FakeCourseIdAllocator::new();
    let transcript = parse_transcript_csv(&text, &mut allocator).expect("transcript parses");

    // 27 rows, GA15211 appears twice
    assert_eq!(transcript.real_courses.len(), 25);
    assert_eq!(transcript.fake_courses.len(), 1);
    assert_eq!(allocator.allocated(), 1);

    let retake = &transcript.real_courses[&id("GA15211")];
    assert_eq!(retake.grade, Grade::B);
    assert_eq!(retake.taken_year, 2022);

    let fake = transcript.fake_courses.values().next().expect("fake course");
    assert_eq!(fake.name, "英語(TOEIC認定)");
    assert!((fake.credit - 4.0).abs() < f64::EPSILON);
}

#[test]
fn test_rejected_transcript_kinds() {
    let mut allocator = FakeCourseIdAllocator::new();

    let err = parse_transcript_csv("科目番号,\"科目名\n", &mut allocator).expect_err("bad CSV");
    assert_eq!(err.kind(), "failed-to-parse-as-csv");

    let err = parse_transcript_csv("foo,bar\n1,2\n", &mut allocator).expect_err("bad header");
    assert_eq!(err.kind(), "unexpected-csv-content");
}
