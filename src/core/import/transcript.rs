//! Transcript CSV importer
//!
//! Reads the registrar's grade export. Columns are located by header name, so
//! extra columns (student id, term, instructor...) are ignored.

use super::csv::{find_column, parse_records};
use crate::core::models::{
    CourseId, FakeCourse, FakeCourseIdAllocator, RealCourse, Transcript, TranscriptEntry,
    TranscriptGrade,
};
use thiserror::Error;

const ID_HEADERS: &[&str] = &["科目番号", "course number", "id"];
const NAME_HEADERS: &[&str] = &["科目名", "course name", "name"];
const CREDIT_HEADERS: &[&str] = &["単位数", "credits", "credit"];
const GRADE_HEADERS: &[&str] = &["総合評価", "grade"];
const YEAR_HEADERS: &[&str] = &["開講年度", "year", "taken year"];

/// Why a transcript was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    /// The text is not CSV or has no header
    #[error("failed to parse transcript as CSV: {0}")]
    FailedToParseAsCsv(String),

    /// The CSV is well formed but a column or row does not make sense
    #[error("unexpected transcript content at line {line}: {reason}")]
    UnexpectedCsvContent {
        /// 1-based record number (the header is line 1)
        line: usize,
        /// What was wrong
        reason: String,
    },
}

impl TranscriptError {
    /// Stable kebab-case name of the failure kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FailedToParseAsCsv(_) => "failed-to-parse-as-csv",
            Self::UnexpectedCsvContent { .. } => "unexpected-csv-content",
        }
    }
}

fn unexpected(line: usize, reason: impl Into<String>) -> TranscriptError {
    TranscriptError::UnexpectedCsvContent {
        line,
        reason: reason.into(),
    }
}

struct Columns {
    id: usize,
    name: usize,
    credit: usize,
    grade: usize,
    year: usize,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self, TranscriptError> {
        let col = |names: &[&str], label: &str| {
            find_column(headers, names).ok_or_else(|| unexpected(1, format!("missing {label} column")))
        };
        Ok(Self {
            id: col(ID_HEADERS, "course number")?,
            name: col(NAME_HEADERS, "course name")?,
            credit: col(CREDIT_HEADERS, "credit")?,
            grade: col(GRADE_HEADERS, "grade")?,
            year: col(YEAR_HEADERS, "year")?,
        })
    }
}

/// Parse transcript CSV text.
///
/// Rows with a course id become [`RealCourse`]s. Rows with an empty course id
/// and a free grade ("認") become [`FakeCourse`]s with ids drawn from
/// `allocator`. Rows are folded in ascending year order, so a retaken course
/// keeps its latest record.
///
/// Nothing is partially accepted: any bad row fails the whole transcript.
///
/// # Errors
/// [`TranscriptError::FailedToParseAsCsv`] for CSV syntax problems,
/// [`TranscriptError::UnexpectedCsvContent`] for missing columns and bad rows.
pub fn parse_transcript_csv(
    text: &str,
    allocator: &mut FakeCourseIdAllocator,
) -> Result<Transcript, TranscriptError> {
    let records = parse_records(text).map_err(TranscriptError::FailedToParseAsCsv)?;
    let (headers, rows) = records
        .split_first()
        .ok_or_else(|| TranscriptError::FailedToParseAsCsv("no header".to_string()))?;
    let columns = Columns::locate(headers)?;

    let mut entries = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        entries.push(parse_row(row, &columns, index + 2, allocator)?);
    }

    let transcript = Transcript::from_entries(entries);
    crate::debug!(
        "Parsed transcript: {} real, {} fake courses",
        transcript.real_courses.len(),
        transcript.fake_courses.len()
    );
    Ok(transcript)
}

fn parse_row(
    row: &[String],
    columns: &Columns,
    line: usize,
    allocator: &mut FakeCourseIdAllocator,
) -> Result<TranscriptEntry, TranscriptError> {
    let field = |col: usize| row.get(col).map_or("", |s| s.trim());

    let raw_id = field(columns.id);
    let name = field(columns.name).to_string();

    let raw_credit = field(columns.credit);
    let credit = raw_credit
        .parse::<f64>()
        .ok()
        .filter(|c| c.is_finite() && *c >= 0.0)
        .ok_or_else(|| unexpected(line, format!("invalid credit '{raw_credit}'")))?;

    let raw_year = field(columns.year);
    let taken_year = raw_year
        .parse::<u16>()
        .map_err(|_| unexpected(line, format!("invalid year '{raw_year}'")))?;

    let raw_grade = field(columns.grade);
    let grade = TranscriptGrade::from_token(raw_grade)
        .ok_or_else(|| unexpected(line, format!("unknown grade '{raw_grade}'")))?;

    match (raw_id.is_empty(), grade) {
        (true, TranscriptGrade::Free) => Ok(TranscriptEntry::Fake(FakeCourse {
            id: allocator.next_unique(),
            name,
            credit,
            taken_year,
        })),
        (true, TranscriptGrade::Graded(_)) => Err(unexpected(
            line,
            "row without course number must be graded free",
        )),
        (false, TranscriptGrade::Free) => Err(unexpected(
            line,
            format!("course {raw_id} is graded free but has a course number"),
        )),
        (false, TranscriptGrade::Graded(grade)) => {
            let id = CourseId::parse(raw_id)
                .ok_or_else(|| unexpected(line, format!("invalid course number '{raw_id}'")))?;
            Ok(TranscriptEntry::Real(RealCourse {
                id,
                name,
                credit,
                taken_year,
                grade,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Grade;

    const HEADER: &str = "学籍番号,科目番号,科目名,単位数,総合評価,開講年度\n";

    fn parse(rows: &str) -> Result<Transcript, TranscriptError> {
        let mut allocator = FakeCourseIdAllocator::new();
        parse_transcript_csv(&format!("{HEADER}{rows}"), &mut allocator)
    }

    #[test]
    fn test_real_and_fake_rows() {
        let transcript = parse(
            "202111111,GB22621,情報可視化,2.0,A+,2023\n\
             202111111,,英語(認定),4.0,認,2021\n\
             202111111,GB26001,卒業研究,3.0,履修中,2024\n",
        )
        .unwrap();

        assert_eq!(transcript.real_courses.len(), 2);
        assert_eq!(transcript.fake_courses.len(), 1);
        let vis = &transcript.real_courses[&"GB22621".parse::<CourseId>().unwrap()];
        assert_eq!(vis.grade, Grade::APlus);
        assert_eq!(vis.taken_year, 2023);
        let fake = transcript.fake_courses.values().next().unwrap();
        assert_eq!(fake.name, "英語(認定)");
        assert!((fake.credit - 4.0).abs() < f64::EPSILON);
        let wip = &transcript.real_courses[&"GB26001".parse::<CourseId>().unwrap()];
        assert_eq!(wip.grade, Grade::Wip);
    }

    #[test]
    fn test_retake_keeps_later_year() {
        let transcript = parse(
            "1,GA15211,線形代数A,2,B,2022\n\
             1,GA15211,線形代数A,2,D,2021\n",
        )
        .unwrap();
        let record = &transcript.real_courses[&"GA15211".parse::<CourseId>().unwrap()];
        assert_eq!(record.grade, Grade::B);
    }

    #[test]
    fn test_fake_ids_unique_across_imports() {
        let mut allocator = FakeCourseIdAllocator::new();
        let text = format!("{HEADER}1,,English,2,認,2021\n");
        let first = parse_transcript_csv(&text, &mut allocator).unwrap();
        let second = parse_transcript_csv(&text, &mut allocator).unwrap();
        let a = first.fake_courses.keys().next().unwrap();
        let b = second.fake_courses.keys().next().unwrap();
        assert_ne!(a, b);
        assert_eq!(allocator.allocated(), 2);
    }

    #[test]
    fn test_english_headers() {
        let mut allocator = FakeCourseIdAllocator::new();
        let text = "Course Number,Course Name,Credits,Grade,Year\nGB10101,Intro,2,pass,2022\n";
        let transcript = parse_transcript_csv(text, &mut allocator).unwrap();
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_csv_syntax_failure() {
        let mut allocator = FakeCourseIdAllocator::new();
        let err = parse_transcript_csv("a,\"b\n", &mut allocator).unwrap_err();
        assert_eq!(err.kind(), "failed-to-parse-as-csv");
        let err = parse_transcript_csv("", &mut allocator).unwrap_err();
        assert_eq!(err.kind(), "failed-to-parse-as-csv");
    }

    #[test]
    fn test_missing_column() {
        let mut allocator = FakeCourseIdAllocator::new();
        let err =
            parse_transcript_csv("科目番号,科目名,単位数\nGB10101,x,2\n", &mut allocator).unwrap_err();
        assert_eq!(err.kind(), "unexpected-csv-content");
    }

    #[test]
    fn test_bad_rows_reject_whole_file() {
        let cases = [
            "1,,English,2,A,2021\n",
            "1,GB10101,Intro,2,認,2021\n",
            "1,gb10101,Intro,2,A,2021\n",
            "1,GB10101,Intro,two,A,2021\n",
            "1,GB10101,Intro,2,S,2021\n",
            "1,GB10101,Intro,2,A,twenty\n",
        ];
        for rows in cases {
            let good = "1,GB20101,Fine,2,A,2021\n";
            let err = parse(&format!("{good}{rows}")).unwrap_err();
            match err {
                TranscriptError::UnexpectedCsvContent { line, .. } => assert_eq!(line, 3),
                TranscriptError::FailedToParseAsCsv(_) => panic!("wrong kind for {rows}"),
            }
        }
    }

    #[test]
    fn test_allocator_untouched_on_real_rows() {
        let mut allocator = FakeCourseIdAllocator::new();
        let text = format!("{HEADER}1,GB10101,Intro,2,A,2022\n");
        parse_transcript_csv(&text, &mut allocator).unwrap();
        assert_eq!(allocator.allocated(), 0);
    }
}
