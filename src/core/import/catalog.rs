//! Catalog CSV importer

use super::csv::{find_column, parse_records};
use crate::core::models::{CourseId, KnownCourse, KnownCourses};
use std::error::Error;
use std::fs;
use std::path::Path;

const ID_HEADERS: &[&str] = &["id", "科目番号"];
const NAME_HEADERS: &[&str] = &["name", "科目名"];
const CREDIT_HEADERS: &[&str] = &["credit", "単位数"];
const EXPECTATION_HEADERS: &[&str] = &["expectation", "標準履修年次"];
const TERM_HEADERS: &[&str] = &["term", "実施学期"];
const SCHEDULE_HEADERS: &[&str] = &["schedule", "曜時限"];

/// Parse catalog CSV text into known courses.
///
/// The first record is the header. `id` and `name` columns are required; the
/// others are optional. Blank or non-numeric credit becomes `None`. Rows with
/// an invalid course id are skipped, and a repeated id keeps the last row.
///
/// # Errors
/// Returns an error if the text is not valid CSV or a required column is missing.
pub fn parse_catalog_csv(text: &str) -> Result<KnownCourses, Box<dyn Error>> {
    let records = parse_records(text)?;
    let (headers, rows) = records.split_first().ok_or("Catalog has no header")?;

    let id_col = find_column(headers, ID_HEADERS).ok_or("Catalog is missing an id column")?;
    let name_col =
        find_column(headers, NAME_HEADERS).ok_or("Catalog is missing a name column")?;
    let credit_col = find_column(headers, CREDIT_HEADERS);
    let expectation_col = find_column(headers, EXPECTATION_HEADERS);
    let term_col = find_column(headers, TERM_HEADERS);
    let schedule_col = find_column(headers, SCHEDULE_HEADERS);

    let field = |row: &[String], col: Option<usize>| -> String {
        col.and_then(|i| row.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut courses = KnownCourses::new();
    for (index, row) in rows.iter().enumerate() {
        let raw_id = field(row, Some(id_col));
        let Some(id) = CourseId::parse(&raw_id) else {
            crate::warn!("Skipping catalog row {}: invalid course id '{raw_id}'", index + 2);
            continue;
        };

        let credit = field(row, credit_col)
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite() && *c >= 0.0);
        let course = KnownCourse {
            id: id.clone(),
            name: field(row, Some(name_col)),
            credit,
            expectation: field(row, expectation_col),
            term: field(row, term_col),
            schedule: field(row, schedule_col),
        };
        courses.insert(id, course);
    }

    crate::debug!("Parsed {} catalog courses", courses.len());
    Ok(courses)
}

/// Load a catalog CSV file
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<KnownCourses, Box<dyn Error>> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| format!("Failed to read catalog {}: {e}", path.as_ref().display()))?;
    parse_catalog_csv(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let csv = "id,name,credit,expectation,term,schedule\n\
                   GB22621,情報可視化,2,3・4,秋AB,月3\n\
                   GB10101,\"Intro, part 1\",,1,春A,\n";
        let courses = parse_catalog_csv(csv).unwrap();

        assert_eq!(courses.len(), 2);
        let vis = &courses[&"GB22621".parse::<CourseId>().unwrap()];
        assert_eq!(vis.name, "情報可視化");
        assert_eq!(vis.credit, Some(2.0));
        assert_eq!(vis.term, "秋AB");
        let intro = &courses[&"GB10101".parse::<CourseId>().unwrap()];
        assert_eq!(intro.name, "Intro, part 1");
        assert_eq!(intro.credit, None);
        assert_eq!(intro.schedule, "");
    }

    #[test]
    fn test_japanese_headers_and_optional_columns() {
        let csv = "科目番号,科目名,単位数\nGA15211,線形代数A,1.5\n";
        let courses = parse_catalog_csv(csv).unwrap();
        let course = &courses[&"GA15211".parse::<CourseId>().unwrap()];
        assert_eq!(course.credit, Some(1.5));
        assert!(course.expectation.is_empty());
    }

    #[test]
    fn test_invalid_ids_skipped_and_duplicates_keep_last() {
        let csv = "id,name,credit\nbad,Nope,1\nGB10101,First,1\nGB10101,Second,2\n";
        let courses = parse_catalog_csv(csv).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses.values().next().unwrap().name, "Second");
    }

    #[test]
    fn test_negative_credit_is_unknown() {
        let csv = "id,name,credit\nGB10101,Broken,-2\nGB10102,Fine,0\n";
        let courses = parse_catalog_csv(csv).unwrap();
        assert_eq!(courses[&"GB10101".parse::<CourseId>().unwrap()].credit, None);
        assert_eq!(courses[&"GB10102".parse::<CourseId>().unwrap()].credit, Some(0.0));
    }

    #[test]
    fn test_missing_required_column() {
        assert!(parse_catalog_csv("id,credit\nGB10101,2\n").is_err());
        assert!(parse_catalog_csv("").is_err());
    }
}
