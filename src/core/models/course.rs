//! Course records: catalog entries and transcript entries

use super::grade::Grade;
use super::ids::{CourseId, FakeCourseId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalog of known courses keyed by course id
pub type KnownCourses = BTreeMap<CourseId, KnownCourse>;

/// A course from the static catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownCourse {
    /// Course id (e.g. "GB22621")
    pub id: CourseId,

    /// Course name
    pub name: String,

    /// Credits; `None` for zero-credit or variable-credit courses
    pub credit: Option<f64>,

    /// Expected (standard) year or prerequisites text
    pub expectation: String,

    /// Term the course is offered in (e.g. "春AB")
    pub term: String,

    /// Schedule slot text (e.g. "月3,4")
    pub schedule: String,
}

impl KnownCourse {
    /// Create a catalog entry with empty descriptive fields
    #[must_use]
    pub const fn new(id: CourseId, name: String, credit: Option<f64>) -> Self {
        Self {
            id,
            name,
            credit,
            expectation: String::new(),
            term: String::new(),
            schedule: String::new(),
        }
    }
}

/// A transcript entry that references a real course id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealCourse {
    /// Course id
    pub id: CourseId,
    /// Course name as printed on the transcript
    pub name: String,
    /// Credits earned or being earned
    pub credit: f64,
    /// Academic year the course was taken
    pub taken_year: u16,
    /// Overall grade
    pub grade: Grade,
}

/// A transcript entry without a catalog course (credit by exception or transfer).
///
/// Its grade is always "free".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeCourse {
    /// Session-unique id
    pub id: FakeCourseId,
    /// Course name as printed on the transcript
    pub name: String,
    /// Credits granted
    pub credit: f64,
    /// Academic year the credit was granted
    pub taken_year: u16,
}

/// One parsed transcript row
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    /// Row with a course id
    Real(RealCourse),
    /// Row without a course id, graded free
    Fake(FakeCourse),
}

impl TranscriptEntry {
    /// Academic year of the row
    #[must_use]
    pub const fn taken_year(&self) -> u16 {
        match self {
            Self::Real(course) => course.taken_year,
            Self::Fake(course) => course.taken_year,
        }
    }
}

/// A student's transcript keyed by course id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    /// Entries with a catalog course id; one record per id
    pub real_courses: BTreeMap<CourseId, RealCourse>,
    /// Entries without a catalog course id
    pub fake_courses: BTreeMap<FakeCourseId, FakeCourse>,
}

impl Transcript {
    /// Build a transcript from rows in any order.
    ///
    /// Rows are stably sorted by `taken_year` and folded in that order, so when
    /// a course id repeats the latest year's record is the one kept.
    #[must_use]
    pub fn from_entries(mut entries: Vec<TranscriptEntry>) -> Self {
        entries.sort_by_key(TranscriptEntry::taken_year);

        entries
            .into_iter()
            .fold(Self::default(), |mut transcript, entry| {
                match entry {
                    TranscriptEntry::Real(course) => {
                        transcript.real_courses.insert(course.id.clone(), course);
                    }
                    TranscriptEntry::Fake(course) => {
                        transcript.fake_courses.insert(course.id, course);
                    }
                }
                transcript
            })
    }

    /// Total number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.real_courses.len() + self.fake_courses.len()
    }

    /// Returns `true` if the transcript holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.real_courses.is_empty() && self.fake_courses.is_empty()
    }
}
