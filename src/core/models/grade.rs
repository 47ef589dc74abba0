//! Grades and accounting buckets

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall grade of a real transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Currently enrolled
    Wip,
    /// A+
    #[serde(rename = "a+")]
    APlus,
    /// A
    A,
    /// B
    B,
    /// C
    C,
    /// D (failing)
    D,
    /// Pass without letter grade
    Pass,
    /// Fail without letter grade
    Fail,
}

/// Returns `true` for `a+, a, b, c, pass`
#[must_use]
pub const fn grade_is_pass(grade: Grade) -> bool {
    matches!(
        grade,
        Grade::APlus | Grade::A | Grade::B | Grade::C | Grade::Pass
    )
}

impl Grade {
    /// See [`grade_is_pass`]
    #[must_use]
    pub const fn is_pass(self) -> bool {
        grade_is_pass(self)
    }

    /// Accounting bucket a transcript record with this grade lands in
    #[must_use]
    pub const fn list_kind(self) -> ListKind {
        match self {
            Self::Wip => ListKind::MightTake,
            _ if grade_is_pass(self) => ListKind::Taken,
            _ => ListKind::WontTake,
        }
    }

    /// Lowercase token used in exports (e.g. "a+", "wip")
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wip => "wip",
            Self::APlus => "a+",
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grade column of a transcript row: a real grade or the credit-by-exception marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptGrade {
    /// Regular graded (or in-progress) course
    Graded(Grade),
    /// Credit granted without a grade ("free")
    Free,
}

/// Registrar tokens and what they mean
const GRADE_TOKENS: &[(&str, TranscriptGrade)] = &[
    ("履修中", TranscriptGrade::Graded(Grade::Wip)),
    ("A+", TranscriptGrade::Graded(Grade::APlus)),
    ("A", TranscriptGrade::Graded(Grade::A)),
    ("B", TranscriptGrade::Graded(Grade::B)),
    ("C", TranscriptGrade::Graded(Grade::C)),
    ("D", TranscriptGrade::Graded(Grade::D)),
    ("P", TranscriptGrade::Graded(Grade::Pass)),
    ("F", TranscriptGrade::Graded(Grade::Fail)),
    ("認", TranscriptGrade::Free),
    ("wip", TranscriptGrade::Graded(Grade::Wip)),
    ("pass", TranscriptGrade::Graded(Grade::Pass)),
    ("fail", TranscriptGrade::Graded(Grade::Fail)),
    ("free", TranscriptGrade::Free),
];

impl TranscriptGrade {
    /// Look up a transcript grade token; ASCII tokens match case-insensitively
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        GRADE_TOKENS
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(token))
            .map(|(_, grade)| *grade)
    }
}

/// Display/accounting bucket of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    /// Not planned, or failed
    WontTake,
    /// Planned or currently enrolled
    MightTake,
    /// Passed
    Taken,
}

impl ListKind {
    /// Kebab-case name (e.g. "might-take")
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WontTake => "wont-take",
            Self::MightTake => "might-take",
            Self::Taken => "taken",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
