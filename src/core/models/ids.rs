//! Identifier types: course ids, fake course ids, cell ids and column ids

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest integer a fake course id may take (`2^53 - 1`)
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Returns `true` if `s` is exactly 7 characters from `[A-Z0-9]`
#[must_use]
pub fn is_course_id(s: &str) -> bool {
    s.len() == 7
        && s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Returns `true` if `s` matches `^[a-h]\d+$`
#[must_use]
pub fn is_cell_id(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let digits = chars.as_str();
    ColumnId::from_char(first).is_some()
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Returns `true` if `n` is a safe non-negative integer
#[must_use]
pub const fn is_fake_course_id(n: i64) -> bool {
    n >= 0 && n as u64 <= MAX_SAFE_INTEGER
}

/// Returns the column a cell belongs to (its leading letter)
#[must_use]
pub const fn cell_id_to_column_id(id: &CellId) -> ColumnId {
    id.column
}

/// Compulsory/elective partition of the eight columns.
///
/// Columns a/c/e/g are compulsory, b/d/f/h are elective. Everything that needs
/// the partition goes through here.
#[must_use]
pub const fn column_id_is_compulsory(id: ColumnId) -> bool {
    matches!(id, ColumnId::A | ColumnId::C | ColumnId::E | ColumnId::G)
}

/// Catalog course identifier (e.g. "GB22621")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId(String);

impl CourseId {
    /// Validate and wrap a course id
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        is_course_id(s).then(|| Self(s.to_string()))
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CourseId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid course id: '{s}'"))
    }
}

impl TryFrom<String> for CourseId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_course_id(&value) {
            Ok(Self(value))
        } else {
            Err(format!("Invalid course id: '{value}'"))
        }
    }
}

impl From<CourseId> for String {
    fn from(id: CourseId) -> Self {
        id.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a transcript entry that has no catalog course
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct FakeCourseId(u64);

impl FakeCourseId {
    /// Wrap a raw id, refusing values above [`MAX_SAFE_INTEGER`]
    #[must_use]
    pub const fn new(n: u64) -> Option<Self> {
        if n <= MAX_SAFE_INTEGER {
            Some(Self(n))
        } else {
            None
        }
    }

    /// The raw integer value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for FakeCourseId {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("Fake course id out of range: {value}"))
    }
}

impl From<FakeCourseId> for u64 {
    fn from(id: FakeCourseId) -> Self {
        id.0
    }
}

impl fmt::Display for FakeCourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of unique [`FakeCourseId`]s.
///
/// Owned by whoever imports transcripts (see `Session`), so independent
/// sessions and tests never share a counter.
#[derive(Debug, Default)]
pub struct FakeCourseIdAllocator {
    next: u64,
}

impl FakeCourseIdAllocator {
    /// Create an allocator starting at id 0
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Return the next unused id.
    ///
    /// # Panics
    /// Panics once the safe-integer range is exhausted.
    pub fn next_unique(&mut self) -> FakeCourseId {
        let id = FakeCourseId::new(self.next).expect("fake course id space exhausted");
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    #[must_use]
    pub const fn allocated(&self) -> u64 {
        self.next
    }
}

/// One of the eight requirement columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnId {
    /// Column a (compulsory)
    A,
    /// Column b (elective)
    B,
    /// Column c (compulsory)
    C,
    /// Column d (elective)
    D,
    /// Column e (compulsory)
    E,
    /// Column f (elective)
    F,
    /// Column g (compulsory)
    G,
    /// Column h (elective)
    H,
}

impl ColumnId {
    /// All columns in display order
    pub const ALL: [Self; 8] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
    ];

    /// Parse a column letter
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Self::A),
            'b' => Some(Self::B),
            'c' => Some(Self::C),
            'd' => Some(Self::D),
            'e' => Some(Self::E),
            'f' => Some(Self::F),
            'g' => Some(Self::G),
            'h' => Some(Self::H),
            _ => None,
        }
    }

    /// The column letter
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
            Self::C => 'c',
            Self::D => 'd',
            Self::E => 'e',
            Self::F => 'f',
            Self::G => 'g',
            Self::H => 'h',
        }
    }

    /// See [`column_id_is_compulsory`]
    #[must_use]
    pub const fn is_compulsory(self) -> bool {
        column_id_is_compulsory(self)
    }
}

impl FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
        .ok_or_else(|| format!("Invalid column id: '{s}'"))
    }
}

impl TryFrom<String> for ColumnId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnId> for String {
    fn from(id: ColumnId) -> Self {
        id.as_char().to_string()
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Requirement cell identifier (e.g. "b2"); the leading letter is its column
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId {
    raw: String,
    column: ColumnId,
}

impl CellId {
    /// Validate and wrap a cell id
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if !is_cell_id(s) {
            return None;
        }
        let column = s.chars().next().and_then(ColumnId::from_char)?;
        Some(Self {
            raw: s.to_string(),
            column,
        })
    }

    /// The column this cell belongs to
    #[must_use]
    pub const fn column(&self) -> ColumnId {
        self.column
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for CellId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell id: '{s}'"))
    }
}

impl TryFrom<String> for CellId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> Self {
        id.raw
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
