//! Classification of courses into requirement cells
//!
//! The engine never decides which cell a course belongs to; it consumes the
//! output of a [`Classifier`]. Programs supply one classifier per course kind
//! (catalog entries, real transcript entries, fake transcript entries), either
//! as code (any closure works) or as a TOML [`RuleSet`].

use crate::core::models::{CellId, CourseId, FakeCourseId, KnownCourses, Transcript};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// The parts of a course a classifier may look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseRef<'a> {
    /// Course id; `None` for fake courses
    pub id: Option<&'a CourseId>,
    /// Course name
    pub name: &'a str,
}

/// Student context passed to every classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// `true` for students native to the program, `false` for transfer students
    pub is_native: bool,
}

/// Maps a course to the cell it counts toward
pub trait Classifier {
    /// Return the cell for `course`, or `None` if it counts toward nothing
    fn classify(&self, course: CourseRef<'_>, options: ClassifyOptions) -> Option<CellId>;
}

impl<F> Classifier for F
where
    F: Fn(CourseRef<'_>, ClassifyOptions) -> Option<CellId>,
{
    fn classify(&self, course: CourseRef<'_>, options: ClassifyOptions) -> Option<CellId> {
        self(course, options)
    }
}

/// Box a closure as a classifier
pub fn classifier_fn<F>(f: F) -> Box<dyn Classifier>
where
    F: Fn(CourseRef<'_>, ClassifyOptions) -> Option<CellId> + 'static,
{
    Box::new(f)
}

/// Cell assignments for every classified course
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Catalog courses
    pub known: BTreeMap<CourseId, CellId>,
    /// Real transcript courses
    pub real: BTreeMap<CourseId, CellId>,
    /// Fake transcript courses
    pub fake: BTreeMap<FakeCourseId, CellId>,
}

/// The three classifiers of one program
pub struct ProgramClassifiers {
    /// Classifies catalog courses
    pub catalog: Box<dyn Classifier>,
    /// Classifies real transcript courses
    pub real: Box<dyn Classifier>,
    /// Classifies fake transcript courses
    pub fake: Box<dyn Classifier>,
}

impl ProgramClassifiers {
    /// Bundle three classifiers
    #[must_use]
    pub fn new(
        catalog: Box<dyn Classifier>,
        real: Box<dyn Classifier>,
        fake: Box<dyn Classifier>,
    ) -> Self {
        Self {
            catalog,
            real,
            fake,
        }
    }

    /// Classify every catalog course and every transcript record
    #[must_use]
    pub fn classify(
        &self,
        known_courses: &KnownCourses,
        transcript: &Transcript,
        options: ClassifyOptions,
    ) -> Classification {
        let known = known_courses
            .values()
            .filter_map(|course| {
                let course_ref = CourseRef {
                    id: Some(&course.id),
                    name: &course.name,
                };
                self.catalog
                    .classify(course_ref, options)
                    .map(|cell| (course.id.clone(), cell))
            })
            .collect();

        let real = transcript
            .real_courses
            .values()
            .filter_map(|course| {
                let course_ref = CourseRef {
                    id: Some(&course.id),
                    name: &course.name,
                };
                self.real
                    .classify(course_ref, options)
                    .map(|cell| (course.id.clone(), cell))
            })
            .collect();

        let fake = transcript
            .fake_courses
            .values()
            .filter_map(|course| {
                let course_ref = CourseRef {
                    id: None,
                    name: &course.name,
                };
                self.fake
                    .classify(course_ref, options)
                    .map(|cell| (course.id, cell))
            })
            .collect();

        Classification { known, real, fake }
    }
}

/// Which kind of course a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseKind {
    /// Catalog entries
    Catalog,
    /// Transcript entries with a course id
    Real,
    /// Transcript entries without a course id
    Fake,
}

/// Errors raised while loading a rule set
#[derive(Debug, Error)]
pub enum RuleSetError {
    /// The rules file could not be read
    #[error("Failed to read rules: {0}")]
    Io(#[from] std::io::Error),

    /// The rules file is not valid TOML or has the wrong shape
    #[error("Invalid rules file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A pattern failed to compile
    #[error("Rule {index} ({cell}): invalid pattern: {source}")]
    InvalidPattern {
        /// 1-based rule position
        index: usize,
        /// Target cell of the rule
        cell: CellId,
        /// Regex compile error
        source: regex::Error,
    },

    /// A rule has nothing to match on
    #[error("Rule {index} ({cell}): needs at least one of ids, id_pattern, name_pattern")]
    NoCondition {
        /// 1-based rule position
        index: usize,
        /// Target cell of the rule
        cell: CellId,
    },
}

fn all_kinds() -> Vec<CourseKind> {
    vec![CourseKind::Catalog, CourseKind::Real, CourseKind::Fake]
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    cell: CellId,
    #[serde(default = "all_kinds")]
    applies_to: Vec<CourseKind>,
    #[serde(default)]
    ids: Vec<CourseId>,
    id_pattern: Option<String>,
    name_pattern: Option<String>,
    native: Option<bool>,
}

#[derive(Deserialize)]
struct RawRuleSet {
    #[serde(default, rename = "rule")]
    rules: Vec<RawRule>,
}

/// One classification rule. All conditions it specifies must hold.
#[derive(Debug)]
pub struct Rule {
    /// Cell assigned on match
    pub cell: CellId,
    applies_to: Vec<CourseKind>,
    ids: Vec<CourseId>,
    id_pattern: Option<Regex>,
    name_pattern: Option<Regex>,
    native: Option<bool>,
}

impl Rule {
    fn matches(&self, kind: CourseKind, course: CourseRef<'_>, options: ClassifyOptions) -> bool {
        if !self.applies_to.contains(&kind) {
            return false;
        }
        if self.native.is_some_and(|native| native != options.is_native) {
            return false;
        }
        if !self.ids.is_empty() && !course.id.is_some_and(|id| self.ids.contains(id)) {
            return false;
        }
        if let Some(pattern) = &self.id_pattern {
            if !course.id.is_some_and(|id| pattern.is_match(id.as_str())) {
                return false;
            }
        }
        self.name_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(course.name))
    }
}

/// Ordered list of rules; the first matching rule decides the cell
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
}

impl RuleSet {
    /// Parse rules from TOML (`[[rule]]` tables)
    ///
    /// # Errors
    /// Returns an error on malformed TOML, an invalid pattern, or a rule without conditions
    pub fn from_toml(toml_str: &str) -> Result<Self, RuleSetError> {
        let raw: RawRuleSet = toml::from_str(toml_str)?;

        let rules = raw
            .rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| compile_rule(i + 1, rule))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules: rules.into(),
        })
    }

    /// Load rules from a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or [`from_toml`](Self::from_toml) fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RuleSetError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every course id named explicitly by some rule's `ids`
    #[must_use]
    pub fn listed_ids(&self) -> BTreeSet<&CourseId> {
        self.rules.iter().flat_map(|rule| rule.ids.iter()).collect()
    }

    /// Classify `course` as a course of the given kind
    #[must_use]
    pub fn classify(
        &self,
        kind: CourseKind,
        course: CourseRef<'_>,
        options: ClassifyOptions,
    ) -> Option<CellId> {
        self.rules
            .iter()
            .find(|rule| rule.matches(kind, course, options))
            .map(|rule| rule.cell.clone())
    }

    /// A classifier restricted to one course kind
    #[must_use]
    pub fn classifier(&self, kind: CourseKind) -> RuleClassifier {
        RuleClassifier {
            rules: self.clone(),
            kind,
        }
    }

    /// Classifiers for all three course kinds sharing these rules
    #[must_use]
    pub fn into_program_classifiers(self) -> ProgramClassifiers {
        ProgramClassifiers::new(
            Box::new(self.classifier(CourseKind::Catalog)),
            Box::new(self.classifier(CourseKind::Real)),
            Box::new(self.classifier(CourseKind::Fake)),
        )
    }
}

fn compile_rule(index: usize, raw: RawRule) -> Result<Rule, RuleSetError> {
    if raw.ids.is_empty() && raw.id_pattern.is_none() && raw.name_pattern.is_none() {
        return Err(RuleSetError::NoCondition {
            index,
            cell: raw.cell,
        });
    }

    let compile = |pattern: Option<String>| -> Result<Option<Regex>, RuleSetError> {
        pattern
            .map(|p| {
                Regex::new(&p).map_err(|source| RuleSetError::InvalidPattern {
                    index,
                    cell: raw.cell.clone(),
                    source,
                })
            })
            .transpose()
    };
    let id_pattern = compile(raw.id_pattern)?;
    let name_pattern = compile(raw.name_pattern)?;

    Ok(Rule {
        cell: raw.cell,
        applies_to: raw.applies_to,
        ids: raw.ids,
        id_pattern,
        name_pattern,
        native: raw.native,
    })
}

/// [`RuleSet`] bound to one course kind
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: RuleSet,
    kind: CourseKind,
}

impl Classifier for RuleClassifier {
    fn classify(&self, course: CourseRef<'_>, options: ClassifyOptions) -> Option<CellId> {
        self.rules.classify(self.kind, course, options)
    }
}
