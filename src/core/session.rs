//! Student session
//!
//! Holds everything that survives between transcript imports (catalog,
//! requirement table, classifiers, the planned list and the fake course id
//! counter) and rebuilds an [`Akiko`] whenever a transcript comes in.

use crate::core::akiko::{Akiko, ResolveError};
use crate::core::classify::{ClassifyOptions, ProgramClassifiers};
use crate::core::import::{parse_transcript_csv, TranscriptError};
use crate::core::models::{
    CellId, CourseId, CreditRequirements, FakeCourseIdAllocator, KnownCourses, Transcript,
};
use crate::core::stats::CreditStats;
use thiserror::Error;

/// Why a session could not produce a state
#[derive(Debug, Error)]
pub enum SessionError {
    /// The transcript was rejected
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    /// Classification and transcript disagree
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Courses were classified into cells the requirement table does not know
    #[error("Courses classified into cells without a requirement entry: {}", format_cells(.0))]
    UnrequiredCells(Vec<CellId>),
}

fn format_cells(cells: &[CellId]) -> String {
    cells
        .iter()
        .map(CellId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One student's working session
pub struct Session {
    known_courses: KnownCourses,
    requirements: CreditRequirements,
    classifiers: ProgramClassifiers,
    options: ClassifyOptions,
    strict: bool,
    planned: Vec<CourseId>,
    allocator: FakeCourseIdAllocator,
}

impl Session {
    /// Create a strict session for a native student with nothing planned
    #[must_use]
    pub fn new(
        known_courses: KnownCourses,
        requirements: CreditRequirements,
        classifiers: ProgramClassifiers,
    ) -> Self {
        Self {
            known_courses,
            requirements,
            classifiers,
            options: ClassifyOptions { is_native: true },
            strict: true,
            planned: Vec::new(),
            allocator: FakeCourseIdAllocator::new(),
        }
    }

    /// Set the student context passed to classifiers
    #[must_use]
    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Turn the unrequired-cell check on or off
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replace the list of courses planned by hand
    pub fn set_planned(&mut self, planned: Vec<CourseId>) {
        self.planned = planned;
    }

    /// Active requirement table
    #[must_use]
    pub const fn requirements(&self) -> &CreditRequirements {
        &self.requirements
    }

    /// Parse a transcript, drawing fake course ids from this session's counter
    ///
    /// # Errors
    /// Returns [`SessionError::Transcript`] if the text is rejected
    pub fn import_transcript(&mut self, text: &str) -> Result<Transcript, SessionError> {
        Ok(parse_transcript_csv(text, &mut self.allocator)?)
    }

    /// Classify everything and resolve positions against `transcript`.
    ///
    /// In strict mode a course classified into a cell with no requirement
    /// entry fails the resolution instead of being skipped by aggregation.
    ///
    /// # Errors
    /// * [`SessionError::Resolve`] if classification and transcript disagree
    /// * [`SessionError::UnrequiredCells`] in strict mode, see above
    pub fn resolve(&self, transcript: Transcript) -> Result<Akiko, SessionError> {
        let classification =
            self.classifiers
                .classify(&self.known_courses, &transcript, self.options);

        let akiko = Akiko::new(
            self.known_courses.clone(),
            transcript,
            &self.planned,
            classification,
            self.requirements.clone(),
        )?;

        let unrequired = akiko.unrequired_cells();
        if !unrequired.is_empty() {
            if self.strict {
                return Err(SessionError::UnrequiredCells(unrequired.into_iter().collect()));
            }
            crate::warn!(
                "Ignoring courses in cells without a requirement entry: {}",
                format_cells(&unrequired.into_iter().collect::<Vec<_>>())
            );
        }

        Ok(akiko)
    }

    /// Import, resolve and aggregate in one step
    ///
    /// # Errors
    /// Any error of [`import_transcript`](Self::import_transcript) or [`resolve`](Self::resolve)
    pub fn tally(&mut self, text: &str) -> Result<(Akiko, CreditStats), SessionError> {
        let transcript = self.import_transcript(text)?;
        let akiko = self.resolve(transcript)?;
        let stats = akiko.credit_stats();
        Ok((akiko, stats))
    }
}
