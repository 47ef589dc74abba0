//! Position resolver
//!
//! Combines the catalog, the transcript, the student's planned courses and the
//! classification output into one [`Akiko`]: where every classified course sits
//! (cell) and which accounting bucket it is in (list kind).

use crate::core::classify::Classification;
use crate::core::models::{
    CellId, CourseId, CreditRequirements, FakeCourse, FakeCourseId, KnownCourses, ListKind,
    RealCourse, Transcript,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Cell and bucket of one course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursePosition {
    /// Cell the course counts toward
    pub cell_id: CellId,
    /// Accounting bucket
    pub list_kind: ListKind,
}

/// Classification and transcript disagree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A real course was classified but has no transcript record
    #[error("Course {0} was classified from the transcript but has no transcript record")]
    MissingTranscriptRecord(CourseId),

    /// A fake course was classified but has no transcript record
    #[error("Fake course {0} was classified but has no transcript record")]
    MissingFakeTranscriptRecord(FakeCourseId),
}

/// User-initiated bucket transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Plan a course
    WontTakeToMightTake,
    /// Unplan a course
    MightTakeToWontTake,
}

impl MoveDirection {
    /// Bucket the course must currently be in
    #[must_use]
    pub const fn source_kind(self) -> ListKind {
        match self {
            Self::WontTakeToMightTake => ListKind::WontTake,
            Self::MightTakeToWontTake => ListKind::MightTake,
        }
    }

    /// Bucket the course ends up in
    #[must_use]
    pub const fn target_kind(self) -> ListKind {
        match self {
            Self::WontTakeToMightTake => ListKind::MightTake,
            Self::MightTakeToWontTake => ListKind::WontTake,
        }
    }
}

/// Why [`Akiko::move_course`] did nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveCourseError {
    /// The course has no position (unclassified or not in the catalog)
    #[error("Unknown course id: {0}")]
    UnknownCourseId(CourseId),

    /// The course is not in the source bucket; it was already moved or is taken
    #[error("Course {0} is not in the source list")]
    AlreadyMoved(CourseId),
}

/// Resolved session state: every classified course's cell and bucket
#[derive(Debug, Clone)]
pub struct Akiko {
    known_courses: KnownCourses,
    real_courses: BTreeMap<CourseId, RealCourse>,
    fake_courses: BTreeMap<FakeCourseId, FakeCourse>,
    course_positions: BTreeMap<CourseId, CoursePosition>,
    fake_course_positions: BTreeMap<FakeCourseId, CellId>,
    requirements: CreditRequirements,
}

impl Akiko {
    /// Resolve positions.
    ///
    /// Catalog courses start in `wont-take`, planned ids move to `might-take`,
    /// and transcript records then overwrite both (cell and bucket) according
    /// to their grade. Fake courses keep their own position map.
    ///
    /// # Arguments
    /// * `known_courses` - Course catalog
    /// * `transcript` - Real and fake transcript records
    /// * `might_take` - Course ids the student planned; unknown ids are ignored
    /// * `classification` - Cell assignments for catalog, real and fake courses
    /// * `requirements` - Active requirement table
    ///
    /// # Errors
    /// Returns [`ResolveError`] if a classified transcript course has no record
    pub fn new(
        known_courses: KnownCourses,
        transcript: Transcript,
        might_take: &[CourseId],
        classification: Classification,
        requirements: CreditRequirements,
    ) -> Result<Self, ResolveError> {
        let Transcript {
            real_courses,
            fake_courses,
        } = transcript;

        let mut course_positions: BTreeMap<CourseId, CoursePosition> = classification
            .known
            .into_iter()
            .map(|(id, cell_id)| {
                (
                    id,
                    CoursePosition {
                        cell_id,
                        list_kind: ListKind::WontTake,
                    },
                )
            })
            .collect();

        for id in might_take {
            match course_positions.get_mut(id) {
                Some(position) => position.list_kind = ListKind::MightTake,
                None => crate::debug!("Planned course {id} has no position; ignored"),
            }
        }

        for (id, cell_id) in classification.real {
            let record = real_courses
                .get(&id)
                .ok_or_else(|| ResolveError::MissingTranscriptRecord(id.clone()))?;
            let list_kind = record.grade.list_kind();
            course_positions.insert(id, CoursePosition { cell_id, list_kind });
        }

        if let Some(id) = classification
            .fake
            .keys()
            .find(|id| !fake_courses.contains_key(*id))
        {
            return Err(ResolveError::MissingFakeTranscriptRecord(*id));
        }

        crate::debug!(
            "Resolved {} course positions and {} fake course positions",
            course_positions.len(),
            classification.fake.len()
        );

        Ok(Self {
            known_courses,
            real_courses,
            fake_courses,
            course_positions,
            fake_course_positions: classification.fake,
            requirements,
        })
    }

    /// Move a course between `wont-take` and `might-take`.
    ///
    /// Taken courses never move; asking to move one reports
    /// [`MoveCourseError::AlreadyMoved`].
    ///
    /// # Errors
    /// * [`MoveCourseError::UnknownCourseId`] if the course has no position
    /// * [`MoveCourseError::AlreadyMoved`] if it is not in the source bucket
    pub fn move_course(
        &mut self,
        direction: MoveDirection,
        course_id: &CourseId,
    ) -> Result<(), MoveCourseError> {
        let position = self
            .course_positions
            .get_mut(course_id)
            .ok_or_else(|| MoveCourseError::UnknownCourseId(course_id.clone()))?;

        if position.list_kind != direction.source_kind() {
            return Err(MoveCourseError::AlreadyMoved(course_id.clone()));
        }

        position.list_kind = direction.target_kind();
        crate::debug!(
            "Moved {course_id} in {} to {}",
            position.cell_id,
            position.list_kind
        );
        Ok(())
    }

    /// Course catalog
    #[must_use]
    pub const fn known_courses(&self) -> &KnownCourses {
        &self.known_courses
    }

    /// Transcript records with a course id
    #[must_use]
    pub const fn real_courses(&self) -> &BTreeMap<CourseId, RealCourse> {
        &self.real_courses
    }

    /// Transcript records without a course id
    #[must_use]
    pub const fn fake_courses(&self) -> &BTreeMap<FakeCourseId, FakeCourse> {
        &self.fake_courses
    }

    /// Positions of catalog and real transcript courses
    #[must_use]
    pub const fn course_positions(&self) -> &BTreeMap<CourseId, CoursePosition> {
        &self.course_positions
    }

    /// Cells of fake transcript courses
    #[must_use]
    pub const fn fake_course_positions(&self) -> &BTreeMap<FakeCourseId, CellId> {
        &self.fake_course_positions
    }

    /// Active requirement table
    #[must_use]
    pub const fn requirements(&self) -> &CreditRequirements {
        &self.requirements
    }

    /// Position of one course
    #[must_use]
    pub fn position(&self, course_id: &CourseId) -> Option<&CoursePosition> {
        self.course_positions.get(course_id)
    }

    /// Credits of a course: the transcript record wins over the catalog entry.
    /// `None` when neither knows the credit.
    #[must_use]
    pub fn credit_of(&self, course_id: &CourseId) -> Option<f64> {
        self.real_courses.get(course_id).map_or_else(
            || {
                self.known_courses
                    .get(course_id)
                    .and_then(|course| course.credit)
            },
            |record| Some(record.credit),
        )
    }

    /// Course ids in one cell and bucket, in id order
    #[must_use]
    pub fn courses_in(&self, cell_id: &CellId, list_kind: ListKind) -> Vec<&CourseId> {
        self.course_positions
            .iter()
            .filter(|(_, position)| position.cell_id == *cell_id && position.list_kind == list_kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// Fake course ids in one cell
    #[must_use]
    pub fn fake_courses_in(&self, cell_id: &CellId) -> Vec<FakeCourseId> {
        self.fake_course_positions
            .iter()
            .filter(|(_, cell)| *cell == cell_id)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Courses the student planned by hand: `might-take` without a transcript record.
    ///
    /// This is the list a front end persists and feeds back as `might_take`.
    #[must_use]
    pub fn planned_course_ids(&self) -> Vec<CourseId> {
        self.course_positions
            .iter()
            .filter(|(id, position)| {
                position.list_kind == ListKind::MightTake && !self.real_courses.contains_key(*id)
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Cells that hold a course but have no entry in the requirement table
    #[must_use]
    pub fn unrequired_cells(&self) -> BTreeSet<CellId> {
        self.course_positions
            .values()
            .map(|position| &position.cell_id)
            .chain(self.fake_course_positions.values())
            .filter(|cell_id| self.requirements.cell(cell_id).is_none())
            .cloned()
            .collect()
    }
}
