//! Data models for `Akiko`

pub mod course;
pub mod grade;
pub mod ids;
pub mod requirements;

pub use course::{FakeCourse, KnownCourse, KnownCourses, RealCourse, Transcript, TranscriptEntry};
pub use grade::{grade_is_pass, Grade, ListKind, TranscriptGrade};
pub use ids::{
    cell_id_to_column_id, column_id_is_compulsory, is_cell_id, is_course_id, is_fake_course_id,
    CellId, ColumnId, CourseId, FakeCourseId, FakeCourseIdAllocator,
};
pub use requirements::{Bound, CreditRange, CreditRequirements};
