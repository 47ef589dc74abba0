//! Core module: domain model, position resolver, credit aggregator and their importers

pub mod akiko;
pub mod classify;
pub mod config;
pub mod import;
pub mod models;
pub mod session;
pub mod stats;
pub mod stats_export;

pub use akiko::{Akiko, CoursePosition, MoveCourseError, MoveDirection, ResolveError};
pub use stats::{base_credit_stats_new, BaseCreditStats, CreditStats};

/// Returns the current version of the `Akiko` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
