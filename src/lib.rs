//! Shared library for `Akiko`
//! Credit accounting engine plus the importers, configuration and logging used by the CLI

pub mod core;
pub mod logger;

pub use crate::core::{
    config, get_version, Akiko, BaseCreditStats, CreditStats, MoveCourseError, MoveDirection,
};
