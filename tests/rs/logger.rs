//! Integration tests for logger behavior.

use akiko::logger::{init_file_logging, level, set_level, set_level_from_str, Level};
use akiko::{debug, error, info, warn};

#[test]
fn level_parse_accepts_valid() {
    assert!(set_level_from_str("error"));
    assert!(set_level_from_str("warn"));
    assert!(set_level_from_str("info"));
    assert!(set_level_from_str("debug"));
    assert_eq!(level(), Level::Debug);
}

#[test]
fn level_parse_rejects_invalid() {
    assert!(!set_level_from_str("invalid"));
    assert!(!set_level_from_str(""));
}

#[test]
fn logs_do_not_panic() {
    set_level(Level::Debug);
    info!("info integration");
    warn!("warn integration");
    error!("error integration");
    debug!("debug integration");
}

#[cfg(feature = "file-logging")]
#[test]
fn file_logging_creates_parent_dirs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("logs").join("akiko.log");
    assert!(init_file_logging(&path));
    error!("written to file");
    let content = std::fs::read_to_string(&path).expect("log file");
    assert!(content.contains("[ERROR] written to file"));
}
