//! Integration smoke tests for `akiko`

use akiko::core::models::column_id_is_compulsory;
use akiko::core::models::ColumnId;
use akiko::get_version;

#[test]
fn version_is_not_empty() {
    let v = get_version();
    assert!(!v.trim().is_empty());
}

#[test]
fn compulsory_partition_is_every_other_column() {
    let compulsory: String = ColumnId::ALL
        .iter()
        .filter(|c| column_id_is_compulsory(**c))
        .map(|c| c.as_char())
        .collect();
    assert_eq!(compulsory, "aceg");
}
