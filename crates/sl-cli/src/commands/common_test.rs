use super::*;
use serde_json::json;

#[test]
fn test_exit_code_displays_nothing() {
    assert_eq!(ExitCode(1).to_string(), "");
}

#[test]
fn test_exit_code_downcast() {
    let err: anyhow::Error = ExitCode(3).into();
    assert_eq!(err.downcast_ref::<ExitCode>().map(|c| c.0), Some(3));
}

#[test]
fn test_display_value() {
    assert_eq!(display_value(&json!("Mathematics")), "Mathematics");
    assert_eq!(display_value(&json!(null)), "NULL");
    assert_eq!(display_value(&json!(42)), "42");
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
}
