use std::path::PathBuf;

use tt::error::{exit_codes, Error, JsonError};
use tt::model::TaskKind;

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::NotFound {
        kind: TaskKind::Epic,
        id: 12,
    };
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let blocked = Error::ScheduleConflict {
        start: "24.08.2026 12:15".to_string(),
        minutes: 10,
    };
    assert_eq!(blocked.exit_code(), exit_codes::SCHEDULE_BLOCKED);

    let op = Error::LockFailed(PathBuf::from("tracker.csv.lock"));
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);

    let csv = Error::Csv("expected 8 columns".to_string());
    assert_eq!(csv.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code() {
    let err = Error::NotFound {
        kind: TaskKind::Subtask,
        id: 3,
    };
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("No subtask with id 3"));
}

#[test]
fn conflict_message_names_the_window() {
    let err = Error::ScheduleConflict {
        start: "24.08.2026 12:15".to_string(),
        minutes: 10,
    };
    let message = err.to_string();
    assert!(message.contains("24.08.2026 12:15"));
    assert!(message.contains("overlaps"));
}
