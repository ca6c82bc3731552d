use chrono::{NaiveDate, NaiveTime};
use slotbook_core::errors::{ScheduleError, ScheduleResult};
use slotbook_core::session::Phase;

#[test]
fn test_schedule_error_display() {
    let invalid_zone = ScheduleError::InvalidTimeZone("Mars/Olympus".to_string());
    let registry = ScheduleError::RegistryUnavailable("timed out".to_string());
    let conflict = ScheduleError::SlotNoLongerAvailable {
        date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
    };
    let commit = ScheduleError::CommitFailed("connection reset".to_string());
    let transition = ScheduleError::InvalidTransition {
        phase: Phase::ChoosingPrimaryDate,
        action: "select_time",
    };
    let validation = ScheduleError::Validation("bad input".to_string());
    let not_found = ScheduleError::NotFound("session".to_string());
    let database = ScheduleError::Database(eyre::eyre!("connection refused"));

    assert_eq!(
        invalid_zone.to_string(),
        "Unrecognized time zone: Mars/Olympus"
    );
    assert_eq!(
        registry.to_string(),
        "Availability source unavailable: timed out"
    );
    assert_eq!(
        conflict.to_string(),
        "Slot no longer available: 2024-06-10 14:00:00"
    );
    assert_eq!(commit.to_string(), "Commit failed: connection reset");
    assert!(transition.to_string().contains("select_time"));
    assert!(transition.to_string().contains("ChoosingPrimaryDate"));
    assert_eq!(validation.to_string(), "Validation error: bad input");
    assert_eq!(not_found.to_string(), "Resource not found: session");
    assert!(database.to_string().contains("Database error:"));
}

#[test]
fn test_schedule_result() {
    let result: ScheduleResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: ScheduleResult<i32> = Err(ScheduleError::NotFound("nope".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_eyre_conversion() {
    fn db_call() -> ScheduleResult<()> {
        Err(eyre::eyre!("pool exhausted"))?;
        Ok(())
    }

    let err = db_call().unwrap_err();
    assert!(matches!(err, ScheduleError::Database(_)));
}
