use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::session::Phase;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Unrecognized time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Availability source unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Slot no longer available: {date} {time}")]
    SlotNoLongerAvailable { date: NaiveDate, time: NaiveTime },

    #[error("Commit failed: {0}")]
    CommitFailed(String),

    #[error("Invalid transition: {action} is not allowed while {phase:?}")]
    InvalidTransition { phase: Phase, action: &'static str },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
