use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a booking. Only `InProcess` is produced here; the
/// accept/reject flow that advances it lives outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    InProcess,
    Accepted,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::InProcess => "InProcess",
            BookingStatus::Accepted => "Accepted",
            BookingStatus::Rejected => "Rejected",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Accepted" => BookingStatus::Accepted,
            "Rejected" => BookingStatus::Rejected,
            _ => BookingStatus::InProcess,
        }
    }
}

/// Identities of everyone involved in one scheduling attempt. Collected when
/// the session is opened and carried verbatim into the persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participants {
    pub client_id: String,
    pub client_name: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email: Option<String>,
    pub scheduled_by: String,
    pub client_user_id: String,
    pub client_user_email: String,
}

/// The persisted artifact of a successful negotiation. Append-only: nothing in
/// this service mutates a record after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub client_id: String,
    pub client_name: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email: Option<String>,
    pub primary_date: NaiveDate,
    pub primary_time: NaiveTime,
    /// `primary_time` on the canonical grid. Slot times are anchored there
    /// to begin with, so this matches `primary_time`; it is stored as an
    /// explicit audit column rather than derived.
    pub primary_time_canonical: NaiveTime,
    /// The zone the operator viewed the schedule in. Display metadata only;
    /// it never reinterprets the time columns.
    pub primary_time_zone: String,
    pub alternate_date: Option<NaiveDate>,
    pub alternate_time: Option<NaiveTime>,
    pub alternate_time_zone: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub scheduled_by: String,
    pub client_user_id: String,
    pub client_user_email: String,
}

impl BookingRecord {
    /// The key the ledger's conditional insert is conditioned on.
    pub fn slot_key(&self) -> (&str, NaiveDate, NaiveTime) {
        (&self.employee_id, self.primary_date, self.primary_time)
    }
}
