use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use slotbook_core::models::booking::{BookingRecord, BookingStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub client_id: String,
    pub client_name: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email: Option<String>,
    pub primary_date: NaiveDate,
    pub primary_time: NaiveTime,
    pub primary_time_canonical: NaiveTime,
    pub primary_time_zone: String,
    pub alternate_date: Option<NaiveDate>,
    pub alternate_time: Option<NaiveTime>,
    pub alternate_time_zone: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub scheduled_by: String,
    pub client_user_id: String,
    pub client_user_email: String,
}

impl From<DbBooking> for BookingRecord {
    fn from(row: DbBooking) -> Self {
        BookingRecord {
            id: row.id,
            client_id: row.client_id,
            client_name: row.client_name,
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            employee_email: row.employee_email,
            primary_date: row.primary_date,
            primary_time: row.primary_time,
            primary_time_canonical: row.primary_time_canonical,
            primary_time_zone: row.primary_time_zone,
            alternate_date: row.alternate_date,
            alternate_time: row.alternate_time,
            alternate_time_zone: row.alternate_time_zone,
            status: BookingStatus::from_str(&row.status),
            created_at: row.created_at,
            scheduled_by: row.scheduled_by,
            client_user_id: row.client_user_id,
            client_user_email: row.client_user_email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBlockedSlot {
    pub id: Uuid,
    pub block_date: NaiveDate,
    pub block_time: NaiveTime,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
