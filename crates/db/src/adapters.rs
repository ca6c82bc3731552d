//! PostgreSQL-backed implementations of the core port traits.
//!
//! Every call is bounded by a timeout so a wedged database surfaces as a
//! transient error instead of hanging a negotiation.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Postgres};
use tokio::time::timeout;

use slotbook_core::errors::{ScheduleError, ScheduleResult};
use slotbook_core::models::booking::BookingRecord;
use slotbook_core::ports::{BlockRegistry, BookingLedger, CommitOutcome};

use crate::repositories::{block, booking};

#[derive(Clone)]
pub struct PgBlockRegistry {
    pool: Pool<Postgres>,
    call_timeout: Duration,
}

impl PgBlockRegistry {
    pub fn new(pool: Pool<Postgres>, call_timeout: Duration) -> Self {
        Self { pool, call_timeout }
    }
}

#[async_trait]
impl BlockRegistry for PgBlockRegistry {
    async fn blocked_slots(&self, date: NaiveDate) -> ScheduleResult<HashSet<NaiveTime>> {
        let rows = timeout(
            self.call_timeout,
            block::get_blocked_slots_by_date(&self.pool, date),
        )
        .await
        .map_err(|_| {
            ScheduleError::RegistryUnavailable(format!(
                "block lookup for {date} timed out"
            ))
        })?
        .map_err(|e| ScheduleError::RegistryUnavailable(e.to_string()))?;

        Ok(rows.into_iter().map(|row| row.block_time).collect())
    }
}

#[derive(Clone)]
pub struct PgBookingLedger {
    pool: Pool<Postgres>,
    call_timeout: Duration,
}

impl PgBookingLedger {
    pub fn new(pool: Pool<Postgres>, call_timeout: Duration) -> Self {
        Self { pool, call_timeout }
    }
}

#[async_trait]
impl BookingLedger for PgBookingLedger {
    async fn bookings_for_employee(
        &self,
        employee_id: &str,
    ) -> ScheduleResult<Vec<BookingRecord>> {
        let rows = timeout(
            self.call_timeout,
            booking::get_bookings_by_employee_id(&self.pool, employee_id),
        )
        .await
        .map_err(|_| {
            ScheduleError::RegistryUnavailable(format!(
                "booking lookup for employee {employee_id} timed out"
            ))
        })?
        .map_err(ScheduleError::Database)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_if_absent(&self, record: &BookingRecord) -> ScheduleResult<CommitOutcome> {
        let inserted = timeout(
            self.call_timeout,
            booking::insert_if_absent(&self.pool, record),
        )
        .await
        .map_err(|_| ScheduleError::CommitFailed("booking write timed out".to_string()))?
        .map_err(|e| ScheduleError::CommitFailed(e.to_string()))?;

        Ok(match inserted {
            Some(_) => CommitOutcome::Committed,
            None => CommitOutcome::Conflict,
        })
    }
}
