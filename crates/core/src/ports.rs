//! Collaborator port traits.
//!
//! The scheduling core never talks to storage directly. These traits are the
//! seam: the db crate provides PostgreSQL-backed implementations with
//! per-call timeouts, tests provide in-memory fakes.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::errors::ScheduleResult;
use crate::models::booking::BookingRecord;

/// Outcome of the ledger's conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Another session already holds the (employee, date, time) key.
    Conflict,
}

/// Administrator-defined blocked time markers.
///
/// A failed read must surface as an error, never as an empty set: the
/// generator degrades with a warning instead of treating blocked hours as
/// open.
#[async_trait]
pub trait BlockRegistry: Send + Sync {
    async fn blocked_slots(&self, date: NaiveDate) -> ScheduleResult<HashSet<NaiveTime>>;
}

/// Durable store of committed bookings.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// All bookings held against one employee, used to build the occupancy
    /// index when a session starts.
    async fn bookings_for_employee(
        &self,
        employee_id: &str,
    ) -> ScheduleResult<Vec<BookingRecord>>;

    /// Atomic insert conditioned on the (employee_id, primary_date,
    /// primary_time) key being absent. This is the single point of mutual
    /// exclusion between concurrent sessions; it must be enforced at the
    /// storage layer, not in-process.
    async fn insert_if_absent(&self, record: &BookingRecord) -> ScheduleResult<CommitOutcome>;
}
