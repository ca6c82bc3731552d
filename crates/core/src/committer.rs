//! Booking commit.
//!
//! Turns a session that reached `Committing` into a durable record. The
//! write goes through the ledger's conditional insert, so two sessions
//! racing for the same (employee, date, time) key resolve to exactly one
//! committed booking and one `SlotNoLongerAvailable`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{ScheduleError, ScheduleResult};
use crate::models::booking::{BookingRecord, BookingStatus};
use crate::ports::{BookingLedger, CommitOutcome};
use crate::session::NegotiationSession;

pub type CompletionHook = Box<dyn Fn(&BookingRecord) + Send + Sync>;

pub struct BookingCommitter {
    ledger: Arc<dyn BookingLedger>,
    on_complete: Option<CompletionHook>,
}

impl BookingCommitter {
    pub fn new(ledger: Arc<dyn BookingLedger>) -> Self {
        Self {
            ledger,
            on_complete: None,
        }
    }

    /// Register a hook fired exactly once per successful commit, with the
    /// persisted record.
    pub fn with_completion_hook(mut self, hook: CompletionHook) -> Self {
        self.on_complete = Some(hook);
        self
    }

    /// Commit the session's selections.
    ///
    /// On success the session transitions to `Succeeded`. On a commit-time
    /// conflict or write error the session returns to its pre-commit phase
    /// with selections intact, and the error tells the caller whether to
    /// reselect (`SlotNoLongerAvailable`) or retry (`CommitFailed`).
    pub async fn commit(
        &self,
        session: &mut NegotiationSession,
    ) -> ScheduleResult<BookingRecord> {
        session.begin_commit()?;

        let record = match self.build_record(session) {
            Ok(record) => record,
            Err(err) => {
                session.commit_failed();
                return Err(err);
            }
        };

        match self.ledger.insert_if_absent(&record).await {
            Ok(CommitOutcome::Committed) => {
                session.commit_succeeded();
                info!(
                    booking_id = %record.id,
                    employee_id = %record.employee_id,
                    date = %record.primary_date,
                    time = %record.primary_time,
                    "booking committed"
                );
                if let Some(hook) = &self.on_complete {
                    hook(&record);
                }
                Ok(record)
            }
            Ok(CommitOutcome::Conflict) => {
                session.commit_failed();
                warn!(
                    employee_id = %record.employee_id,
                    date = %record.primary_date,
                    time = %record.primary_time,
                    "slot taken between selection and commit"
                );
                Err(ScheduleError::SlotNoLongerAvailable {
                    date: record.primary_date,
                    time: record.primary_time,
                })
            }
            Err(err) => {
                session.commit_failed();
                Err(ScheduleError::CommitFailed(err.to_string()))
            }
        }
    }

    fn build_record(&self, session: &NegotiationSession) -> ScheduleResult<BookingRecord> {
        let primary_date = session
            .primary_date()
            .ok_or_else(|| ScheduleError::Validation("missing primary date".to_string()))?;
        let primary_time = session
            .primary_time()
            .ok_or_else(|| ScheduleError::Validation("missing primary time".to_string()))?;

        // Selections are slot keys, already anchored on the canonical grid.
        // The active zone is recorded as display metadata, never used to
        // reinterpret the time.
        let zone = session.active_time_zone().to_string();

        let participants = session.participants();
        let alternate_zone = session.alternate_time().map(|_| zone.clone());

        Ok(BookingRecord {
            id: Uuid::new_v4(),
            client_id: participants.client_id.clone(),
            client_name: participants.client_name.clone(),
            employee_id: participants.employee_id.clone(),
            employee_name: participants.employee_name.clone(),
            employee_email: participants.employee_email.clone(),
            primary_date,
            primary_time,
            primary_time_canonical: primary_time,
            primary_time_zone: zone,
            alternate_date: session.alternate_date(),
            alternate_time: session.alternate_time(),
            alternate_time_zone: alternate_zone,
            status: BookingStatus::InProcess,
            created_at: Utc::now(),
            scheduled_by: participants.scheduled_by.clone(),
            client_user_id: participants.client_user_id.clone(),
            client_user_email: participants.client_user_email.clone(),
        })
    }
}
