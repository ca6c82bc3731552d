//! The negotiation session and its phase machine.
//!
//! One session covers one scheduling attempt for one (client, employee)
//! pair: pick a primary date and time, optionally negotiate a single
//! alternate slot, then commit. All transient selection state lives here in
//! one aggregate with an explicit phase enum, so there are no half-states
//! reachable only through flag combinations.

use chrono::{Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::errors::{ScheduleError, ScheduleResult};
use crate::models::booking::Participants;
use crate::models::slot::{DaySchedule, OccupancyIndex, OperatingWindow};

/// Where the operator is in the negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    ChoosingPrimaryDate,
    ChoosingPrimaryTime,
    AskingAlternateOffer,
    ChoosingAlternateDate,
    ChoosingAlternateTime,
    ConfirmingAlternate,
    Committing,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Scheduling rules that apply to every session.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    pub window: OperatingWindow,
    /// Weekdays never eligible for scheduling.
    pub non_working_days: Vec<Weekday>,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            window: OperatingWindow::default(),
            non_working_days: vec![Weekday::Sun],
        }
    }
}

/// Mutable aggregate for one scheduling attempt.
#[derive(Debug, Clone)]
pub struct NegotiationSession {
    pub id: Uuid,
    participants: Participants,
    policy: SessionPolicy,
    /// Snapshot of the target employee's booked slots, taken at session
    /// start. The authoritative re-check happens inside the ledger at commit.
    occupancy: OccupancyIndex,
    active_time_zone: String,
    phase: Phase,
    primary_date: Option<NaiveDate>,
    primary_time: Option<NaiveTime>,
    alternate_date: Option<NaiveDate>,
    alternate_time: Option<NaiveTime>,
    /// One-shot latch: flips false -> true when the operator accepts the
    /// alternate offer and is never cleared except by restart.
    alternate_offered: bool,
    /// Guards against a second commit being started while one is in flight.
    commit_in_flight: bool,
}

impl NegotiationSession {
    pub fn new(
        participants: Participants,
        policy: SessionPolicy,
        occupancy: OccupancyIndex,
        time_zone: &str,
    ) -> ScheduleResult<Self> {
        catalog::resolve(time_zone)?;
        Ok(Self {
            id: Uuid::new_v4(),
            participants,
            policy,
            occupancy,
            active_time_zone: time_zone.to_string(),
            phase: Phase::ChoosingPrimaryDate,
            primary_date: None,
            primary_time: None,
            alternate_date: None,
            alternate_time: None,
            alternate_offered: false,
            commit_in_flight: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn active_time_zone(&self) -> &str {
        &self.active_time_zone
    }

    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    pub fn primary_date(&self) -> Option<NaiveDate> {
        self.primary_date
    }

    pub fn primary_time(&self) -> Option<NaiveTime> {
        self.primary_time
    }

    pub fn alternate_date(&self) -> Option<NaiveDate> {
        self.alternate_date
    }

    pub fn alternate_time(&self) -> Option<NaiveTime> {
        self.alternate_time
    }

    pub fn alternate_offered(&self) -> bool {
        self.alternate_offered
    }

    /// The date a slot listing should be generated for in the current phase.
    pub fn active_date(&self) -> Option<NaiveDate> {
        match self.phase {
            Phase::ChoosingAlternateDate
            | Phase::ChoosingAlternateTime
            | Phase::ConfirmingAlternate => self.alternate_date.or(self.primary_date),
            _ => self.primary_date,
        }
    }

    /// Today's date as seen from the session's active timezone.
    fn today(&self) -> NaiveDate {
        let tz = catalog::resolve(&self.active_time_zone)
            .unwrap_or(chrono_tz::UTC);
        Utc::now().with_timezone(&tz).date_naive()
    }

    /// The disabled-date predicate: past dates, non-working weekdays, and
    /// fully-occupied dates are never selectable.
    pub fn is_date_selectable(&self, date: NaiveDate, today: NaiveDate) -> bool {
        if date < today {
            return false;
        }
        if self.policy.non_working_days.contains(&date.weekday()) {
            return false;
        }
        !self.occupancy.is_full(date, &self.policy.window)
    }

    fn rejected(&self, action: &'static str) -> ScheduleError {
        ScheduleError::InvalidTransition {
            phase: self.phase,
            action,
        }
    }

    fn guard_not_committing(&self, action: &'static str) -> ScheduleResult<()> {
        if self.commit_in_flight {
            return Err(ScheduleError::InvalidTransition {
                phase: Phase::Committing,
                action,
            });
        }
        Ok(())
    }

    /// Select the primary or alternate date, depending on phase. Disabled
    /// dates are rejected in place, never silently skipped.
    pub fn select_date(&mut self, date: NaiveDate) -> ScheduleResult<()> {
        self.guard_not_committing("select_date")?;
        match self.phase {
            Phase::ChoosingPrimaryDate | Phase::ChoosingAlternateDate => {}
            _ => return Err(self.rejected("select_date")),
        }
        if !self.is_date_selectable(date, self.today()) {
            return Err(ScheduleError::Validation(format!(
                "{date} is not selectable"
            )));
        }
        match self.phase {
            Phase::ChoosingPrimaryDate => {
                self.primary_date = Some(date);
                self.phase = Phase::ChoosingPrimaryTime;
            }
            Phase::ChoosingAlternateDate => {
                self.alternate_date = Some(date);
                self.phase = Phase::ChoosingAlternateTime;
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    /// Select the primary or alternate time, depending on phase.
    ///
    /// On the primary path this either raises the one-time alternate offer
    /// or, when that offer was already negotiated this session, proceeds
    /// straight to committing.
    pub fn select_time(&mut self, time: NaiveTime) -> ScheduleResult<()> {
        self.guard_not_committing("select_time")?;
        match self.phase {
            Phase::ChoosingPrimaryTime | Phase::ChoosingAlternateTime => {}
            _ => return Err(self.rejected("select_time")),
        }
        if !self.policy.window.contains(time) {
            return Err(ScheduleError::Validation(format!(
                "{time} is outside the operating window"
            )));
        }
        match self.phase {
            Phase::ChoosingPrimaryTime => {
                self.primary_time = Some(time);
                self.phase = if self.alternate_offered {
                    Phase::Committing
                } else {
                    Phase::AskingAlternateOffer
                };
            }
            Phase::ChoosingAlternateTime => {
                self.alternate_time = Some(time);
                self.phase = Phase::ConfirmingAlternate;
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    /// Accept the alternate offer, permanently latching it for this session.
    pub fn accept_alternate(&mut self) -> ScheduleResult<()> {
        self.guard_not_committing("accept_alternate")?;
        if self.phase != Phase::AskingAlternateOffer {
            return Err(self.rejected("accept_alternate"));
        }
        self.alternate_offered = true;
        self.phase = Phase::ChoosingAlternateDate;
        Ok(())
    }

    /// Decline the alternate offer and move to committing.
    pub fn decline_alternate(&mut self) -> ScheduleResult<()> {
        self.guard_not_committing("decline_alternate")?;
        if self.phase != Phase::AskingAlternateOffer {
            return Err(self.rejected("decline_alternate"));
        }
        self.phase = Phase::Committing;
        Ok(())
    }

    /// Explicit "change date" while picking the alternate time.
    pub fn change_alternate_date(&mut self) -> ScheduleResult<()> {
        self.guard_not_committing("change_alternate_date")?;
        if self.phase != Phase::ChoosingAlternateTime {
            return Err(self.rejected("change_alternate_date"));
        }
        self.alternate_date = None;
        self.alternate_time = None;
        self.phase = Phase::ChoosingAlternateDate;
        Ok(())
    }

    /// Final confirmation of the primary + alternate pair.
    pub fn confirm_alternate(&mut self) -> ScheduleResult<()> {
        self.guard_not_committing("confirm_alternate")?;
        if self.phase != Phase::ConfirmingAlternate {
            return Err(self.rejected("confirm_alternate"));
        }
        self.phase = Phase::Committing;
        Ok(())
    }

    /// Change the active timezone. Allowed in any non-terminal phase; the
    /// caller is expected to regenerate the active schedule afterwards and
    /// run [`revalidate_time`](Self::revalidate_time) against it.
    pub fn set_time_zone(&mut self, zone: &str) -> ScheduleResult<()> {
        self.guard_not_committing("set_time_zone")?;
        if self.phase.is_terminal() {
            return Err(self.rejected("set_time_zone"));
        }
        catalog::resolve(zone)?;
        self.active_time_zone = zone.to_string();
        Ok(())
    }

    /// After a schedule regeneration, drop any chosen time the new schedule
    /// reports unavailable and step back so the operator must reselect.
    /// Returns true when a reselection was forced.
    pub fn revalidate_time(&mut self, schedule: &DaySchedule) -> bool {
        if self.commit_in_flight || self.phase.is_terminal() {
            return false;
        }
        if let (Some(date), Some(time)) = (self.alternate_date, self.alternate_time) {
            if date == schedule.date && Self::unavailable(schedule, time) {
                self.alternate_time = None;
                self.phase = Phase::ChoosingAlternateTime;
                return true;
            }
        }
        if let (Some(date), Some(time)) = (self.primary_date, self.primary_time) {
            if date == schedule.date && Self::unavailable(schedule, time) {
                self.primary_time = None;
                self.phase = Phase::ChoosingPrimaryTime;
                return true;
            }
        }
        false
    }

    fn unavailable(schedule: &DaySchedule, time: NaiveTime) -> bool {
        schedule
            .slot_at(time)
            .map(|slot| !slot.is_available)
            .unwrap_or(true)
    }

    /// Claim the in-flight commit. Only legal from `Committing`, and only
    /// once at a time: a re-entrant call while a commit is outstanding is
    /// rejected rather than interleaved.
    pub(crate) fn begin_commit(&mut self) -> ScheduleResult<()> {
        if self.phase != Phase::Committing {
            return Err(self.rejected("commit"));
        }
        self.guard_not_committing("commit")?;
        if self.primary_date.is_none() || self.primary_time.is_none() {
            // No path through the machine reaches Committing without a
            // primary selection; if it happens the session is unusable.
            self.phase = Phase::Failed;
            return Err(ScheduleError::Validation(
                "session reached commit without a primary selection".to_string(),
            ));
        }
        self.commit_in_flight = true;
        Ok(())
    }

    /// Record the successful durable write.
    pub(crate) fn commit_succeeded(&mut self) {
        self.commit_in_flight = false;
        self.phase = Phase::Succeeded;
    }

    /// Return to the pre-commit state with all selections intact so the
    /// operator can retry or pick a different slot.
    pub(crate) fn commit_failed(&mut self) {
        self.commit_in_flight = false;
        self.phase = if self.alternate_time.is_some() {
            Phase::ConfirmingAlternate
        } else {
            Phase::AskingAlternateOffer
        };
    }

    /// Start over with a fresh occupancy snapshot, clearing every selection
    /// including the alternate latch.
    pub fn restart(&mut self, occupancy: OccupancyIndex) -> ScheduleResult<()> {
        self.guard_not_committing("restart")?;
        self.occupancy = occupancy;
        self.phase = Phase::ChoosingPrimaryDate;
        self.primary_date = None;
        self.primary_time = None;
        self.alternate_date = None;
        self.alternate_time = None;
        self.alternate_offered = false;
        Ok(())
    }
}

/// Read-only view of a session for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub phase: Phase,
    pub active_time_zone: String,
    pub primary_date: Option<NaiveDate>,
    pub primary_time: Option<NaiveTime>,
    pub alternate_date: Option<NaiveDate>,
    pub alternate_time: Option<NaiveTime>,
    pub alternate_offered: bool,
}

impl From<&NegotiationSession> for SessionSnapshot {
    fn from(session: &NegotiationSession) -> Self {
        Self {
            id: session.id,
            phase: session.phase(),
            active_time_zone: session.active_time_zone().to_string(),
            primary_date: session.primary_date(),
            primary_time: session.primary_time(),
            alternate_date: session.alternate_date(),
            alternate_time: session.alternate_time(),
            alternate_offered: session.alternate_offered(),
        }
    }
}
