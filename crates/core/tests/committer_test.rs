use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use pretty_assertions::assert_eq;
use slotbook_core::committer::BookingCommitter;
use slotbook_core::errors::{ScheduleError, ScheduleResult};
use slotbook_core::models::booking::{BookingRecord, BookingStatus, Participants};
use slotbook_core::models::slot::{DaySchedule, OccupancyIndex, OperatingWindow, Slot};
use slotbook_core::ports::{BlockRegistry, BookingLedger, CommitOutcome};
use slotbook_core::session::{NegotiationSession, Phase, SessionPolicy};
use slotbook_core::slots::SlotGenerator;

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn participants() -> Participants {
    Participants {
        client_id: "client-1".to_string(),
        client_name: "Acme Corp".to_string(),
        employee_id: "emp-7".to_string(),
        employee_name: "Priya Nair".to_string(),
        employee_email: None,
        scheduled_by: "ops-user".to_string(),
        client_user_id: "cu-42".to_string(),
        client_user_email: "ops@acme.example".to_string(),
    }
}

fn working_day(weeks: i64) -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(7 * weeks);
    while day.weekday() == Weekday::Sun {
        day += Duration::days(1);
    }
    day
}

/// Ledger backed by a set of slot keys behind a mutex: the conditional
/// insert is atomic the same way a unique constraint is.
#[derive(Default)]
struct InMemoryLedger {
    keys: Mutex<HashSet<(String, NaiveDate, NaiveTime)>>,
    fail_writes: AtomicBool,
}

impl InMemoryLedger {
    fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingLedger for InMemoryLedger {
    async fn bookings_for_employee(
        &self,
        _employee_id: &str,
    ) -> ScheduleResult<Vec<BookingRecord>> {
        Ok(Vec::new())
    }

    async fn insert_if_absent(&self, record: &BookingRecord) -> ScheduleResult<CommitOutcome> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ScheduleError::CommitFailed("write refused".to_string()));
        }
        let key = (
            record.employee_id.clone(),
            record.primary_date,
            record.primary_time,
        );
        let mut keys = self.keys.lock().unwrap();
        if keys.contains(&key) {
            return Ok(CommitOutcome::Conflict);
        }
        keys.insert(key);
        Ok(CommitOutcome::Committed)
    }
}

struct NoBlocks;

#[async_trait]
impl BlockRegistry for NoBlocks {
    async fn blocked_slots(&self, _date: NaiveDate) -> ScheduleResult<HashSet<NaiveTime>> {
        Ok(HashSet::new())
    }
}

/// Schedule for `day` with one slot shown as taken.
fn taken_at(day: NaiveDate, taken: NaiveTime) -> DaySchedule {
    DaySchedule {
        date: day,
        time_zone: "Asia/Kolkata".to_string(),
        slots: (9..=21)
            .map(|h| Slot {
                system_time: hour(h),
                display_time: format!("{h}:00"),
                is_available: hour(h) != taken,
            })
            .collect(),
        degraded: false,
    }
}

fn session_at_committing(day: NaiveDate, time: NaiveTime) -> NegotiationSession {
    let mut session = NegotiationSession::new(
        participants(),
        SessionPolicy::default(),
        OccupancyIndex::new(),
        "Asia/Kolkata",
    )
    .unwrap();
    session.select_date(day).unwrap();
    session.select_time(time).unwrap();
    session.decline_alternate().unwrap();
    session
}

#[tokio::test]
async fn commit_produces_an_in_process_record() {
    let ledger = Arc::new(InMemoryLedger::default());
    let committer = BookingCommitter::new(ledger);

    let day = working_day(1);
    let mut session = session_at_committing(day, hour(10));

    let record = committer.commit(&mut session).await.unwrap();
    assert_eq!(session.phase(), Phase::Succeeded);
    assert_eq!(record.status, BookingStatus::InProcess);
    assert_eq!(record.primary_date, day);
    assert_eq!(record.primary_time, hour(10));
    assert_eq!(record.primary_time_zone, "Asia/Kolkata");
    assert_eq!(record.alternate_date, None);
    assert_eq!(record.alternate_time, None);
    assert_eq!(record.alternate_time_zone, None);
    // Slot times live on the canonical grid, so the audit column matches.
    assert_eq!(record.primary_time_canonical, hour(10));
}

#[tokio::test]
async fn commit_carries_a_confirmed_alternate() {
    let ledger = Arc::new(InMemoryLedger::default());
    let committer = BookingCommitter::new(ledger);

    let mut session = NegotiationSession::new(
        participants(),
        SessionPolicy::default(),
        OccupancyIndex::new(),
        "Asia/Kolkata",
    )
    .unwrap();
    session.select_date(working_day(1)).unwrap();
    session.select_time(hour(10)).unwrap();
    session.accept_alternate().unwrap();
    let later = working_day(2);
    session.select_date(later).unwrap();
    session.select_time(hour(11)).unwrap();
    session.confirm_alternate().unwrap();

    let record = committer.commit(&mut session).await.unwrap();
    assert_eq!(record.alternate_date, Some(later));
    assert_eq!(record.alternate_time, Some(hour(11)));
    assert_eq!(record.alternate_time_zone, Some("Asia/Kolkata".to_string()));
}

#[tokio::test]
async fn record_times_stay_on_the_grid_the_operator_was_shown() {
    let ledger = Arc::new(InMemoryLedger::default());
    let committer = BookingCommitter::new(ledger);
    let generator = SlotGenerator::new(OperatingWindow::default(), chrono_tz::Asia::Kolkata);

    let day = working_day(1);
    let schedule = generator
        .generate(day, "America/New_York", &OccupancyIndex::new(), &NoBlocks)
        .await
        .unwrap();
    let shown = schedule.slot_at(hour(10)).unwrap().display_time.clone();

    let mut session = NegotiationSession::new(
        participants(),
        SessionPolicy::default(),
        OccupancyIndex::new(),
        "America/New_York",
    )
    .unwrap();
    session.select_date(day).unwrap();
    session.select_time(hour(10)).unwrap();
    session.decline_alternate().unwrap();

    let record = committer.commit(&mut session).await.unwrap();

    // The stored times are the grid key, never a reinterpretation of the
    // slot hour in the viewer's zone.
    assert_eq!(record.primary_time, hour(10));
    assert_eq!(record.primary_time_canonical, hour(10));
    assert_eq!(record.primary_time_zone, "America/New_York");

    // Rendering the stored grid instant for the stored zone reproduces
    // exactly what the slot listing displayed at selection time.
    let viewer_zone: chrono_tz::Tz = record.primary_time_zone.parse().unwrap();
    let grid_instant = chrono_tz::Asia::Kolkata
        .from_local_datetime(&record.primary_date.and_time(record.primary_time))
        .single()
        .unwrap();
    let rendered = grid_instant
        .with_timezone(&viewer_zone)
        .format("%-I:%M %p")
        .to_string();
    assert_eq!(rendered, shown);
}

#[tokio::test]
async fn concurrent_commits_resolve_to_one_winner() {
    let ledger = Arc::new(InMemoryLedger::default());
    let day = working_day(1);

    let committer_a = BookingCommitter::new(ledger.clone());
    let committer_b = BookingCommitter::new(ledger);

    let mut session_a = session_at_committing(day, hour(14));
    let mut session_b = session_at_committing(day, hour(14));

    let (a, b) = tokio::join!(
        committer_a.commit(&mut session_a),
        committer_b.commit(&mut session_b),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);

    let conflict = if a.is_ok() { b.unwrap_err() } else { a.unwrap_err() };
    assert!(matches!(
        conflict,
        ScheduleError::SlotNoLongerAvailable { .. }
    ));

    // The losing session is back at slot selection, the winner finished.
    let phases = [session_a.phase(), session_b.phase()];
    assert!(phases.contains(&Phase::Succeeded));
    assert!(phases.contains(&Phase::AskingAlternateOffer));
}

#[tokio::test]
async fn conflicted_session_can_pick_another_slot_and_commit() {
    let ledger = Arc::new(InMemoryLedger::default());
    let committer = BookingCommitter::new(ledger.clone());
    let day = working_day(1);

    let mut winner = session_at_committing(day, hour(14));
    committer.commit(&mut winner).await.unwrap();

    let mut loser = session_at_committing(day, hour(14));
    let err = committer.commit(&mut loser).await.unwrap_err();
    assert!(matches!(err, ScheduleError::SlotNoLongerAvailable { .. }));
    assert_eq!(loser.phase(), Phase::AskingAlternateOffer);
    // Selections survived the failed commit.
    assert_eq!(loser.primary_time(), Some(hour(14)));

    // The UI refreshes the schedule, which now shows 14:00 taken; the
    // session forces a primary reselection and the retry lands elsewhere.
    let refreshed = taken_at(day, hour(14));
    assert!(loser.revalidate_time(&refreshed));
    assert_eq!(loser.phase(), Phase::ChoosingPrimaryTime);
    loser.select_time(hour(15)).unwrap();
    loser.decline_alternate().unwrap();
    committer.commit(&mut loser).await.unwrap();
    assert_eq!(loser.phase(), Phase::Succeeded);
}

#[tokio::test]
async fn write_error_maps_to_commit_failed_and_permits_retry() {
    let ledger = Arc::new(InMemoryLedger::default());
    ledger.set_failing(true);
    let committer = BookingCommitter::new(ledger.clone());

    let mut session = session_at_committing(working_day(1), hour(10));
    let err = committer.commit(&mut session).await.unwrap_err();
    assert!(matches!(err, ScheduleError::CommitFailed(_)));
    assert_eq!(session.phase(), Phase::AskingAlternateOffer);
    assert_eq!(session.primary_time(), Some(hour(10)));

    // The ledger recovers; declining again re-enters Committing and the
    // retry succeeds with the same selections.
    ledger.set_failing(false);
    session.decline_alternate().unwrap();
    committer.commit(&mut session).await.unwrap();
    assert_eq!(session.phase(), Phase::Succeeded);
}

#[tokio::test]
async fn completion_hook_fires_exactly_once() {
    let ledger = Arc::new(InMemoryLedger::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let committer = BookingCommitter::new(ledger)
        .with_completion_hook(Box::new(move |record| {
            assert_eq!(record.employee_id, "emp-7");
            seen.fetch_add(1, Ordering::SeqCst);
        }));

    let mut session = session_at_committing(working_day(1), hour(10));
    committer.commit(&mut session).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A second commit on a finished session is rejected and the hook does
    // not fire again.
    let err = committer.commit(&mut session).await.unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTransition { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn commit_is_rejected_outside_committing_phase() {
    let ledger = Arc::new(InMemoryLedger::default());
    let committer = BookingCommitter::new(ledger);

    let mut session = NegotiationSession::new(
        participants(),
        SessionPolicy::default(),
        OccupancyIndex::new(),
        "Asia/Kolkata",
    )
    .unwrap();

    let err = committer.commit(&mut session).await.unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTransition { .. }));
    assert_eq!(session.phase(), Phase::ChoosingPrimaryDate);
}
