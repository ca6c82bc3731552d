use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use pretty_assertions::assert_eq;
use slotbook_core::errors::ScheduleError;
use slotbook_core::models::booking::Participants;
use slotbook_core::models::slot::{DaySchedule, OccupancyIndex, Slot};
use slotbook_core::session::{NegotiationSession, Phase, SessionPolicy, SessionSnapshot};

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn participants() -> Participants {
    Participants {
        client_id: "client-1".to_string(),
        client_name: "Acme Corp".to_string(),
        employee_id: "emp-7".to_string(),
        employee_name: "Priya Nair".to_string(),
        employee_email: Some("priya@example.com".to_string()),
        scheduled_by: "ops-user".to_string(),
        client_user_id: "cu-42".to_string(),
        client_user_email: "ops@acme.example".to_string(),
    }
}

fn session() -> NegotiationSession {
    NegotiationSession::new(
        participants(),
        SessionPolicy::default(),
        OccupancyIndex::new(),
        "Asia/Kolkata",
    )
    .unwrap()
}

/// A date at least `weeks` weeks out that is not a Sunday, so it passes the
/// disabled-date predicate regardless of when the test runs.
fn working_day(weeks: i64) -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(7 * weeks);
    while day.weekday() == Weekday::Sun {
        day += Duration::days(1);
    }
    day
}

fn schedule_with(date: NaiveDate, unavailable: NaiveTime) -> DaySchedule {
    let slots = (9..=21)
        .map(|h| Slot {
            system_time: hour(h),
            display_time: format!("{h}:00"),
            is_available: hour(h) != unavailable,
        })
        .collect();
    DaySchedule {
        date,
        time_zone: "Asia/Kolkata".to_string(),
        slots,
        degraded: false,
    }
}

#[test]
fn primary_path_with_declined_alternate() {
    let mut session = session();
    assert_eq!(session.phase(), Phase::ChoosingPrimaryDate);

    session.select_date(working_day(1)).unwrap();
    assert_eq!(session.phase(), Phase::ChoosingPrimaryTime);

    session.select_time(hour(10)).unwrap();
    assert_eq!(session.phase(), Phase::AskingAlternateOffer);
    assert!(!session.alternate_offered());

    session.decline_alternate().unwrap();
    assert_eq!(session.phase(), Phase::Committing);
    assert_eq!(session.alternate_date(), None);
    assert_eq!(session.alternate_time(), None);
}

#[test]
fn alternate_path_reaches_confirmation() {
    let mut session = session();
    session.select_date(working_day(1)).unwrap();
    session.select_time(hour(10)).unwrap();

    session.accept_alternate().unwrap();
    assert!(session.alternate_offered());
    assert_eq!(session.phase(), Phase::ChoosingAlternateDate);

    session.select_date(working_day(2)).unwrap();
    assert_eq!(session.phase(), Phase::ChoosingAlternateTime);

    session.select_time(hour(11)).unwrap();
    assert_eq!(session.phase(), Phase::ConfirmingAlternate);

    session.confirm_alternate().unwrap();
    assert_eq!(session.phase(), Phase::Committing);
    assert_eq!(session.alternate_time(), Some(hour(11)));
}

#[test]
fn change_date_backs_out_of_alternate_time() {
    let mut session = session();
    session.select_date(working_day(1)).unwrap();
    session.select_time(hour(10)).unwrap();
    session.accept_alternate().unwrap();
    session.select_date(working_day(2)).unwrap();

    session.change_alternate_date().unwrap();
    assert_eq!(session.phase(), Phase::ChoosingAlternateDate);
    assert_eq!(session.alternate_date(), None);
    // The primary selection is untouched.
    assert_eq!(session.primary_time(), Some(hour(10)));
}

#[test]
fn alternate_offer_is_one_shot() {
    let mut session = session();
    session.select_date(working_day(1)).unwrap();
    session.select_time(hour(10)).unwrap();
    session.accept_alternate().unwrap();
    session.select_date(working_day(2)).unwrap();
    session.select_time(hour(11)).unwrap();

    // A timezone-change revalidation knocks out the primary time.
    let schedule = schedule_with(session.primary_date().unwrap(), hour(10));
    assert!(session.revalidate_time(&schedule));
    assert_eq!(session.phase(), Phase::ChoosingPrimaryTime);

    // Reselecting the primary time skips the offer prompt entirely.
    session.select_time(hour(12)).unwrap();
    assert_eq!(session.phase(), Phase::Committing);
    assert!(session.alternate_offered());
}

#[test]
fn illegal_moves_are_rejected_without_state_change() {
    let mut session = session();

    let err = session.select_time(hour(10)).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTransition { .. }));
    assert_eq!(session.phase(), Phase::ChoosingPrimaryDate);

    let err = session.decline_alternate().unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTransition { .. }));

    let err = session.confirm_alternate().unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTransition { .. }));

    let err = session.change_alternate_date().unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTransition { .. }));
}

#[test]
fn past_dates_are_not_selectable() {
    let mut session = session();
    let last_week = Utc::now().date_naive() - Duration::days(7);

    let err = session.select_date(last_week).unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));
    assert_eq!(session.phase(), Phase::ChoosingPrimaryDate);
}

#[test]
fn non_working_days_are_not_selectable() {
    let mut session = session();
    let mut sunday = Utc::now().date_naive() + Duration::days(7);
    while sunday.weekday() != Weekday::Sun {
        sunday += Duration::days(1);
    }

    let err = session.select_date(sunday).unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));
}

#[test]
fn fully_occupied_date_is_not_selectable() {
    let day = working_day(1);
    let mut occupancy = OccupancyIndex::new();
    for h in 9..=21 {
        occupancy.insert(day, hour(h));
    }
    let mut session = NegotiationSession::new(
        participants(),
        SessionPolicy::default(),
        occupancy,
        "Asia/Kolkata",
    )
    .unwrap();

    let err = session.select_date(day).unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));

    // A partially booked date stays selectable.
    session = session_with_one_booking(day);
    session.select_date(day).unwrap();
    assert_eq!(session.phase(), Phase::ChoosingPrimaryTime);
}

fn session_with_one_booking(day: NaiveDate) -> NegotiationSession {
    let mut occupancy = OccupancyIndex::new();
    occupancy.insert(day, hour(14));
    NegotiationSession::new(
        participants(),
        SessionPolicy::default(),
        occupancy,
        "Asia/Kolkata",
    )
    .unwrap()
}

#[test]
fn times_outside_the_window_are_rejected() {
    let mut session = session();
    session.select_date(working_day(1)).unwrap();

    let err = session.select_time(hour(8)).unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));
    let err = session.select_time(hour(22)).unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));

    session.select_time(hour(9)).unwrap();
    assert_eq!(session.phase(), Phase::AskingAlternateOffer);
}

#[test]
fn timezone_change_is_validated_and_keeps_prior_zone_on_error() {
    let mut session = session();

    let err = session.set_time_zone("Not/AZone").unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTimeZone(_)));
    assert_eq!(session.active_time_zone(), "Asia/Kolkata");

    session.set_time_zone("America/New_York").unwrap();
    assert_eq!(session.active_time_zone(), "America/New_York");
}

#[test]
fn revalidation_leaves_available_selections_alone() {
    let mut session = session();
    session.select_date(working_day(1)).unwrap();
    session.select_time(hour(10)).unwrap();

    let schedule = schedule_with(session.primary_date().unwrap(), hour(15));
    assert!(!session.revalidate_time(&schedule));
    assert_eq!(session.phase(), Phase::AskingAlternateOffer);
    assert_eq!(session.primary_time(), Some(hour(10)));
}

#[test]
fn revalidation_forces_alternate_reselection() {
    let mut session = session();
    session.select_date(working_day(1)).unwrap();
    session.select_time(hour(10)).unwrap();
    session.accept_alternate().unwrap();
    session.select_date(working_day(2)).unwrap();
    session.select_time(hour(11)).unwrap();

    let schedule = schedule_with(session.alternate_date().unwrap(), hour(11));
    assert!(session.revalidate_time(&schedule));
    assert_eq!(session.phase(), Phase::ChoosingAlternateTime);
    assert_eq!(session.alternate_time(), None);
}

#[test]
fn restart_clears_everything_including_the_latch() {
    let mut session = session();
    session.select_date(working_day(1)).unwrap();
    session.select_time(hour(10)).unwrap();
    session.accept_alternate().unwrap();

    session.restart(OccupancyIndex::new()).unwrap();
    assert_eq!(session.phase(), Phase::ChoosingPrimaryDate);
    assert_eq!(session.primary_date(), None);
    assert_eq!(session.primary_time(), None);
    assert_eq!(session.alternate_date(), None);
    assert!(!session.alternate_offered());
}

#[test]
fn snapshot_reflects_session_state() {
    let mut session = session();
    let day = working_day(1);
    session.select_date(day).unwrap();
    session.select_time(hour(10)).unwrap();

    let snapshot = SessionSnapshot::from(&session);
    assert_eq!(snapshot.phase, Phase::AskingAlternateOffer);
    assert_eq!(snapshot.primary_date, Some(day));
    assert_eq!(snapshot.primary_time, Some(hour(10)));
    assert!(!snapshot.alternate_offered);

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("AskingAlternateOffer"));
}

#[test]
fn invalid_default_zone_is_rejected_at_creation() {
    let err = NegotiationSession::new(
        participants(),
        SessionPolicy::default(),
        OccupancyIndex::new(),
        "Pluto/Underworld",
    )
    .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTimeZone(_)));
}

#[test]
fn active_date_tracks_the_phase() {
    let mut session = session();
    let primary = working_day(1);
    let alternate = working_day(2);

    assert_eq!(session.active_date(), None);
    session.select_date(primary).unwrap();
    assert_eq!(session.active_date(), Some(primary));

    session.select_time(hour(10)).unwrap();
    session.accept_alternate().unwrap();
    // No alternate date picked yet; fall back to the primary.
    assert_eq!(session.active_date(), Some(primary));

    session.select_date(alternate).unwrap();
    assert_eq!(session.active_date(), Some(alternate));
}
