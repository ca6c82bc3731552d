//! # Negotiation Session Handlers
//!
//! One scheduling attempt is one session: the operator picks a primary date
//! and time, is offered a single alternate slot, and commits. Sessions live
//! in memory behind per-session locks; the phase machine inside
//! `NegotiationSession` decides which moves are legal, these handlers only
//! shuttle requests into it and regenerate slot listings when the date or
//! timezone changes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::errors::ScheduleError;
use slotbook_core::models::booking::{BookingRecord, Participants};
use slotbook_core::models::slot::{DaySchedule, OccupancyIndex};
use slotbook_core::session::{NegotiationSession, SessionSnapshot};

use crate::{ApiState, SharedSession, middleware::error_handling::AppError};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub client_id: String,
    pub client_name: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email: Option<String>,
    pub scheduled_by: String,
    pub client_user_id: String,
    pub client_user_email: String,
    /// Zone the session starts in; falls back to the server default.
    pub time_zone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SelectDateRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SelectTimeRequest {
    pub time: chrono::NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct AlternateOfferRequest {
    /// true accepts the one-time alternate offer, false declines it.
    pub offer: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChangeTimeZoneRequest {
    pub time_zone: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeTimeZoneResponse {
    pub session: SessionSnapshot,
    /// Set when the regenerated schedule invalidated a chosen time and the
    /// operator must reselect.
    pub reselection_required: bool,
    pub schedule: Option<DaySchedule>,
}

#[derive(Debug, Serialize)]
pub struct SlotsQueryResponse {
    pub schedule: DaySchedule,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub session: SessionSnapshot,
    pub booking: BookingRecord,
}

fn lookup(state: &ApiState, id: Uuid) -> Result<SharedSession, AppError> {
    let sessions = state.sessions.lock().expect("session map lock poisoned");
    sessions
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError(ScheduleError::NotFound(format!("Session {id} not found"))))
}

/// Build the occupancy snapshot for one employee from the ledger.
async fn occupancy_for(state: &ApiState, employee_id: &str) -> Result<OccupancyIndex, AppError> {
    let bookings = state.ledger.bookings_for_employee(employee_id).await?;
    Ok(OccupancyIndex::from_bookings(&bookings))
}

/// Open a new negotiation session for a (client, employee) pair.
#[axum::debug_handler]
pub async fn create_session(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, AppError> {
    let zone = payload
        .time_zone
        .unwrap_or_else(|| state.scheduling.default_zone.clone());

    let occupancy = occupancy_for(&state, &payload.employee_id).await?;

    let participants = Participants {
        client_id: payload.client_id,
        client_name: payload.client_name,
        employee_id: payload.employee_id,
        employee_name: payload.employee_name,
        employee_email: payload.employee_email,
        scheduled_by: payload.scheduled_by,
        client_user_id: payload.client_user_id,
        client_user_email: payload.client_user_email,
    };

    let session =
        NegotiationSession::new(participants, state.session_policy(), occupancy, &zone)?;
    let snapshot = SessionSnapshot::from(&session);

    let mut sessions = state.sessions.lock().expect("session map lock poisoned");
    sessions.insert(session.id, Arc::new(tokio::sync::Mutex::new(session)));

    Ok(Json(CreateSessionResponse { session: snapshot }))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = lookup(&state, id)?;
    let session = shared.lock().await;
    Ok(Json(SessionSnapshot::from(&*session)))
}

/// List the slots for a date in the session's active timezone. Defaults to
/// the date the session is currently negotiating.
#[axum::debug_handler]
pub async fn get_slots(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsQueryResponse>, AppError> {
    let shared = lookup(&state, id)?;
    let session = shared.lock().await;

    let date = query.date.or_else(|| session.active_date()).ok_or_else(|| {
        AppError(ScheduleError::Validation(
            "No date selected and none provided".to_string(),
        ))
    })?;

    let schedule = state
        .generator
        .generate(
            date,
            session.active_time_zone(),
            session.occupancy(),
            state.registry.as_ref(),
        )
        .await?;

    Ok(Json(SlotsQueryResponse { schedule }))
}

#[axum::debug_handler]
pub async fn select_date(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectDateRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;
    session.select_date(payload.date)?;
    Ok(Json(SessionSnapshot::from(&*session)))
}

#[axum::debug_handler]
pub async fn select_time(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectTimeRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;
    session.select_time(payload.time)?;
    Ok(Json(SessionSnapshot::from(&*session)))
}

/// Accept or decline the one-time alternate-slot offer.
#[axum::debug_handler]
pub async fn alternate_offer(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AlternateOfferRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;
    if payload.offer {
        session.accept_alternate()?;
    } else {
        session.decline_alternate()?;
    }
    Ok(Json(SessionSnapshot::from(&*session)))
}

/// Explicit "change date" while picking the alternate time.
#[axum::debug_handler]
pub async fn change_alternate_date(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;
    session.change_alternate_date()?;
    Ok(Json(SessionSnapshot::from(&*session)))
}

#[axum::debug_handler]
pub async fn confirm_alternate(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;
    session.confirm_alternate()?;
    Ok(Json(SessionSnapshot::from(&*session)))
}

/// Run the conditional commit. A conflict comes back as
/// `slot_no_longer_available` with the session returned to slot selection;
/// any other write failure as `commit_failed` with the session ready to
/// retry.
#[axum::debug_handler]
pub async fn commit(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommitResponse>, AppError> {
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;
    let booking = state.committer.commit(&mut session).await?;
    Ok(Json(CommitResponse {
        session: SessionSnapshot::from(&*session),
        booking,
    }))
}

/// Change the active timezone, regenerate the active day's schedule, and
/// report whether a chosen time was invalidated.
#[axum::debug_handler]
pub async fn change_time_zone(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeTimeZoneRequest>,
) -> Result<Json<ChangeTimeZoneResponse>, AppError> {
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;
    session.set_time_zone(&payload.time_zone)?;

    let (schedule, reselection_required) = match session.active_date() {
        Some(date) => {
            let schedule = state
                .generator
                .generate(
                    date,
                    session.active_time_zone(),
                    session.occupancy(),
                    state.registry.as_ref(),
                )
                .await?;
            let forced = session.revalidate_time(&schedule);
            (Some(schedule), forced)
        }
        None => (None, false),
    };

    Ok(Json(ChangeTimeZoneResponse {
        session: SessionSnapshot::from(&*session),
        reselection_required,
        schedule,
    }))
}

/// Start the session over with a fresh occupancy snapshot.
#[axum::debug_handler]
pub async fn restart(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;
    let employee_id = session.participants().employee_id.clone();
    let occupancy = occupancy_for(&state, &employee_id).await?;
    session.restart(occupancy)?;
    Ok(Json(SessionSnapshot::from(&*session)))
}

/// Abandon the session. Nothing durable was written before a successful
/// commit, so dropping it is the whole cleanup.
#[axum::debug_handler]
pub async fn abandon(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = {
        let mut sessions = state.sessions.lock().expect("session map lock poisoned");
        sessions.remove(&id)
    };
    if removed.is_none() {
        return Err(AppError(ScheduleError::NotFound(format!(
            "Session {id} not found"
        ))));
    }
    Ok(Json(serde_json::json!({ "abandoned": id })))
}
