//! Administrator blocked-slot handlers. Blocks are coarse date+hour markers
//! that make a slot unbookable for everyone; the generator reads them
//! through the block registry port.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use std::sync::Arc;

use slotbook_core::errors::ScheduleError;
use slotbook_db::models::DbBlockedSlot;

use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Deserialize)]
pub struct BlocksQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub created_by: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBlockQuery {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

fn validate_block_time(state: &ApiState, time: NaiveTime) -> Result<(), AppError> {
    if time.minute() != 0 || time.second() != 0 {
        return Err(AppError(ScheduleError::Validation(
            "Blocks are hour-aligned".to_string(),
        )));
    }
    if !state.scheduling.window.contains(time) {
        return Err(AppError(ScheduleError::Validation(format!(
            "{time} is outside the operating window"
        ))));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn list_blocks(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<BlocksQuery>,
) -> Result<Json<Vec<DbBlockedSlot>>, AppError> {
    let blocks =
        slotbook_db::repositories::block::get_blocked_slots_by_date(&state.db_pool, query.date)
            .await
            .map_err(ScheduleError::Database)?;
    Ok(Json(blocks))
}

#[axum::debug_handler]
pub async fn create_block(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBlockRequest>,
) -> Result<Json<DbBlockedSlot>, AppError> {
    validate_block_time(&state, payload.time)?;

    let block = slotbook_db::repositories::block::create_blocked_slot(
        &state.db_pool,
        payload.date,
        payload.time,
        &payload.created_by,
    )
    .await
    .map_err(ScheduleError::Database)?;

    Ok(Json(block))
}

#[axum::debug_handler]
pub async fn delete_block(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DeleteBlockQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = slotbook_db::repositories::block::delete_blocked_slot(
        &state.db_pool,
        query.date,
        query.time,
    )
    .await
    .map_err(ScheduleError::Database)?;

    if !removed {
        return Err(AppError(ScheduleError::NotFound(format!(
            "No block at {} {}",
            query.date, query.time
        ))));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
