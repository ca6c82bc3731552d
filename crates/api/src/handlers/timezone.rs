use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::sync::Arc;

use slotbook_core::catalog;
use slotbook_core::errors::ScheduleError;

use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Serialize)]
pub struct RegionResponse {
    pub name: &'static str,
    pub zones: Vec<catalog::ZoneEntry>,
}

/// The full region catalog with the zones listed under each.
#[axum::debug_handler]
pub async fn list_regions(
    State(_state): State<Arc<ApiState>>,
) -> Json<Vec<RegionResponse>> {
    let regions = catalog::regions()
        .map(|region| RegionResponse {
            name: region.name,
            zones: region.zones.to_vec(),
        })
        .collect();
    Json(regions)
}

/// The zones listed for one region.
#[axum::debug_handler]
pub async fn list_zones(
    State(_state): State<Arc<ApiState>>,
    Path(region): Path<String>,
) -> Result<Json<Vec<catalog::ZoneEntry>>, AppError> {
    let zones = catalog::zones_in(&region).ok_or_else(|| {
        AppError(ScheduleError::NotFound(format!(
            "Region {region} not found"
        )))
    })?;
    Ok(Json(zones.to_vec()))
}
