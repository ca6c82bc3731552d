use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/timezones", get(handlers::timezone::list_regions))
        .route(
            "/api/timezones/:region",
            get(handlers::timezone::list_zones),
        )
}
