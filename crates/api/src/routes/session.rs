use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/sessions", post(handlers::session::create_session))
        .route("/api/sessions/:id", get(handlers::session::get_session))
        .route("/api/sessions/:id", delete(handlers::session::abandon))
        .route("/api/sessions/:id/slots", get(handlers::session::get_slots))
        .route("/api/sessions/:id/date", post(handlers::session::select_date))
        .route("/api/sessions/:id/time", post(handlers::session::select_time))
        .route(
            "/api/sessions/:id/alternate",
            post(handlers::session::alternate_offer),
        )
        .route(
            "/api/sessions/:id/alternate/change-date",
            post(handlers::session::change_alternate_date),
        )
        .route(
            "/api/sessions/:id/confirm",
            post(handlers::session::confirm_alternate),
        )
        .route("/api/sessions/:id/commit", post(handlers::session::commit))
        .route(
            "/api/sessions/:id/timezone",
            post(handlers::session::change_time_zone),
        )
        .route(
            "/api/sessions/:id/restart",
            post(handlers::session::restart),
        )
}
