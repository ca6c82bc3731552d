use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/blocks", get(handlers::block::list_blocks))
        .route("/api/blocks", post(handlers::block::create_block))
        .route("/api/blocks", delete(handlers::block::delete_block))
}
