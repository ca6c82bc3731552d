//! # Slotbook API
//!
//! Web server for the interview-slot scheduling service. It exposes the
//! negotiation session lifecycle (create, pick dates and times, negotiate an
//! alternate, commit), slot listings, the timezone catalog, and the
//! administrator block list.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Error mapping shared across endpoints
//! - **Config**: Handle environment and application configuration
//!
//! Negotiation sessions are held in memory: nothing durable exists before a
//! successful commit, so an abandoned or lost session needs no cleanup
//! beyond dropping it. Each session sits behind its own async mutex, which
//! serializes transitions and queues re-entrant calls behind the in-flight
//! outcome.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use slotbook_core::committer::BookingCommitter;
use slotbook_core::ports::{BlockRegistry, BookingLedger};
use slotbook_core::session::{NegotiationSession, SessionPolicy};
use slotbook_core::slots::SlotGenerator;
use slotbook_db::adapters::{PgBlockRegistry, PgBookingLedger};

use crate::config::SchedulingConfig;

/// One stored session behind its own lock.
pub type SharedSession = Arc<tokio::sync::Mutex<NegotiationSession>>;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Scheduling rules applied to every session
    pub scheduling: SchedulingConfig,
    /// In-memory negotiation sessions, one lock per session
    pub sessions: Mutex<HashMap<Uuid, SharedSession>>,
    /// Durable booking store
    pub ledger: Arc<dyn BookingLedger>,
    /// Administrator block list
    pub registry: Arc<dyn BlockRegistry>,
    /// Day-schedule generator
    pub generator: SlotGenerator,
    /// Booking commit path
    pub committer: BookingCommitter,
}

impl ApiState {
    /// Wire the state against PostgreSQL-backed collaborators.
    pub fn new(db_pool: PgPool, scheduling: SchedulingConfig) -> Result<Self> {
        let ledger: Arc<dyn BookingLedger> = Arc::new(PgBookingLedger::new(
            db_pool.clone(),
            scheduling.db_call_timeout,
        ));
        let registry: Arc<dyn BlockRegistry> = Arc::new(PgBlockRegistry::new(
            db_pool.clone(),
            scheduling.db_call_timeout,
        ));
        Self::with_collaborators(db_pool, scheduling, ledger, registry)
    }

    /// Wire the state against explicit collaborators (tests swap in fakes).
    pub fn with_collaborators(
        db_pool: PgPool,
        scheduling: SchedulingConfig,
        ledger: Arc<dyn BookingLedger>,
        registry: Arc<dyn BlockRegistry>,
    ) -> Result<Self> {
        let canonical_zone = slotbook_core::catalog::resolve(&scheduling.canonical_zone)
            .map_err(|e| eyre::eyre!(e.to_string()))?;
        let generator = SlotGenerator::new(scheduling.window, canonical_zone);
        let committer = BookingCommitter::new(ledger.clone())
            .with_completion_hook(Box::new(|record| {
                info!(
                    booking_id = %record.id,
                    employee_id = %record.employee_id,
                    client_id = %record.client_id,
                    "scheduling session completed"
                );
            }));

        Ok(Self {
            db_pool,
            scheduling,
            sessions: Mutex::new(HashMap::new()),
            ledger,
            registry,
            generator,
            committer,
        })
    }

    /// The session policy every new session starts from.
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            window: self.scheduling.window,
            non_working_days: self.scheduling.non_working_days.clone(),
        }
    }
}

/// Starts the API server with the provided configuration and database connection
///
/// Initializes logging, builds the router and shared state, and serves until
/// shutdown.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState::new(db_pool, config.scheduling.clone())?);

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Timezone catalog endpoints
        .merge(routes::timezone::routes())
        // Negotiation session endpoints
        .merge(routes::session::routes())
        // Administrator block endpoints
        .merge(routes::block::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .map(|origin| origin.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
