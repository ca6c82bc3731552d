//! # API Configuration Module
//!
//! Loads configuration for the Slotbook API server from environment
//! variables, with defaults where a value is optional.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: bind address (default: "0.0.0.0")
//! - `API_PORT`: listen port (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: request timeout (default: 30)
//! - `SLOT_WINDOW_START_HOUR` / `SLOT_WINDOW_END_HOUR`: inclusive daily
//!   operating window (default: 9..=21)
//! - `NON_WORKING_DAYS`: comma-separated weekday names never open for
//!   scheduling (default: "sunday")
//! - `CANONICAL_TIMEZONE`: reference zone bookings are normalized to
//!   (default: "Asia/Kolkata")
//! - `DEFAULT_TIMEZONE`: zone new sessions start in (default: canonical)
//! - `DB_CALL_TIMEOUT_SECONDS`: upper bound on individual ledger/registry
//!   calls (default: 5)

use chrono::Weekday;
use eyre::{Result, WrapErr, eyre};
use slotbook_core::models::slot::OperatingWindow;
use std::env;
use std::time::Duration;
use tracing::Level;

/// Configuration for the Slotbook API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Scheduling rules and timezone anchors
    pub scheduling: SchedulingConfig,
}

/// Scheduling rules shared by every session the server creates
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Inclusive daily hour range eligible for booking
    pub window: OperatingWindow,

    /// Weekdays never open for scheduling
    pub non_working_days: Vec<Weekday>,

    /// Reference zone used for canonical booking times and the slot grid
    pub canonical_zone: String,

    /// Zone a new session starts in when the request names none
    pub default_zone: String,

    /// Upper bound on individual database calls
    pub db_call_timeout: Duration,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - The operating window or timezone values are invalid
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            scheduling: SchedulingConfig::from_env()?,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SchedulingConfig {
    pub fn from_env() -> Result<Self> {
        let start_hour = env::var("SLOT_WINDOW_START_HOUR")
            .unwrap_or_else(|_| "9".to_string())
            .parse()
            .wrap_err("Invalid SLOT_WINDOW_START_HOUR value")?;
        let end_hour = env::var("SLOT_WINDOW_END_HOUR")
            .unwrap_or_else(|_| "21".to_string())
            .parse()
            .wrap_err("Invalid SLOT_WINDOW_END_HOUR value")?;
        let window = OperatingWindow::new(start_hour, end_hour).map_err(|e| eyre!(e))?;

        let non_working_days = env::var("NON_WORKING_DAYS")
            .unwrap_or_else(|_| "sunday".to_string())
            .split(',')
            .map(parse_weekday)
            .collect::<Result<Vec<_>>>()?;

        let canonical_zone =
            env::var("CANONICAL_TIMEZONE").unwrap_or_else(|_| "Asia/Kolkata".to_string());
        slotbook_core::catalog::resolve(&canonical_zone)
            .map_err(|_| eyre!("Invalid CANONICAL_TIMEZONE value: {canonical_zone}"))?;

        let default_zone = env::var("DEFAULT_TIMEZONE").unwrap_or_else(|_| canonical_zone.clone());
        slotbook_core::catalog::resolve(&default_zone)
            .map_err(|_| eyre!("Invalid DEFAULT_TIMEZONE value: {default_zone}"))?;

        let db_call_timeout = env::var("DB_CALL_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map(Duration::from_secs)
            .wrap_err("Invalid DB_CALL_TIMEOUT_SECONDS value")?;

        Ok(Self {
            window,
            non_working_days,
            canonical_zone,
            default_zone,
            db_call_timeout,
        })
    }
}

fn parse_weekday(name: &str) -> Result<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        other => Err(eyre!("Unknown weekday in NON_WORKING_DAYS: {other}")),
    }
}
