//! # Slotbook Core
//!
//! Domain logic for the interview-slot scheduling service: the timezone
//! catalog, daily slot generation, the negotiation state machine that walks an
//! operator through choosing a primary slot and (at most once) an alternate
//! slot, and the committer that persists the resulting booking.
//!
//! This crate performs no I/O of its own. Persistence and the administrator
//! block list are reached through the async port traits in [`ports`], which
//! the db crate implements against PostgreSQL and tests implement with
//! in-memory fakes.

/// Static timezone catalog and zone resolution
pub mod catalog;
/// Booking commit with canonical-timezone normalization
pub mod committer;
/// Error taxonomy shared across the workspace
pub mod errors;
/// Domain value types
pub mod models;
/// Collaborator port traits (block registry, booking ledger)
pub mod ports;
/// Negotiation session and its phase machine
pub mod session;
/// Day-schedule slot generation
pub mod slots;
