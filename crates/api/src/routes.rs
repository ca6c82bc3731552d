/// Administrator blocked-slot endpoints
pub mod block;
/// Health check endpoints
pub mod health;
/// Negotiation session endpoints
pub mod session;
/// Timezone catalog endpoints
pub mod timezone;
