/// Administrator blocked-slot handlers
pub mod block;
/// Negotiation session handlers
pub mod session;
/// Timezone catalog handlers
pub mod timezone;
