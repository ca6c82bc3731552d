pub mod block;
pub mod booking;
