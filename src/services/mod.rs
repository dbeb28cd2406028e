pub mod ai;
pub mod bridge;
pub mod conversation;
pub mod reservations;
