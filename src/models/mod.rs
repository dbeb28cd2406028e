pub mod conversation;
pub mod intent;
pub mod notice;
pub mod reservation;

pub use conversation::{Conversation, ConversationMessage};
pub use intent::{BookingData, Intent};
pub use notice::{RefreshNotice, RefreshReason};
pub use reservation::{NewReservation, Reservation, ReservationPatch, ReservationStatus};
