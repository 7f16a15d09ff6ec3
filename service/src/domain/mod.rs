//! Domain model definitions.

pub mod message;
pub mod notification;
pub mod order;
pub mod safe_zone;
pub mod user;

pub use self::{
    message::Message, notification::Notification, order::Order,
    safe_zone::SafeZone, user::User,
};
