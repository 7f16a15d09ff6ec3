//! Read model definitions.

pub mod message;
pub mod notification;
pub mod order;
