//! [`Database`] operation implementations of the [`Json`] client.
//!
//! [`Database`]: crate::infra::Database
//! [`Json`]: super::Json

mod message;
mod notification;
mod order;
