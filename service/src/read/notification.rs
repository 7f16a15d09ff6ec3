//! [`Notification`]-related read model definitions.

use crate::domain::user;

#[cfg(doc)]
use crate::domain::Notification;

/// Selector of every [`Notification`] addressed to a recipient.
#[derive(Clone, Copy, Debug)]
pub struct OfRecipient(pub user::Id);
