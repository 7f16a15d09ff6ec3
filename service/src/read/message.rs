//! [`Message`]-related read model definitions.

use crate::domain::order;

#[cfg(doc)]
use crate::domain::Message;

/// Selector of every [`Message`] exchanged on an [`Order`].
///
/// [`Order`]: crate::domain::Order
#[derive(Clone, Copy, Debug)]
pub struct OfOrder(pub order::Id);
