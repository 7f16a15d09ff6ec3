//! [`Order`]-related read model definitions.

use crate::domain::user;

#[cfg(doc)]
use crate::domain::Order;

/// Selector of every [`Order`] placed by a customer.
#[derive(Clone, Copy, Debug)]
pub struct OfCustomer(pub user::Id);

/// Selector of every [`Order`] assigned to a fixer.
#[derive(Clone, Copy, Debug)]
pub struct OfFixer(pub user::Id);

/// Selector of every stored [`Order`].
#[derive(Clone, Copy, Debug, Default)]
pub struct All;
