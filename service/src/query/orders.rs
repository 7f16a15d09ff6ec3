//! [`Query`] collection related to the multiple [`Order`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Order, read};

use super::DatabaseQuery;

/// Queries every [`Order`] placed by a customer.
pub type OfCustomer = DatabaseQuery<By<Vec<Order>, read::order::OfCustomer>>;

/// Queries every [`Order`] assigned to a fixer.
pub type OfFixer = DatabaseQuery<By<Vec<Order>, read::order::OfFixer>>;

/// Queries every stored [`Order`].
pub type All = DatabaseQuery<By<Vec<Order>, read::order::All>>;
