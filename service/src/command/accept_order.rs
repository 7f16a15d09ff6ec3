//! [`Command`] for a fixer claiming a [`Pending`] [`Order`].
//!
//! [`Pending`]: order::Status::Pending

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{order, user, Order},
    infra::{database, Database},
    Service,
};

use super::{
    update_order::{self, Notify, UpdateOrder},
    Command,
};

/// [`Command`] for a fixer claiming a [`Pending`] [`Order`].
///
/// [`Pending`]: order::Status::Pending
#[derive(Clone, Copy, Debug)]
pub struct AcceptOrder {
    /// [`order::Id`] of the [`Order`] being claimed.
    pub order_id: order::Id,

    /// [`user::Id`] of the claiming fixer.
    pub fixer_id: user::Id,
}

impl<Db> Command<AcceptOrder> for Service<Db>
where
    Db: Database<
        Select<By<Option<Order>, order::Id>>,
        Ok = Option<Order>,
        Err = Traced<database::Error>,
    >,
    Self: Command<
        UpdateOrder,
        Ok = Order,
        Err = Traced<update_order::ExecutionError>,
    >,
{
    type Ok = Order;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AcceptOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptOrder { order_id, fixer_id } = cmd;

        if !self.users().contains(fixer_id) {
            return Err(tracerr::new!(E::FixerNotExists(fixer_id)));
        }

        let mut order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if order.status != order::Status::Pending {
            return Err(tracerr::new!(E::NotPending(order.status)));
        }
        if order.fixer_id.is_some() {
            return Err(tracerr::new!(E::AlreadyClaimed));
        }
        if order.customer_id == fixer_id {
            return Err(tracerr::new!(E::OwnOrder));
        }

        order.fixer_id = Some(fixer_id);
        order.status = order::Status::Accepted;

        self.execute(UpdateOrder {
            order,
            notify: Notify::Auto,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`AcceptOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the claimed [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Fixer doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    FixerNotExists(#[error(not(source))] user::Id),

    /// [`Order`] is not [`Pending`].
    ///
    /// [`Pending`]: order::Status::Pending
    #[display("`Order` cannot be claimed in status `{_0}`")]
    #[from(ignore)]
    NotPending(#[error(not(source))] order::Status),

    /// [`Order`] already has an assigned fixer.
    #[display("`Order` is already claimed by another fixer")]
    AlreadyClaimed,

    /// Customers cannot claim their own [`Order`]s.
    #[display("customers cannot claim their own `Order`s")]
    OwnOrder,
}
