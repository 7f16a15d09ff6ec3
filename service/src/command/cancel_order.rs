//! [`Command`] for a customer cancelling an [`Order`].

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

/// [`Command`] for a customer cancelling an [`Order`].
///
/// Possible at any point before the [`Order`] reaches a terminal status.
#[derive(Clone, Copy, Debug)]
pub struct CancelOrder {
    /// [`order::Id`] of the [`Order`] being cancelled.
    pub order_id: order::Id,

    /// [`user::Id`] of the cancelling customer.
    pub customer: user::Id,
}

impl<Db> Command<CancelOrder> for Service<Db>
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
        cmd: CancelOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelOrder { order_id, customer } = cmd;

        let mut order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if !order.is_customer(customer) {
            return Err(tracerr::new!(E::NotCustomer(customer)));
        }
        if !order.status.is_cancellable() {
            return Err(tracerr::new!(E::NotCancellable(order.status)));
        }

        order.status = order::Status::Cancelled;

        self.execute(UpdateOrder {
            order,
            notify: Notify::Auto,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`CancelOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the cancelled [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Actor is not the customer of the [`Order`].
    #[display("`User(id: {_0})` is not the customer of the `Order`")]
    #[from(ignore)]
    NotCustomer(#[error(not(source))] user::Id),

    /// [`Order`] has already reached a terminal status.
    #[display("`Order` cannot be cancelled in status `{_0}`")]
    #[from(ignore)]
    NotCancellable(#[error(not(source))] order::Status),
}
