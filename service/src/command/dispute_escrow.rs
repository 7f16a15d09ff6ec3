//! [`Command`] for disputing an [`Order`] instead of releasing escrow.

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

/// [`Command`] for disputing an [`Order`] instead of releasing escrow.
///
/// Only the customer may dispute: it is the counterpart of the release
/// decision. The [`Order`] is handed over to support and frozen: the
/// escrowed money stays held until the dispute is resolved outside the
/// system.
#[derive(Clone, Copy, Debug)]
pub struct DisputeEscrow {
    /// [`order::Id`] of the [`Order`] being disputed.
    pub order_id: order::Id,

    /// [`user::Id`] of the disputing customer.
    pub customer: user::Id,
}

impl<Db> Command<DisputeEscrow> for Service<Db>
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
        cmd: DisputeEscrow,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DisputeEscrow { order_id, customer } = cmd;

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
        if order.status != order::Status::AwaitingRelease {
            return Err(tracerr::new!(E::NotDisputable(order.status)));
        }

        // Escrow is left untouched: support resolves where it goes.
        order.status = order::Status::Escalated;

        self.execute(UpdateOrder {
            order,
            notify: Notify::Auto,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`DisputeEscrow`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the disputed [`Order`] failed.
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

    /// [`Order`] is not awaiting an escrow release.
    #[display("`Order` cannot be disputed in status `{_0}`")]
    #[from(ignore)]
    NotDisputable(#[error(not(source))] order::Status),
}
