//! [`Command`] for releasing escrowed money to the fixer.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        order::{self, payment},
        user, Order,
    },
    infra::{database, Database},
    Service,
};

use super::{
    update_order::{self, Notify, UpdateOrder},
    Command,
};

/// [`Command`] for releasing escrowed money to the fixer.
///
/// Requires an explicit confirmation flag: release is irreversible and
/// completes the [`Order`].
#[derive(Clone, Copy, Debug)]
pub struct ReleaseEscrow {
    /// [`order::Id`] of the [`Order`] being completed.
    pub order_id: order::Id,

    /// [`user::Id`] of the releasing customer.
    pub customer: user::Id,

    /// Whether the customer has explicitly confirmed the release.
    pub confirmed: bool,
}

impl<Db> Command<ReleaseEscrow> for Service<Db>
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
        cmd: ReleaseEscrow,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReleaseEscrow {
            order_id,
            customer,
            confirmed,
        } = cmd;

        if !confirmed {
            return Err(tracerr::new!(E::NotConfirmed));
        }

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
            return Err(tracerr::new!(E::NotReleasable(order.status)));
        }
        let Some(pay) = order.payment.as_mut() else {
            return Err(tracerr::new!(E::NothingEscrowed));
        };
        if pay.status != payment::Status::Escrowed {
            return Err(tracerr::new!(E::AlreadyReleased));
        }

        pay.status = payment::Status::Released;
        pay.released_at = Some(payment::ReleaseDateTime::now());
        order.status = order::Status::PaidCompleted;
        order.completed_at = Some(order::CompletionDateTime::now());

        self.execute(UpdateOrder {
            order,
            notify: Notify::Auto,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`ReleaseEscrow`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the completed [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Release was not explicitly confirmed.
    #[display("escrow release requires explicit confirmation")]
    NotConfirmed,

    /// Actor is not the customer of the [`Order`].
    #[display("`User(id: {_0})` is not the customer of the `Order`")]
    #[from(ignore)]
    NotCustomer(#[error(not(source))] user::Id),

    /// [`Order`] is not awaiting an escrow release.
    #[display("escrow cannot be released in status `{_0}`")]
    #[from(ignore)]
    NotReleasable(#[error(not(source))] order::Status),

    /// [`Order`] holds no escrowed payment.
    #[display("`Order` holds no escrowed payment")]
    NothingEscrowed,

    /// Escrow was already released.
    #[display("escrow is already released")]
    AlreadyReleased,
}
