//! [`Command`] for a fixer manually advancing an [`Order`].

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

/// [`Command`] for a fixer manually advancing an [`Order`] along the
/// escrow flow.
///
/// Only single steps are allowed, in order: [`ReadyPaid`] → [`EnRoute`] →
/// [`Arrived`] → [`InProgress`] → [`AwaitingRelease`].
///
/// [`Arrived`]: order::Status::Arrived
/// [`AwaitingRelease`]: order::Status::AwaitingRelease
/// [`EnRoute`]: order::Status::EnRoute
/// [`InProgress`]: order::Status::InProgress
/// [`ReadyPaid`]: order::Status::ReadyPaid
#[derive(Clone, Copy, Debug)]
pub struct AdvanceOrder {
    /// [`order::Id`] of the [`Order`] being advanced.
    pub order_id: order::Id,

    /// [`user::Id`] of the advancing fixer.
    pub fixer: user::Id,

    /// [`order::Status`] to advance to.
    pub to: order::Status,
}

impl<Db> Command<AdvanceOrder> for Service<Db>
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
        cmd: AdvanceOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AdvanceOrder {
            order_id,
            fixer,
            to,
        } = cmd;

        let mut order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if !order.is_fixer(fixer) {
            return Err(tracerr::new!(E::NotFixer(fixer)));
        }
        if order.status.manual_next() != Some(to) {
            return Err(tracerr::new!(E::InvalidTransition {
                from: order.status,
                to,
            }));
        }

        order.status = to;

        self.execute(UpdateOrder {
            order,
            notify: Notify::Auto,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`AdvanceOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the advanced [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Actor is not the assigned fixer of the [`Order`].
    #[display("`User(id: {_0})` is not the fixer of the `Order`")]
    #[from(ignore)]
    NotFixer(#[error(not(source))] user::Id),

    /// Requested step is not the next one.
    #[display("`Order` cannot move from `{from}` to `{to}`")]
    InvalidTransition {
        /// Current [`order::Status`] of the [`Order`].
        from: order::Status,

        /// Requested [`order::Status`].
        to: order::Status,
    },
}
