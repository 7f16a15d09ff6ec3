//! [`Command`] for persisting a changed [`Order`].

use common::operations::{By, Insert, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{notification, order, Notification, Order},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] persisting a changed [`Order`].
///
/// The single write path of changed [`Order`]s: stamps the update time,
/// persists the new state, and fires the canned [`Notification`] of the
/// newly entered status.
#[derive(Clone, Debug)]
pub struct UpdateOrder {
    /// New state of the [`Order`].
    pub order: Order,

    /// Whether the status-change [`Notification`] should be fired.
    pub notify: Notify,
}

/// Notification behavior of an [`UpdateOrder`] [`Command`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Notify {
    /// Fire the canned [`Notification`] if the status has changed.
    #[default]
    Auto,

    /// Fire nothing: the caller delivers its own wording.
    Suppress,
}

impl<Db> Command<UpdateOrder> for Service<Db>
where
    Db: Database<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<database::Error>,
        > + Database<Update<Order>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Insert<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Order;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateOrder { mut order, notify } = cmd;

        let current = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order.id))
            .map_err(tracerr::wrap!())?;

        order.updated_at = order::UpdateDateTime::now();
        self.database()
            .execute(Update(order.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if notify == Notify::Auto && order.status != current.status {
            let fired = notification::on_status(order.status)
                .and_then(|tpl| {
                    tpl.recipient.resolve(&order).map(|to| (tpl, to))
                });
            if let Some((tpl, to)) = fired {
                self.database()
                    .execute(Insert(Notification::new(
                        to,
                        tpl.kind,
                        tpl.title,
                        tpl.message,
                        Some(order.id),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }
        }

        Ok(order)
    }
}

/// Error of [`UpdateOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),
}
