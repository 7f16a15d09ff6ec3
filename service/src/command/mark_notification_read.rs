//! [`Command`] for marking a [`Notification`] as read.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{notification, user, Notification},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Notification`] as read.
///
/// Idempotent: re-reading an already read [`Notification`] is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct MarkNotificationRead {
    /// [`notification::Id`] of the [`Notification`] being read.
    pub notification_id: notification::Id,

    /// [`user::Id`] of the reading recipient.
    pub recipient: user::Id,
}

impl<Db> Command<MarkNotificationRead> for Service<Db>
where
    Db: Database<
            Select<By<Option<Notification>, notification::Id>>,
            Ok = Option<Notification>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkNotificationRead,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkNotificationRead {
            notification_id,
            recipient,
        } = cmd;

        let mut notification = self
            .database()
            .execute(Select(By::<Option<Notification>, _>::new(
                notification_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotificationNotExists(notification_id))
            .map_err(tracerr::wrap!())?;

        if notification.recipient != recipient {
            return Err(tracerr::new!(E::NotRecipient(recipient)));
        }
        if notification.read {
            return Ok(());
        }

        notification.read = true;
        self.database()
            .execute(Update(notification))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`MarkNotificationRead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Notification`] doesn't exist.
    #[display("`Notification(id: {_0})` does not exist")]
    #[from(ignore)]
    NotificationNotExists(#[error(not(source))] notification::Id),

    /// Actor is not the recipient of the [`Notification`].
    #[display("`User(id: {_0})` is not the recipient of the `Notification`")]
    #[from(ignore)]
    NotRecipient(#[error(not(source))] user::Id),
}
