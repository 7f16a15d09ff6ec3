//! [`Command`] for marking every [`Notification`] of a recipient as read.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, Notification},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for marking every [`Notification`] of a recipient as read.
///
/// Returns how many [`Notification`]s were actually marked.
#[derive(Clone, Copy, Debug)]
pub struct MarkAllNotificationsRead {
    /// [`user::Id`] of the reading recipient.
    pub recipient: user::Id,
}

impl<Db> Command<MarkAllNotificationsRead> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Notification>, read::notification::OfRecipient>>,
            Ok = Vec<Notification>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkAllNotificationsRead,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkAllNotificationsRead { recipient } = cmd;

        let unread = self
            .database()
            .execute(Select(By::new(read::notification::OfRecipient(
                recipient,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|n| !n.read)
            .collect::<Vec<_>>();

        let mut marked = 0;
        for mut notification in unread {
            notification.read = true;
            self.database()
                .execute(Update(notification))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            marked += 1;
        }

        Ok(marked)
    }
}

/// Error of [`MarkAllNotificationsRead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
