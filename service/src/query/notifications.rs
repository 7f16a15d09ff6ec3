//! [`Query`] collection related to [`Notification`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{user, Notification},
    infra::{database, Database},
    read, Service,
};

use super::{DatabaseQuery, Query};

/// Queries every [`Notification`] addressed to a recipient.
pub type OfRecipient =
    DatabaseQuery<By<Vec<Notification>, read::notification::OfRecipient>>;

/// Queries the number of unread [`Notification`]s addressed to a recipient.
#[derive(Clone, Copy, Debug)]
pub struct UnreadCount(pub user::Id);

impl<Db> Query<UnreadCount> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Notification>, read::notification::OfRecipient>>,
        Ok = Vec<Notification>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = usize;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        UnreadCount(recipient): UnreadCount,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(By::new(read::notification::OfRecipient(
                recipient,
            ))))
            .await
            .map_err(tracerr::wrap!())
            .map(|all| all.iter().filter(|n| !n.read).count())
    }
}
