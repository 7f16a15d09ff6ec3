//! [`Query`] collection related to [`Message`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{order, user, Message},
    infra::{database, Database},
    read, Service,
};

use super::{DatabaseQuery, Query};

/// Queries every [`Message`] exchanged on an [`Order`].
///
/// [`Order`]: crate::domain::Order
pub type OfOrder = DatabaseQuery<By<Vec<Message>, read::message::OfOrder>>;

/// Queries the number of [`Message`]s a party has not read yet on an
/// [`Order`]'s chat.
///
/// The reader's own [`Message`]s are never counted.
///
/// [`Order`]: crate::domain::Order
#[derive(Clone, Copy, Debug)]
pub struct UnreadCount {
    /// [`order::Id`] of the [`Order`] whose chat is counted.
    pub order_id: order::Id,

    /// [`user::Id`] of the reading party.
    pub reader: user::Id,
}

impl<Db> Query<UnreadCount> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Message>, read::message::OfOrder>>,
        Ok = Vec<Message>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = usize;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        UnreadCount { order_id, reader }: UnreadCount,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(By::new(read::message::OfOrder(order_id))))
            .await
            .map_err(tracerr::wrap!())
            .map(|all| {
                all.iter().filter(|m| m.sender != reader && !m.read).count()
            })
    }
}
