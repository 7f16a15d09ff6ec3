//! [`Command`] for marking the chat of an [`Order`] as read.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{order, user, Message, Order},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for marking the chat of an [`Order`] as read.
///
/// Marks every [`Message`] the reader received on the [`Order`]; the
/// reader's own [`Message`]s are left for the counter-party to read.
/// Returns how many [`Message`]s were actually marked.
#[derive(Clone, Copy, Debug)]
pub struct MarkMessagesRead {
    /// [`order::Id`] of the [`Order`] whose chat is being read.
    pub order_id: order::Id,

    /// [`user::Id`] of the reading party.
    pub reader: user::Id,
}

impl<Db> Command<MarkMessagesRead> for Service<Db>
where
    Db: Database<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Message>, read::message::OfOrder>>,
            Ok = Vec<Message>,
            Err = Traced<database::Error>,
        > + Database<Update<Message>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkMessagesRead,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkMessagesRead { order_id, reader } = cmd;

        let order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if !order.is_party(reader) {
            return Err(tracerr::new!(E::NotParty(reader)));
        }

        let unread = self
            .database()
            .execute(Select(By::new(read::message::OfOrder(order_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|m| m.sender != reader && !m.read)
            .collect::<Vec<_>>();

        let mut marked = 0;
        for mut message in unread {
            message.read = true;
            self.database()
                .execute(Update(message))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            marked += 1;
        }

        Ok(marked)
    }
}

/// Error of [`MarkMessagesRead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Reader is not a party of the [`Order`].
    #[display("`User(id: {_0})` is not a party of the `Order`")]
    #[from(ignore)]
    NotParty(#[error(not(source))] user::Id),
}
