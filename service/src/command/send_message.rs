//! [`Command`] for sending a chat [`Message`] on an [`Order`].
//!
//! [`Order`]: crate::domain::Order

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{message, notification, order, user, Message, Notification, Order},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for sending a chat [`Message`] on an [`Order`].
///
/// The counter-party, if there is one, is notified.
#[derive(Clone, Debug)]
pub struct SendMessage {
    /// [`order::Id`] of the [`Order`] the [`Message`] belongs to.
    pub order_id: order::Id,

    /// [`user::Id`] of the sending party.
    pub sender: user::Id,

    /// Content of the [`Message`].
    pub content: message::Content,
}

impl<Db> Command<SendMessage> for Service<Db>
where
    Db: Database<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<database::Error>,
        > + Database<Insert<Message>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Insert<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Message;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SendMessage,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SendMessage {
            order_id,
            sender,
            content,
        } = cmd;

        let order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if !order.is_party(sender) {
            return Err(tracerr::new!(E::NotParty(sender)));
        }

        let message = Message::new(order_id, sender, content);
        self.database()
            .execute(Insert(message.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if let Some(to) = order.counterparty_of(sender) {
            let text = self.users().get(sender).map_or_else(
                || "You have a new message on your order.".to_owned(),
                |u| format!("{} sent you a message on your order.", u.name),
            );
            self.database()
                .execute(Insert(Notification::new(
                    to,
                    notification::Kind::NewMessage,
                    "New message",
                    text,
                    Some(order_id),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        Ok(message)
    }
}

/// Error of [`SendMessage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Sender is not a party of the [`Order`].
    #[display("`User(id: {_0})` is not a party of the `Order`")]
    #[from(ignore)]
    NotParty(#[error(not(source))] user::Id),
}
