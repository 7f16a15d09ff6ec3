//! [`Message`]-related [`Database`] implementations.

use common::operations::{By, Insert, Reload, Select, Update};
use tracerr::Traced;

use crate::{
    domain::Message,
    infra::{
        database::{self, Json},
        Database,
    },
    read,
};

impl Database<Insert<Message>> for Json {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(message): Insert<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state().await;
        state.messages.items.push(message);
        state
            .persist_messages()
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Update<Message>> for Json {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(message): Update<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state().await;
        if let Some(slot) =
            state.messages.items.iter_mut().find(|m| m.id == message.id)
        {
            *slot = message;
        } else {
            state.messages.items.push(message);
        }
        state
            .persist_messages()
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Select<By<Vec<Message>, read::message::OfOrder>>> for Json {
    type Ok = Vec<Message>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Message>, read::message::OfOrder>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::message::OfOrder(order) = by.into_inner();

        let state = self.state().await;
        Ok(state
            .messages
            .items
            .iter()
            .filter(|m| m.order_id == order)
            .cloned()
            .collect())
    }
}

impl Database<Reload<Message>> for Json {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Reload<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state().await;
        state
            .reload_messages()
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}
