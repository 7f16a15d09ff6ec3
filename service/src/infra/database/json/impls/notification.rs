//! [`Notification`]-related [`Database`] implementations.

use common::operations::{By, Insert, Reload, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{notification, Notification},
    infra::{
        database::{self, Json},
        Database,
    },
    read,
};

impl Database<Insert<Notification>> for Json
where
    Self: Database<
        Update<Notification>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(notification))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Update<Notification>> for Json {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(notification): Update<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state().await;
        if let Some(slot) = state
            .notifications
            .items
            .iter_mut()
            .find(|n| n.id == notification.id)
        {
            *slot = notification;
        } else {
            state.notifications.items.push(notification);
        }
        state
            .persist_notifications()
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Select<By<Option<Notification>, notification::Id>>> for Json {
    type Ok = Option<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Notification>, notification::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let state = self.state().await;
        Ok(state
            .notifications
            .items
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }
}

impl Database<Select<By<Vec<Notification>, read::notification::OfRecipient>>>
    for Json
{
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Notification>, read::notification::OfRecipient>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::notification::OfRecipient(recipient) = by.into_inner();

        let state = self.state().await;
        let mut all = state
            .notifications
            .items
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect::<Vec<_>>();
        // Newest first.
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

impl Database<Reload<Notification>> for Json {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Reload<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state().await;
        state
            .reload_notifications()
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}
