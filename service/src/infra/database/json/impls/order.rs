//! [`Order`]-related [`Database`] implementations.

use common::operations::{By, Insert, Reload, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{order, Order},
    infra::{
        database::{self, Json},
        Database,
    },
    read,
};

impl Database<Insert<Order>> for Json
where
    Self: Database<Update<Order>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(order): Insert<Order>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(order)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Order>> for Json {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(order): Update<Order>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state().await;
        if let Some(slot) =
            state.orders.items.iter_mut().find(|o| o.id == order.id)
        {
            *slot = order;
        } else {
            state.orders.items.push(order);
        }
        state
            .persist_orders()
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Select<By<Option<Order>, order::Id>>> for Json {
    type Ok = Option<Order>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Order>, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let state = self.state().await;
        Ok(state.orders.items.iter().find(|o| o.id == id).cloned())
    }
}

impl Database<Select<By<Vec<Order>, read::order::OfCustomer>>> for Json {
    type Ok = Vec<Order>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Order>, read::order::OfCustomer>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::order::OfCustomer(customer) = by.into_inner();

        let state = self.state().await;
        Ok(state
            .orders
            .items
            .iter()
            .filter(|o| o.customer_id == customer)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Vec<Order>, read::order::OfFixer>>> for Json {
    type Ok = Vec<Order>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Order>, read::order::OfFixer>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::order::OfFixer(fixer) = by.into_inner();

        let state = self.state().await;
        Ok(state
            .orders
            .items
            .iter()
            .filter(|o| o.fixer_id == Some(fixer))
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Vec<Order>, read::order::All>>> for Json {
    type Ok = Vec<Order>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Order>, read::order::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state().await;
        Ok(state.orders.items.clone())
    }
}

impl Database<Reload<Order>> for Json {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Reload<Order>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state().await;
        state
            .reload_orders()
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}
