//! [`SyncCollections`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Reload, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{Message, Notification, Order},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`SyncCollections`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between storage re-reads.
    pub interval: time::Duration,
}

/// [`Task`] re-reading the stored collections, picking up writes made to the
/// storage files by other processes.
#[derive(Clone, Copy, Debug)]
pub struct SyncCollections<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<SyncCollections<Self>, Config>>> for Service<Db>
where
    SyncCollections<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SyncCollections<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SyncCollections {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::SyncCollections` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for SyncCollections<Service<Db>>
where
    Db: Database<Reload<Order>, Ok = bool, Err = Traced<database::Error>>
        + Database<Reload<Message>, Ok = bool, Err = Traced<database::Error>>
        + Database<
            Reload<Notification>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let db = self.service.database();

        if db
            .execute(Reload::<Order>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!())?
        {
            log::info!("`Order`s collection re-read from storage");
        }
        if db
            .execute(Reload::<Message>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!())?
        {
            log::info!("`Message`s collection re-read from storage");
        }
        if db
            .execute(Reload::<Notification>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!())?
        {
            log::info!("`Notification`s collection re-read from storage");
        }

        Ok(())
    }
}

/// Error of [`SyncCollections`] execution.
pub type ExecutionError = Traced<database::Error>;
