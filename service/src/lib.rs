//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::error::Error;

use common::operations::{By, Start};

use crate::domain::user;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// [`command::SubmitPayment`] configuration.
    ///
    /// [`command::SubmitPayment`]: command::SubmitPayment
    pub submit_payment: command::submit_payment::Config,

    /// [`task::ProgressOrders`] configuration.
    pub progress_orders: task::progress_orders::Config,

    /// [`task::SyncCollections`] configuration.
    pub sync_collections: task::sync_collections::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// Directory of known users.
    users: user::Directory,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        users: user::Directory,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::ProgressOrders<Self>,
                        task::progress_orders::Config,
                    >,
                >,
                Ok = (),
                Err: Error + 'static,
            > + Task<
                Start<
                    By<
                        task::SyncCollections<Self>,
                        task::sync_collections::Config,
                    >,
                >,
                Ok = (),
                Err: Error + 'static,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            users,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().progress_orders))).await
        });
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().sync_collections)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns the directory of users known to this [`Service`].
    #[must_use]
    pub fn users(&self) -> &user::Directory {
        &self.users
    }
}
