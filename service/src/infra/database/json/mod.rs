//! JSON file [`Database`] implementation.

mod impls;

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use derive_more::{Display, Error as StdError, From};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::{
    domain::{Message, Notification, Order},
    infra::database,
};

#[cfg(doc)]
use common::operations::Reload;

#[cfg(doc)]
use crate::infra::Database;

/// JSON file [`Database`] client.
///
/// Each collection lives in its own file inside the storage directory and
/// is rewritten as a whole on every mutation. Writes made by other
/// processes sharing the directory are picked up via [`Reload`], gated on
/// file modification times.
#[derive(Clone, Debug)]
pub struct Json(Arc<Mutex<State>>);

impl Json {
    /// Creates a new [`Json`] client backed by memory only.
    ///
    /// Nothing is ever persisted. Intended for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self(Arc::new(Mutex::new(State::new(None))))
    }

    /// Creates a new [`Json`] client storing its collections in the
    /// provided directory, loading whatever is already there.
    ///
    /// # Errors
    ///
    /// If the directory cannot be created, or an existing collection file
    /// cannot be read or decoded.
    pub async fn open(
        dir: impl Into<PathBuf>,
    ) -> Result<Self, Traced<database::Error>> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let mut state = State::new(Some(dir.clone()));
        state
            .orders
            .load(&dir)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        state
            .messages
            .load(&dir)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        state
            .notifications
            .load(&dir)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        Ok(Self(Arc::new(Mutex::new(state))))
    }

    /// Locks and returns the inner [`State`].
    pub(super) async fn state(&self) -> tokio::sync::MutexGuard<'_, State> {
        self.0.lock().await
    }
}

/// Inner state of a [`Json`] client.
#[derive(Debug)]
pub(super) struct State {
    /// Directory the collections are persisted to, if any.
    dir: Option<PathBuf>,

    /// Stored [`Order`]s.
    pub(super) orders: Collection<Order>,

    /// Stored [`Message`]s.
    pub(super) messages: Collection<Message>,

    /// Stored [`Notification`]s.
    pub(super) notifications: Collection<Notification>,
}

impl State {
    /// Creates a new empty [`State`] persisted to the provided directory.
    fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            orders: Collection::new("orders.json"),
            messages: Collection::new("messages.json"),
            notifications: Collection::new("notifications.json"),
        }
    }

    /// Persists the [`Order`]s collection.
    pub(super) async fn persist_orders(&mut self) -> Result<(), Error> {
        let Self { dir, orders, .. } = self;
        orders.persist(dir.as_deref()).await
    }

    /// Persists the [`Message`]s collection.
    pub(super) async fn persist_messages(&mut self) -> Result<(), Error> {
        let Self { dir, messages, .. } = self;
        messages.persist(dir.as_deref()).await
    }

    /// Persists the [`Notification`]s collection.
    pub(super) async fn persist_notifications(
        &mut self,
    ) -> Result<(), Error> {
        let Self {
            dir, notifications, ..
        } = self;
        notifications.persist(dir.as_deref()).await
    }

    /// Reloads the [`Order`]s collection if its file has changed.
    pub(super) async fn reload_orders(&mut self) -> Result<bool, Error> {
        let Self { dir, orders, .. } = self;
        orders.reload(dir.as_deref()).await
    }

    /// Reloads the [`Message`]s collection if its file has changed.
    pub(super) async fn reload_messages(&mut self) -> Result<bool, Error> {
        let Self { dir, messages, .. } = self;
        messages.reload(dir.as_deref()).await
    }

    /// Reloads the [`Notification`]s collection if its file has changed.
    pub(super) async fn reload_notifications(
        &mut self,
    ) -> Result<bool, Error> {
        let Self {
            dir, notifications, ..
        } = self;
        notifications.reload(dir.as_deref()).await
    }
}

/// Stored collection of `T` items, mirrored by a single JSON file.
#[derive(Debug)]
pub(super) struct Collection<T> {
    /// Name of the file this [`Collection`] is mirrored by.
    file: &'static str,

    /// Items of this [`Collection`].
    pub(super) items: Vec<T>,

    /// Modification time of the mirroring file at the moment it was read
    /// or written last time.
    synced_at: Option<SystemTime>,
}

impl<T: DeserializeOwned + Serialize> Collection<T> {
    /// Creates a new empty [`Collection`] mirrored by the provided file.
    fn new(file: &'static str) -> Self {
        Self {
            file,
            items: Vec::new(),
            synced_at: None,
        }
    }

    /// Reads this [`Collection`] from its file inside the provided
    /// directory.
    ///
    /// A missing file is an empty [`Collection`].
    async fn load(&mut self, dir: &Path) -> Result<(), Error> {
        let path = dir.join(self.file);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                self.items = serde_json::from_slice(&bytes)?;
                self.synced_at = modified(&path).await;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.items = Vec::new();
                self.synced_at = None;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Writes this [`Collection`] out, if the provided directory is
    /// present.
    async fn persist(
        &mut self,
        dir: Option<&Path>,
    ) -> Result<(), Error> {
        let Some(dir) = dir else {
            return Ok(());
        };

        let path = dir.join(self.file);
        let bytes = serde_json::to_vec_pretty(&self.items)?;
        tokio::fs::write(&path, bytes).await?;
        self.synced_at = modified(&path).await;
        Ok(())
    }

    /// Re-reads this [`Collection`] if its file has changed since the last
    /// [`load()`](Collection::load) or
    /// [`persist()`](Collection::persist).
    ///
    /// Returns whether anything was re-read.
    async fn reload(
        &mut self,
        dir: Option<&Path>,
    ) -> Result<bool, Error> {
        let Some(dir) = dir else {
            return Ok(false);
        };

        let path = dir.join(self.file);
        let modified = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.modified().ok(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        if modified.is_some() && modified == self.synced_at {
            return Ok(false);
        }

        self.load(dir).await?;
        Ok(true)
    }
}

/// Returns the modification time of the provided file, if available.
async fn modified(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok().and_then(|m| m.modified().ok())
}

/// JSON file database [`Error`].
///
/// [`Error`]: enum@Error
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Failed to read or write a storage file.
    #[display("I/O error: {_0}")]
    Io(io::Error),

    /// Failed to encode or decode a storage file.
    #[display("Malformed storage file: {_0}")]
    Codec(serde_json::Error),
}

#[cfg(test)]
mod spec {
    use common::{
        money::Currency,
        operations::{By, Insert, Reload, Select},
        Money,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::{order, user, Order},
        infra::Database as _,
    };

    use super::Json;

    fn order() -> Order {
        let eur =
            |amount: i64| Money::new(Decimal::from(amount), Currency::Eur);
        Order {
            id: order::Id::new(),
            customer_id: user::Id::new(),
            fixer_id: None,
            category: order::Category::Tech,
            subcategory: "Phone".into(),
            issue: order::Issue::new("Cracked screen").unwrap(),
            description: order::Description::new(
                "Display shattered after a fall.",
            )
            .unwrap(),
            photo: None,
            delivery: order::Delivery::Shipping {
                address: order::ShippingAddress::new(
                    "Residence Hall 3, Room 12, 64289 Darmstadt",
                )
                .unwrap(),
            },
            appointment_at: None,
            price_estimate: order::PriceEstimate::new(eur(40), eur(60))
                .unwrap(),
            final_price: None,
            total_price: None,
            status: order::Status::Pending,
            negotiation: None,
            payment: None,
            rating: None,
            review: None,
            created_at: order::CreationDateTime::now(),
            updated_at: order::UpdateDateTime::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn persists_across_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let order = order();

        let db = Json::open(dir.path()).await.unwrap();
        db.execute(Insert(order.clone())).await.unwrap();
        drop(db);

        let db = Json::open(dir.path()).await.unwrap();
        let stored: Option<Order> =
            db.execute(Select(By::new(order.id))).await.unwrap();
        assert_eq!(stored.unwrap().id, order.id);
    }

    #[tokio::test]
    async fn reload_picks_up_foreign_writes() {
        let dir = tempfile::tempdir().unwrap();
        let ours = Json::open(dir.path()).await.unwrap();
        let theirs = Json::open(dir.path()).await.unwrap();

        let order = order();
        theirs.execute(Insert(order.clone())).await.unwrap();

        assert!(ours.execute(Reload::<Order>::new()).await.unwrap());
        let stored: Option<Order> =
            ours.execute(Select(By::new(order.id))).await.unwrap();
        assert!(stored.is_some());

        // Nothing changed since, so the second pass is a no-op.
        assert!(!ours.execute(Reload::<Order>::new()).await.unwrap());
    }

    #[tokio::test]
    async fn in_memory_reload_is_a_no_op() {
        let db = Json::in_memory();
        db.execute(Insert(order())).await.unwrap();

        assert!(!db.execute(Reload::<Order>::new()).await.unwrap());
    }
}
