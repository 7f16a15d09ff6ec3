//! Background [`Task`]s definitions.

mod background;
pub mod progress_orders;
pub mod sync_collections;

pub use common::Handler as Task;

pub use self::{
    background::Background, progress_orders::ProgressOrders,
    sync_collections::SyncCollections,
};
