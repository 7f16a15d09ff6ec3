//! Environment for running [`Task`]s detached from request handling.

use std::{
    error::Error,
    fmt,
    future::{Future, IntoFuture},
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Environment for running [`Task`]s detached from request handling.
///
/// Collected [`Task`]s don't run until the [`Background`] itself is awaited.
#[derive(Default)]
pub struct Background {
    /// Collected [`Task`]s, with their error types erased.
    tasks: Vec<LocalBoxFuture<'static, Result<(), Box<dyn Error>>>>,
}

impl Background {
    /// Schedules the provided [`Task`] to run in this [`Background`]
    /// environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.tasks.push(
            future
                .map_err(|e| -> Box<dyn Error> { Box::new(e) })
                .boxed_local(),
        );
    }
}

impl fmt::Debug for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Background")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), Box<dyn Error>>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let set = task::LocalSet::new();
        let handles = self
            .tasks
            .into_iter()
            .map(|t| set.spawn_local(t))
            .collect::<Vec<_>>();

        async move {
            set.run_until(future::try_join_all(handles.into_iter().map(
                |h| {
                    h.map(|r| -> Result<(), Box<dyn Error>> {
                        match r {
                            Ok(r) => r,
                            Err(e) => Err(Box::new(e)),
                        }
                    })
                },
            )))
            .await
            .map(drop)
        }
        .boxed_local()
    }
}
