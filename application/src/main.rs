use std::{io, sync::OnceLock};

use application::{Args, Config, Service};
use rust_decimal::Decimal;
use service::{domain::user, infra::Json};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        storage,
        service,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let database = Json::open(storage.dir.as_str()).await.map_err(|e| {
        log::error!("failed to open storage at `{}`: {e}", storage.dir);
    })?;

    // No request surface is wired here: the binary runs the storage,
    // progression and synchronization loops.
    let (_service, background) =
        Service::new(service.into(), database, demo_users());

    log::info!("collections are stored in `{}`", storage.dir);

    background.await.map_err(|e| {
        log::error!("background task failed: {e}");
    })
}

/// Demo [`user::Directory`] the marketplace is seeded with.
///
/// IDs are fixed, so stored orders stay attached to their parties across
/// restarts.
fn demo_users() -> user::Directory {
    let user = |id: &str,
                name: &str,
                rating: Option<Decimal>,
                completed_jobs: Option<u32>| {
        user::User {
            id: id.parse().unwrap_or_else(|_| unreachable!("valid UUID")),
            name: user::Name::new(name)
                .unwrap_or_else(|| unreachable!("non-empty name")),
            rating: rating.and_then(user::Rating::new),
            completed_jobs,
            created_at: user::CreationDateTime::now(),
        }
    };

    user::Directory::new([
        user(
            "5f0c9f51-1254-4b7c-9a3f-0f9a51b1c001",
            "Alice Carter",
            None,
            None,
        ),
        user(
            "5f0c9f51-1254-4b7c-9a3f-0f9a51b1c002",
            "Bob Keller",
            Some(Decimal::new(48, 1)),
            Some(24),
        ),
        user(
            "5f0c9f51-1254-4b7c-9a3f-0f9a51b1c003",
            "Mia Schneider",
            Some(Decimal::new(46, 1)),
            Some(11),
        ),
    ])
}
