mod args;

use std::{process::ExitCode, sync::Arc};

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use room_climate::{
    actuator::HttpTransport,
    db::{PgStore, new_pool},
    http::router,
    room::Room,
    store::{MemoryStore, TimeSeriesStore},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        eprintln!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let config = args.room_config();

    let store: Arc<dyn TimeSeriesStore> = match &args.database_url {
        Some(url) => {
            let pool = new_pool(url)
                .await
                .context("failed to connect to database")?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; samples are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let transport = HttpTransport::new(config.command_timeout)
        .context("failed to build actuator HTTP client")?;

    let room = Room::new(config, store, Arc::new(transport));
    room.sync_sensors()
        .await
        .context("failed to sync sensor registry")?;

    let listener = TcpListener::bind(args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    info!(addr = %args.listen_addr, room = room.name(), "listening");

    axum::serve(listener, router(Arc::new(room)))
        .await
        .context("server error")?;

    Ok(())
}
