//! Reference backend for the crib client: a document store, email/password
//! accounts and blob storage over HTTP, persisted in sled.

mod config;
mod error;
mod routes;
mod state;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::State;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let db = sled::open(&config.db_path)
        .with_context(|| format!("opening database at {}", config.db_path.display()))?;
    let state = State::new(db, config.public_url.clone())?;
    let app = routes::router(state);

    let addr = config.addr();
    info!("listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
