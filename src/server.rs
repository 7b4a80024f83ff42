use std::{net::SocketAddr, time::Duration};

use axum::{extract::FromRef, Router};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::database::PostgresConnection;

pub struct Options {
    pub database_pool_size: u32,
    pub database_timeout_seconds: u8,
    pub database_url: String,
}

#[derive(Clone)]
pub struct AppState {
    db: PgPool,
}

pub async fn serve(opts: Options) -> anyhow::Result<()> {
    let db_pool = PgPoolOptions::new()
        .max_connections(opts.database_pool_size)
        .acquire_timeout(Duration::from_secs(opts.database_timeout_seconds.into()))
        .connect(&opts.database_url)
        .await?;

    let state = AppState { db: db_pool };

    let app = Router::new()
        .merge(crate::ledger::http::routes())
        .merge(crate::budgets::http::routes())
        .merge(crate::dashboard::http::routes())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let address: SocketAddr = "0.0.0.0:8000".parse()?;
    info!(%address, "Listening for requests.");

    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for PostgresConnection {
    fn from_ref(state: &AppState) -> Self {
        PostgresConnection::new(state.db.clone())
    }
}
