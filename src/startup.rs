//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::domain::{AvatarStore, IdentityProvider};
use crate::infrastructure::database;
use crate::infrastructure::identity::GoogleIdentityProvider;
use crate::infrastructure::repositories::Repositories;
use crate::infrastructure::storage::LocalAvatarStore;
use crate::presentation::http::{handlers::health, routes};
use crate::shared::clock::{Clock, SystemClock};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Pool used by readiness checks; absent when running on other stores
    pub db: Option<PgPool>,
    pub repositories: Repositories,
    pub identity: Arc<dyn IdentityProvider>,
    pub avatars: Arc<dyn AvatarStore>,
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<Settings>,
}

/// Build the full router, middleware included, for the given state.
pub fn build_router(state: AppState) -> Router {
    routes::create_router(state)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let db = database::create_pool(&settings.database)
            .await
            .context("failed to create database pool")?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }

        let avatars = LocalAvatarStore::new(&settings.avatars.directory)
            .await
            .context("failed to prepare avatar directory")?;
        tracing::info!(directory = %avatars.root().display(), "Avatar storage ready");

        let identity = GoogleIdentityProvider::new(&settings.identity)
            .context("failed to build identity provider client")?;
        if settings.identity.client_credentials().is_none() {
            tracing::warn!("Google client credentials not set; code sign-in is disabled");
        }

        let state = AppState {
            db: Some(db.clone()),
            repositories: Repositories::postgres(db),
            identity: Arc::new(identity),
            avatars: Arc::new(avatars),
            clock: Arc::new(SystemClock),
            settings: Arc::new(settings.clone()),
        };

        let router = build_router(state);

        let addr = settings.server_addr();
        let listener = TcpListener::bind(addr.as_str())
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
