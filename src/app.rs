use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use figment::{Figment, providers::Env};
use sqlx::ConnectOptions;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::data::{faculty, scholar_sync, sessions};
use crate::openalex::OpenAlexClient;
use crate::state::{AppState, AuthSettings};
use crate::web::routes::create_router;

/// Extract the configuration from the process environment.
pub fn load_config() -> Result<Config, anyhow::Error> {
    Figment::new()
        .merge(Env::raw())
        .extract()
        .context("Failed to load config")
}

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

impl App {
    /// Create a new App instance with all necessary components initialized
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        // Create database connection pool
        let connect_options = sqlx::postgres::PgConnectOptions::from_str(&config.database_url)
            .context("Failed to parse database URL")?
            .log_statements(tracing::log::LevelFilter::Debug)
            .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(1));

        let db_pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(4))
            .idle_timeout(Duration::from_secs(60 * 2))
            .max_lifetime(Duration::from_secs(60 * 30))
            .connect_with(connect_options)
            .await
            .context("Failed to create database pool")?;

        info!(
            min_connections = 0,
            max_connections = 4,
            acquire_timeout = "4s",
            idle_timeout = "2m",
            max_lifetime = "30m",
            "database pool established"
        );

        // Run database migrations
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run database migrations")?;
        info!("Database migrations completed");

        // Housekeeping: expired sessions are also rejected on read, this
        // just keeps the table small.
        match sessions::purge_expired(&db_pool).await {
            Ok(0) => {}
            Ok(n) => info!(count = n, "Purged expired sessions"),
            Err(e) => warn!(error = ?e, "Failed to purge expired sessions (non-fatal)"),
        }

        // Seed the demo faculty directory (idempotent).
        match faculty::seed_demo_faculty(&db_pool).await {
            Ok(0) => {}
            Ok(n) => info!(count = n, "Seeded demo faculty"),
            Err(e) => warn!(error = ?e, "Failed to seed demo faculty (non-fatal)"),
        }

        // OpenAlex client, present only when an institution is configured.
        let openalex = match &config.openalex_institution_id {
            Some(institution) if !institution.is_empty() => Some(Arc::new(
                OpenAlexClient::new(
                    config.openalex_base_url.clone(),
                    institution.clone(),
                    config.openalex_mailto.clone(),
                    Duration::from_secs(config.openalex_timeout_secs),
                )
                .context("Failed to create OpenAlex client")?,
            )),
            _ => {
                info!("No OpenAlex institution configured, scholar sync disabled");
                None
            }
        };

        let auth = AuthSettings {
            allowed_email_domain: config.allowed_email_domain.clone(),
            admin_email: config.admin_email.clone(),
            session_ttl: chrono::Duration::days(config.session_ttl_days),
        };

        let app_state = AppState::new(db_pool, openalex, auth);

        Ok(App { config, app_state })
    }

    /// Spawn the periodic scholar-sync task: one pass at startup, then one
    /// per configured interval. Every pass is non-fatal.
    fn spawn_scholar_sync(&self) {
        let Some(client) = self.app_state.openalex.clone() else {
            return;
        };
        let db_pool = self.app_state.db_pool.clone();
        let interval = Duration::from_secs(self.config.scholar_sync_interval_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match scholar_sync::run_scholar_sync(&db_pool, &client).await {
                    Ok(stats) => {
                        if stats.failed > 0 {
                            warn!(failed = stats.failed, "Scholar sync pass had failures");
                        }
                    }
                    Err(e) => warn!(error = ?e, "Scholar sync pass failed"),
                }
            }
        });
    }

    /// Serve the API until a shutdown signal arrives.
    pub async fn run(self) -> ExitCode {
        self.spawn_scholar_sync();

        let router = create_router(self.app_state, &self.config.cors_origin_list());

        let listener = match tokio::net::TcpListener::bind(("0.0.0.0", self.config.port)).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(port = self.config.port, error = %e, "Failed to bind web server");
                return ExitCode::FAILURE;
            }
        };
        info!(port = self.config.port, "web server listening");

        let drain_timeout = self.config.shutdown_timeout;
        let graceful = async move {
            shutdown_signal().await;
            info!(timeout_secs = drain_timeout, "Shutdown signal received, draining");
            // Hard stop if draining outlives the deadline.
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(drain_timeout)).await;
                warn!("Graceful shutdown timed out, exiting");
                std::process::exit(1);
            });
        };

        if let Err(e) = axum::serve(listener, router).with_graceful_shutdown(graceful).await {
            error!(error = %e, "Web server error");
            return ExitCode::FAILURE;
        }

        ExitCode::SUCCESS
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
