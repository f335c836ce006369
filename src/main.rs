use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use timesheets::config::Config;
use timesheets::db::{MemoryStore, PgStore};
use timesheets::state::SharedState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!("Starting timesheets");

    let addr = SocketAddr::new(config.host, config.port);
    let (app, state) = match config.database_url.clone() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations applied");
            timesheets::build_app(Arc::new(PgStore::new(pool)), config)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage; data is lost on exit");
            timesheets::build_app(Arc::new(MemoryStore::new()), config)
        }
    };

    bootstrap_admin(&state).await?;
    spawn_limiter_cleanup(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn bootstrap_admin(state: &SharedState) -> Result<(), Box<dyn std::error::Error>> {
    let Some(admin) = &state.config.bootstrap_admin else {
        return Ok(());
    };
    match state
        .users
        .bootstrap_admin(&admin.username, &admin.password, admin.employee_number)
        .await?
    {
        Some(user) => tracing::info!(user_id = %user.id, username = %user.username, "Bootstrap admin created"),
        None => tracing::info!(username = %admin.username, "Bootstrap admin already present"),
    }
    Ok(())
}

fn spawn_limiter_cleanup(state: SharedState) {
    let period = state.login_limiter.window().max(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.login_limiter.cleanup();
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
