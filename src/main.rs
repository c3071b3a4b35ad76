use osint_portal::auth::AuthConfig;
use osint_portal::db::Database;
use osint_portal::{router, AppState, Config};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();

    for path in [&config.visitor_data_path, &config.users_db_path] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
    }

    let db = Database::connect(&config.users_db_path).await?;
    db.migrate_legacy_users(&config.legacy_users_path).await?;

    let visitors = osint_portal::load_data(&config.visitor_data_path).await;
    info!(
        "restored visitor state: {} all-time, {} unique",
        visitors.total_visitors,
        visitors.unique_visitors.len()
    );

    let state = AppState::new(
        config.visitor_data_path.clone(),
        visitors,
        db,
        AuthConfig {
            secret: config.jwt_secret.clone(),
            session_timeout: config.session_timeout,
            cookie_secure: config.cookie_secure,
        },
    );

    let app = router(state.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Anything counted before the signal must hit disk before we exit.
    let data = state.visitors.lock().await;
    if let Err(err) = osint_portal::storage::persist_data(&state.data_path, &data).await {
        error!("failed to persist visitor data on shutdown: {}", err.message);
    } else {
        info!("visitor state persisted, shutting down");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install ctrl-c handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
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
}
