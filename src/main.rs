//! Heroes service binary: settings from the environment, schema bootstrap, serve.

use heroes_api::{app, apply_migrations, connect, ensure_database_exists, AppState, PgUnitOfWorkProvider, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    let default_filter = if settings.app.debug { "heroes_api=debug,tower_http=debug" } else { "heroes_api=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
    tracing::debug!(?settings, "settings loaded");

    ensure_database_exists(&settings.postgres.dsn).await?;
    let pool = connect(&settings.postgres).await?;
    apply_migrations(&pool).await?;

    let addr = settings.bind_addr();
    let state = AppState::new(PgUnitOfWorkProvider::new(pool), settings);
    let app = app(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("heroes service listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
