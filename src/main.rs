use bingo_server::{api, build_engine, config, create_app, db};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load config
    let config = config::Config::from_env();
    tracing::info!("Starting bingo server on {}", config.server_addr());

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    // Run migrations
    db::run_migrations(&pool).await?;

    // Wire the engine
    let (engine, balance, _notifier) = build_engine(pool, config.game.clone());

    // Restore a round that was open when the process last stopped
    if engine.resume_from_store().await? {
        tracing::info!("Restored an open round from storage");
    }

    let game_state = Arc::new(api::GameAppState {
        engine: engine.clone(),
        balance,
    });
    let app = create_app(game_state);

    // Spawn the round ticker: lobby close and draws run off absolute
    // deadlines, so the interval only bounds reaction latency.
    let ticker_engine = engine.clone();
    let tick_interval = tokio::time::Duration::from_millis(config.tick_interval_ms);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_interval);
        loop {
            interval.tick().await;
            if let Err(e) = ticker_engine.tick().await {
                tracing::error!("Round tick failed: {}", e);
            }
        }
    });

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server_addr()).await?;
    tracing::info!("Server listening on {}", config.server_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
