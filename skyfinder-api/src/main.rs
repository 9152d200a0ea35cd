use std::net::SocketAddr;

use skyfinder_api::{app, build_state};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfinder_api=debug,skyfinder_core=info,skyfinder_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skyfinder_store::app_config::Config::load()?;
    tracing::info!("Starting Skyfinder API on port {}", config.server.port);
    tracing::info!("Search service endpoint: {}", config.search.endpoint);

    let app_state = build_state(&config)?;
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
