use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use whiteboard_rs::{app, config::Config, error::WhiteboardError, AppState};

#[tokio::main]
async fn main() -> Result<(), WhiteboardError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whiteboard=info,whiteboard_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let addr = config.bind_address();
    let static_dir = config.static_dir.clone();

    let state = AppState::new(config);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🎨 Whiteboard server running on http://{}", addr);
    tracing::info!("   Serving client from {}", static_dir.display());

    axum::serve(listener, router).await?;
    Ok(())
}
