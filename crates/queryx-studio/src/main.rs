use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use queryx_studio::{
    config::{Args, StudioConfig},
    create_router,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let log_filter = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("queryx_studio={},tower_http=info", log_filter).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create configuration
    let config: StudioConfig = args.into();
    let listen_addr = config.listen_addr();
    let base_url = config.base_url();
    let open_browser = config.open_browser;
    let api_url = config.api_url.clone();

    // Create application state
    let state = AppState::new(config)?;

    // Create router
    let app = create_router(state);

    // Bind to address
    let listener = TcpListener::bind(&listen_addr).await?;

    tracing::info!("QueryX Studio starting on {}", base_url);
    tracing::info!("Using QueryX API at {}", api_url);
    tracing::info!("Health check at {}/health", base_url);

    // Open browser if requested
    if open_browser {
        tracing::info!("Opening browser...");
        if let Err(e) = open::that(&base_url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    println!();
    println!("  ╔═══════════════════════════════════════════════════════╗");
    println!("  ║                                                       ║");
    println!("  ║   QueryX Studio is running!                           ║");
    println!("  ║                                                       ║");
    println!("  ║   Local:   {:<38}     ║", base_url);
    println!("  ║   API:     {:<38}     ║", api_url);
    println!("  ║                                                       ║");
    println!("  ║   Press Ctrl+C to stop                                ║");
    println!("  ║                                                       ║");
    println!("  ╚═══════════════════════════════════════════════════════╝");
    println!();

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
