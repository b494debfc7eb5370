/**
 * Agora Relay Entry Point
 *
 * Starts the Axum server hosting the WebSocket relay and the HTTP bridge.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    tracing::info!("[Startup] Tracing initialized with RUST_LOG={}", env_filter);

    let config = agora::backend::server::config::load_config().map_err(|e| {
        tracing::error!("[Startup] Invalid configuration: {}", e);
        e
    })?;

    let app = agora::backend::server::create_app(&config);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[Startup] Listening on {} (socket at ws://{}/ws)", addr, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("[Startup] Server stopped");
    Ok(())
}

#[cfg(feature = "ssr")]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("[Startup] Shutdown signal received"),
        Err(e) => tracing::error!("[Startup] Could not listen for shutdown signal: {}", e),
    }
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin agora-relay --features ssr");
    std::process::exit(1);
}
