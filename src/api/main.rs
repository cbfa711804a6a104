use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use tracing::info;

use diagram_sync::config::ServerConfig;
use diagram_sync::middleware::init_tracing;
use diagram_sync::routes::{create_app, create_app_state};
use diagram_sync::services::JwtService;

// Panic hook to catch and log panics
fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred!");
        if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            eprintln!("Panic message: {}", s);
        }
        if let Some(location) = panic_info.location() {
            eprintln!(
                "Panic location: {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
    }));
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    setup_panic_hook();
    init_tracing();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // `api --issue-token <owner>` prints a bearer token and exits.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(flag) = args.first() {
        if flag != "--issue-token" {
            bail!("Unknown argument {flag:?} (expected --issue-token <owner>)");
        }
        let Some(owner) = args.get(1) else {
            bail!("--issue-token requires an owner id");
        };
        let token = JwtService::new(&config.jwt_secret)
            .issue_access_token(owner)
            .map_err(anyhow::Error::msg)?;
        println!("{token}");
        return Ok(());
    }

    let port = config.port;
    let app_state = create_app_state(config)
        .await
        .context("Failed to initialize storage")?;
    let app = create_app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on {} (port {})", addr, port);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

// Handle both SIGINT (Ctrl+C) and SIGTERM (Docker stop)
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("SIGINT received, shutting down gracefully");
                    }
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, shutting down gracefully");
                    }
                }
                return;
            }
            Err(e) => tracing::warn!("Failed to install SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
