//! studio-api - Studio enrollment and attendance service
//!
//! Serves the class schedule, enrollments, check-in and dashboard
//! statistics over HTTP/JSON from a single SQLite database.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studio_api::{build_router, AppState};
use studio_common::config::{
    CompiledDefaults, LoadedConfig, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use studio_common::db::init_database;

/// Command-line arguments for studio-api
#[derive(Parser, Debug)]
#[command(name = "studio-api")]
#[command(about = "Studio class enrollment and attendance service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "STUDIO_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Root folder holding studio.db (STUDIO_ROOT_FOLDER also honored)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let defaults = CompiledDefaults::for_current_platform();

    let LoadedConfig {
        config: toml_config,
        source: config_source,
    } = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("studio_api={0},studio_common={0},tower_http={0}", toml_config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting studio-api v{}", env!("CARGO_PKG_VERSION"));
    config_source.log();

    let root_folder = RootFolderResolver::new("studio-api")
        .with_cli_arg(args.root_folder)
        .with_toml(&toml_config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(pool));

    let host = args.host.or(toml_config.host).unwrap_or(defaults.host);
    let port = args.port.or(toml_config.port).unwrap_or(defaults.port);
    let addr = bind_address(&host, port)?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("studio-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Socket address for an IPv4 or IPv6 host literal
fn bind_address(host: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .with_context(|| format!("Invalid bind host {}", host))?;
    Ok(SocketAddr::new(ip, port))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address_accepts_ipv4_and_ipv6() {
        assert_eq!(bind_address("127.0.0.1", 5780).unwrap().to_string(), "127.0.0.1:5780");
        assert_eq!(bind_address("::1", 5780).unwrap().to_string(), "[::1]:5780");
        assert_eq!(bind_address("[::]", 80).unwrap().to_string(), "[::]:80");
        assert!(bind_address("not a host", 5780).is_err());
    }
}
