use std::sync::Arc;

use attend_core::AttendConfig;
use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use attend_server::router::TranslationService;
use attend_server::server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "attend.toml")]
    config: String,

    /// Build the translator, report whether the extractor loaded, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience - production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match AttendConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging (RUST_LOG wins over the configured level)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.service.log_level.clone()));
    fmt().with_env_filter(filter).init();

    let service = Arc::new(TranslationService::from_config(&config));

    if args.check {
        match service.translator().extractor_name() {
            Some(name) => {
                println!("✅ Entity extractor loaded: {}", name);
                println!("✅ Attend check passed");
                return Ok(());
            }
            None => {
                println!(
                    "❌ Entity extractor unavailable: {}",
                    service.translator().unavailable_reason().unwrap_or("unknown")
                );
                std::process::exit(1);
            }
        }
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    if config.http.enabled {
        let http_service = service.clone();
        let http_config = config.clone();
        let http_shutdown = tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) =
                attend_server::http::start_http_server(http_service, http_config, http_shutdown)
                    .await
            {
                tracing::error!("HTTP server error: {}", e);
            }
        });
    }

    let socket_path = config.service.socket_path.clone();
    server::run_unix_server(&socket_path, service, tx.subscribe()).await?;

    Ok(())
}
