use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser};
use rum_loadgen::config::Config;
use rum_loadgen::logging;
use rum_loadgen::pool::BrowserPool;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "rum-loadgen",
    author,
    version,
    about = "Synthetic browser traffic generator for the NEXUS station dashboard",
    long_about = None
)]
struct Args {
    /// Increase logging verbosity.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    logging::init_tracing(args.verbose, config.log_format);

    info!(
        target_url = %config.base_url,
        sessions = config.session_count,
        iterations = config.iterations_per_session,
        headless = config.headless,
        weights = %serde_json::to_string(&config.scenario_weights).unwrap_or_default(),
        "NEXUS RUM load generator starting"
    );

    let pool = BrowserPool::new(Arc::new(config));
    let shutdown = pool.shutdown_flag();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.request();
    });

    match pool.run().await {
        Ok(()) => {
            info!("All session loops completed");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Fatal error");
            Err(err)
        }
    }
}

/// Resolves when the process is asked to stop via SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Could not install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
