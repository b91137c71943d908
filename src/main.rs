mod bluetooth;
mod classifier;
mod config;
mod http;
mod models;
mod pipeline;
mod store;

use log::{error, info};
use std::sync::Arc;

use bluetooth::connect_to_atmotube;
use config::MonitorConfig;
use models::MetricName;
use store::MetricStore;

async fn run(config: MonitorConfig, store: Arc<MetricStore>) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Atmotube monitoring service");
    info!(
        "Reporting metrics: {}",
        MetricName::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Reporting endpoint runs independently of the sensor link
    let mut server = tokio::spawn(http::serve(config.http_bind_addr, Arc::clone(&store)));

    let subscription = connect_to_atmotube(&config, Arc::clone(&store)).await?;
    info!(
        "Receiving notifications on: {}",
        subscription
            .channels()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let finished = tokio::select! {
        _ = subscription.wait() => None,
        result = &mut server => Some(result),
    };

    let result = match finished {
        Some(result) => result,
        None => {
            // No reconnection; keep serving the last known values
            info!("Sensor disconnected, serving last known readings");
            server.await
        }
    };
    result??;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match MonitorConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let store = Arc::new(MetricStore::new());

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        let _ = tx.send(());
    });

    // Run the service or wait for shutdown signal
    tokio::select! {
        result = run(config, store) => {
            if let Err(e) = result {
                error!("Fatal error: {}", e);
                return Err(e);
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
