//! Handler for the `stream` command.

use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::adapter::outbound::jockmkt::{JockmktClient, WebSocketConnector};
use crate::application::stream::StreamManager;
use crate::cli::{Cli, StreamArgs};
use crate::domain::{Envelope, Subscription};
use crate::error::Result;
use crate::infrastructure::config::settings::{Config, Credentials};
use crate::port::LoggingErrorHandler;

/// Load the configuration file, or the defaults when it does not exist.
#[allow(clippy::result_large_err)]
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Ok(Config::default())
    }
}

/// Execute the stream command.
pub async fn execute(cli: &Cli, args: &StreamArgs) -> Result<()> {
    let mut config = load_config(&cli.config)?;
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    config.validate()?;
    config.init_logging();

    let mut subscriptions = config.stream.initial_subscriptions()?;
    for shorthand in &args.subscriptions {
        subscriptions.push(shorthand.parse::<Subscription>()?);
    }
    if subscriptions.is_empty() {
        warn!("No subscriptions requested; only acknowledgments will arrive");
    }

    crate::init_crypto();
    let credentials = Credentials::from_env()?;
    let client = Arc::new(JockmktClient::new(config.api.clone(), credentials));
    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();

    info!(subscriptions = subscriptions.len(), "Starting stream");
    let manager = StreamManager::create(
        config.stream.clone(),
        Arc::new(WebSocketConnector::new()),
        client,
        Some(Arc::new(tx)),
        Arc::new(LoggingErrorHandler),
        subscriptions,
        None,
    )?;

    loop {
        tokio::select! {
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                println!("{}", serde_json::to_string(&envelope)?);
            }
            state = manager.wait_for(|state| state.is_terminal()) => {
                match state {
                    Ok(state) => error!(state = ?state, "Stream stopped"),
                    Err(e) => error!(error = %e, "Stream stopped"),
                }
                break;
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    manager.cancel().await;
    Ok(())
}
