//! HTTP serve command handler

use crate::commands::build_components;
use crate::config::Config;
use crate::error::Result;
use crate::server::{self, AppState};

/// Serves the chat endpoint until the process is stopped
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `port` - Optional override for the configured bind port
pub async fn run_serve(config: Config, port: Option<u16>) -> Result<()> {
    let (orchestrator, sessions) = build_components(&config)?;

    let mut server_config = config.server.clone();
    if let Some(port) = port {
        tracing::debug!("using port override: {}", port);
        server_config.port = port;
    }

    server::serve(
        &server_config,
        AppState {
            sessions,
            orchestrator,
        },
    )
    .await
}
