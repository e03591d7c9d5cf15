/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `serve` — HTTP chat endpoint
- `chat`  — Interactive terminal session

Both wire the same component stack: token source, travel gateway,
interpreter, dispatcher, orchestrator, session registry.
*/

pub mod chat;
pub mod serve;

use crate::agent::Orchestrator;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::gateway::token::FileTokenSource;
use crate::gateway::AmadeusGateway;
use crate::reasoning::OpenAiInterpreter;
use crate::session::SessionRegistry;
use std::sync::Arc;

/// Builds the orchestrator and session registry from configuration
///
/// # Errors
///
/// Returns an error when the reasoning API key environment variable is
/// unset or an HTTP client cannot be constructed
pub fn build_components(config: &Config) -> Result<(Arc<Orchestrator>, Arc<SessionRegistry>)> {
    let tokens = Arc::new(FileTokenSource::new(&config.gateway.token_path));
    let gateway = Arc::new(AmadeusGateway::new(&config.gateway, tokens)?);
    let api_key = config.reasoning_api_key()?;
    let interpreter = Arc::new(OpenAiInterpreter::new(&config.reasoning, api_key)?);

    let orchestrator = Arc::new(Orchestrator::new(
        interpreter,
        Dispatcher::new(gateway, &config.gateway),
        config.orchestrator.max_context_messages,
    ));
    let sessions = Arc::new(SessionRegistry::new(config.profile.clone()));
    Ok((orchestrator, sessions))
}
