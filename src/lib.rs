//! Voyagent - Conversational travel booking agent library
//!
//! This library provides the core functionality for the Voyagent travel
//! assistant, including dialogue orchestration, turn interpretation, slot
//! management, travel gateway access, and itinerary accumulation.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `agent`: Dialogue orchestration and the per-turn execution loop
//! - `reasoning`: Turn interpretation over an OpenAI-compatible endpoint
//! - `dispatch`: Readiness validation and gateway operation routing
//! - `gateway`: Travel-data provider client, token handling, retry policy
//! - `slots`: Per-domain booking parameters and cross-domain invalidation
//! - `session`: Transcripts, offer caching, and the session registry
//! - `itinerary`: Confirmed-booking accumulation and rendering
//! - `server`: HTTP chat endpoint
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use voyagent::config::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load_or_default("config/voyagent.yaml")?;
//! config.validate()?;
//!
//! // Component wiring would go here
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod itinerary;
pub mod reasoning;
pub mod server;
pub mod session;
pub mod slots;

// Re-export commonly used types
pub use agent::Orchestrator;
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Result, VoyagentError};
pub use gateway::{AmadeusGateway, TravelGateway};
pub use itinerary::Itinerary;
pub use reasoning::{Interpretation, Interpreter, OpenAiInterpreter};
pub use session::{Session, SessionRegistry};
pub use slots::{Domain, SlotStore};
