//! Dialogue orchestration
//!
//! The orchestrator ties the interpreter, the slot store, the dispatcher,
//! and the itinerary together into one turn-handling loop.

pub mod orchestrator;

pub use orchestrator::Orchestrator;
