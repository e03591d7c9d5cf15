//! Error types for Voyagent
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! Only conversation-facing kinds (`MissingSlots`, `SlotConflict`,
//! `StaleSlots`, `BookingFailed`, and the degraded gateway/reasoning
//! outcomes) are ever turned into user-visible replies; everything else
//! stays internal.

use thiserror::Error;

use crate::slots::Domain;

/// Main error type for Voyagent operations
///
/// This enum encompasses all possible errors that can occur during
/// a conversation turn: interpreting the user message, validating booking
/// slots, calling the travel-data provider, and composing the reply.
#[derive(Error, Debug)]
pub enum VoyagentError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The reasoning capability could not interpret the turn
    ///
    /// The turn aborts with an apology and no session state is mutated.
    #[error("Reasoning capability unavailable: {0}")]
    ReasoningUnavailable(String),

    /// Required booking slots are missing for a domain
    ///
    /// Recoverable: the orchestrator converts this into a clarifying
    /// question naming exactly the missing fields.
    #[error("Missing required {domain} fields: {}", fields.join(", "))]
    MissingSlots {
        /// The booking domain whose readiness check failed
        domain: Domain,
        /// Names of the required fields that are absent or invalid
        fields: Vec<String>,
    },

    /// Token expired and the retry-after-refresh also failed
    ///
    /// Actionable: the external token refresh process may be down.
    #[error("Gateway authorization failed after refresh: {0}")]
    GatewayAuth(String),

    /// Network or rate-limit failure after retries were exhausted
    #[error("Gateway temporarily unavailable: {0}")]
    GatewayTransient(String),

    /// Provider declined a booking confirmation
    ///
    /// Never auto-retried; surfaced with an invitation to re-search.
    #[error("Booking failed: {reason}")]
    BookingFailed {
        /// Provider-supplied decline reason (detail field only)
        reason: String,
    },

    /// Newly extracted slot values contradict already-confirmed bookings
    #[error("Slot conflict in {domain}: {message}")]
    SlotConflict {
        /// The domain whose confirmed booking is contradicted
        domain: Domain,
        /// Description of the contradiction for the clarification reply
        message: String,
    },

    /// A domain was invalidated by an upstream change and its values need
    /// user reconfirmation before the next operation
    #[error("Stale {domain} details: {message}")]
    StaleSlots {
        /// The domain awaiting reconfirmation
        domain: Domain,
        /// Reconfirmation prompt for the clarification reply
        message: String,
    },

    /// Session lookup or turn-sequencing errors
    #[error("Session error: {0}")]
    Session(String),

    /// Gateway response could not be adapted into internal shapes
    #[error("Gateway response error: {0}")]
    GatewayResponse(String),

    /// IO errors (token file reads, config loads)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl VoyagentError {
    /// Whether this error is shown to the user as a conversational reply
    /// rather than failing the turn outright
    pub fn is_conversational(&self) -> bool {
        matches!(
            self,
            VoyagentError::MissingSlots { .. }
                | VoyagentError::SlotConflict { .. }
                | VoyagentError::StaleSlots { .. }
                | VoyagentError::BookingFailed { .. }
        )
    }
}

/// Result type alias for Voyagent operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
