//! Turn interpretation
//!
//! Each user turn is handed to an interpreter which classifies the intent,
//! extracts slot values mentioned in the message, and proposes a
//! conversational reply for turns that need no tool call. The orchestrator
//! treats the interpretation as a proposal: slot merging, validation, and
//! all gateway calls stay on this side of the seam.

pub mod openai;

pub use openai::OpenAiInterpreter;

use crate::error::Result;
use crate::gateway::Traveler;
use crate::session::Message;
use crate::slots::{Domain, SlotStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the user is asking for this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Search for flight offers
    SearchFlights,
    /// Search for hotel offers
    SearchHotels,
    /// Search for airport transfer offers
    SearchTransfers,
    /// Confirm one of the previously listed offers
    ConfirmBooking,
    /// Show the accumulated itinerary
    ShowItinerary,
    /// Change traveler profile details
    UpdateProfile,
    /// The turn needs a clarifying question before anything can run
    Clarify,
    /// Greetings and chatter outside the booking flow
    Smalltalk,
}

/// One slot value extracted from the turn
///
/// An empty `value` clears the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotUpdate {
    /// Domain the field belongs to
    pub domain: Domain,
    /// Field name within the domain
    pub field: String,
    /// New value, or empty to clear
    pub value: String,
}

/// Structured reading of one user turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpretation {
    /// Classified intent
    pub intent: Intent,

    /// Slot values mentioned this turn
    #[serde(default)]
    pub slot_updates: Vec<SlotUpdate>,

    /// Traveler profile fields mentioned this turn, as (field, value)
    #[serde(default)]
    pub profile_updates: Vec<(String, String)>,

    /// 1-based offer selection for confirmations ("book the second option")
    #[serde(default)]
    pub selection: Option<usize>,

    /// Domain a confirmation targets, when the user named one
    #[serde(default)]
    pub domain: Option<Domain>,

    /// Proposed conversational reply for turns that need no tool call
    #[serde(default)]
    pub reply: Option<String>,
}

impl Interpretation {
    /// A bare interpretation carrying only an intent
    pub fn of(intent: Intent) -> Self {
        Self {
            intent,
            slot_updates: Vec::new(),
            profile_updates: Vec::new(),
            selection: None,
            domain: None,
            reply: None,
        }
    }
}

/// The reasoning seam
///
/// Implementations translate a transcript window plus current state into
/// an [`Interpretation`]. Any failure to obtain one maps to
/// `VoyagentError::ReasoningUnavailable`; the orchestrator then apologizes
/// without touching session state.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Interprets the latest user turn
    ///
    /// # Arguments
    ///
    /// * `context` - Recent transcript messages, oldest first, ending with
    ///   the turn being interpreted
    /// * `slots` - Booking parameters collected so far
    /// * `profile` - Current traveler profile
    async fn interpret(
        &self,
        context: &[Message],
        slots: &SlotStore,
        profile: &Traveler,
    ) -> Result<Interpretation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serialization() {
        assert_eq!(
            serde_json::to_string(&Intent::SearchFlights).unwrap(),
            "\"search_flights\""
        );
        assert_eq!(
            serde_json::from_str::<Intent>("\"confirm_booking\"").unwrap(),
            Intent::ConfirmBooking
        );
    }

    #[test]
    fn test_interpretation_deserializes_with_defaults() {
        let parsed: Interpretation =
            serde_json::from_str(r#"{"intent": "smalltalk", "reply": "Hello!"}"#).unwrap();
        assert_eq!(parsed.intent, Intent::Smalltalk);
        assert!(parsed.slot_updates.is_empty());
        assert_eq!(parsed.reply.as_deref(), Some("Hello!"));
    }

    #[test]
    fn test_slot_update_deserializes() {
        let parsed: SlotUpdate = serde_json::from_str(
            r#"{"domain": "flights", "field": "origin", "value": "JFK"}"#,
        )
        .unwrap();
        assert_eq!(parsed.domain, Domain::Flights);
        assert_eq!(parsed.field, "origin");
    }
}
