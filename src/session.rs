//! Conversation sessions and the process-wide session registry
//!
//! A session owns the append-only message transcript, the slot store, the
//! itinerary, and the cache of the most recent ranked search results per
//! domain (so "book the second option" can be resolved). Sessions are
//! created implicitly on first contact and live for the process lifetime.
//!
//! One turn is processed to completion before the next is accepted for
//! the same session; independent sessions run concurrently. The registry
//! enforces this with a per-session async mutex.

use crate::gateway::{
    FlightCriteria, FlightOffer, HotelCriteria, HotelOffer, TransferCriteria, TransferOffer,
    Traveler,
};
use crate::itinerary::Itinerary;
use crate::slots::{Domain, SlotStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Message sender role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user turns
    User,
    /// Orchestrator-composed replies
    Assistant,
    /// Tool results folded into the transcript
    Tool,
}

/// Message payload: plain text or a structure the presentation layer
/// pretty-prints (ranked listings, itineraries)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain conversational text
    Text(String),
    /// Structured payload for tabular/listing rendering
    Structured(serde_json::Value),
}

impl MessageContent {
    /// Text form of the content, serializing structures compactly
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Structured(value) => value.to_string(),
        }
    }
}

/// One transcript entry
///
/// Immutable once appended; the transcript is append-only and
/// order-significant (it is the interpreter's input context).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Sender role
    pub role: Role,
    /// Payload
    pub content: MessageContent,
    /// Append time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
            timestamp: Utc::now(),
        }
    }

    /// Creates a plain-text assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
            timestamp: Utc::now(),
        }
    }

    /// Creates an assistant message with structured content
    pub fn assistant_structured(value: serde_json::Value) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Structured(value),
            timestamp: Utc::now(),
        }
    }

    /// Creates a tool-result message
    pub fn tool(value: serde_json::Value) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::Structured(value),
            timestamp: Utc::now(),
        }
    }
}

/// The most recent ranked search results per domain
///
/// Replaced wholesale on each new search in a domain; selections like
/// "the second option" resolve against these, together with the criteria
/// the offers were searched with.
#[derive(Debug, Clone, Default)]
pub struct OfferCache {
    flights: Option<(Vec<FlightOffer>, FlightCriteria)>,
    hotels: Option<(Vec<HotelOffer>, HotelCriteria)>,
    transfers: Option<(Vec<TransferOffer>, TransferCriteria)>,
    last: Option<Domain>,
}

impl OfferCache {
    /// Stores a fresh flight search result set
    pub fn store_flights(&mut self, offers: Vec<FlightOffer>, criteria: FlightCriteria) {
        self.flights = Some((offers, criteria));
        self.last = Some(Domain::Flights);
    }

    /// Stores a fresh hotel search result set
    pub fn store_hotels(&mut self, offers: Vec<HotelOffer>, criteria: HotelCriteria) {
        self.hotels = Some((offers, criteria));
        self.last = Some(Domain::Hotels);
    }

    /// Stores a fresh transfer search result set
    pub fn store_transfers(&mut self, offers: Vec<TransferOffer>, criteria: TransferCriteria) {
        self.transfers = Some((offers, criteria));
        self.last = Some(Domain::Transfers);
    }

    /// The cached flight results, if a search ran
    pub fn flights(&self) -> Option<&(Vec<FlightOffer>, FlightCriteria)> {
        self.flights.as_ref()
    }

    /// The cached hotel results, if a search ran
    pub fn hotels(&self) -> Option<&(Vec<HotelOffer>, HotelCriteria)> {
        self.hotels.as_ref()
    }

    /// The cached transfer results, if a search ran
    pub fn transfers(&self) -> Option<&(Vec<TransferOffer>, TransferCriteria)> {
        self.transfers.as_ref()
    }

    /// Which domain most recently stored results
    ///
    /// Used to resolve a bare "book option N" when the interpretation
    /// does not name a domain.
    pub fn last_domain(&self) -> Option<Domain> {
        self.last
    }

    /// Drops cached results for a domain (after its slots went stale)
    pub fn clear(&mut self, domain: Domain) {
        match domain {
            Domain::Flights => self.flights = None,
            Domain::Hotels => self.hotels = None,
            Domain::Transfers => self.transfers = None,
        }
        if self.last == Some(domain) {
            self.last = None;
        }
    }
}

/// One user's conversation state
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier, client-chosen
    pub id: String,
    /// Append-only message transcript
    pub transcript: Vec<Message>,
    /// Booking parameters collected so far
    pub slots: SlotStore,
    /// Confirmed bookings
    pub itinerary: Itinerary,
    /// Most recent ranked results per domain
    pub offers: OfferCache,
    /// Provider offer ids already confirmed, mapped to booking references
    ///
    /// Lets a repeated "book that one" return the existing booking instead
    /// of placing a second order.
    pub booked_offers: HashMap<String, String>,
    /// Traveler profile, seeded from configuration
    pub profile: Traveler,
}

impl Session {
    /// Creates a session with the given id and seed profile
    pub fn new(id: impl Into<String>, profile: Traveler) -> Self {
        Self {
            id: id.into(),
            transcript: Vec::new(),
            slots: SlotStore::new(),
            itinerary: Itinerary::new(),
            offers: OfferCache::default(),
            booked_offers: HashMap::new(),
            profile,
        }
    }

    /// Appends a message to the transcript
    pub fn push(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// The most recent `limit` transcript messages, oldest first
    pub fn recent_context(&self, limit: usize) -> &[Message] {
        let start = self.transcript.len().saturating_sub(limit);
        &self.transcript[start..]
    }
}

/// Process-wide session map with per-session turn serialization
///
/// Each session sits behind its own async mutex: turns for one session
/// run strictly one at a time, while different sessions proceed
/// concurrently on separate tasks.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
    default_profile: Traveler,
}

impl SessionRegistry {
    /// Creates a registry seeding new sessions with the given profile
    pub fn new(default_profile: Traveler) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            default_profile,
        }
    }

    /// Returns the session for an id, creating it on first contact
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::info!("creating session {}", id);
                Arc::new(Mutex::new(Session::new(id, self.default_profile.clone())))
            })
            .clone()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no session exists yet
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
