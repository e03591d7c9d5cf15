//! Travel gateway abstraction and common types
//!
//! This module defines the TravelGateway trait that adapts the external
//! travel-data provider's flight/hotel/transfer endpoints into internal
//! ranked-offer and booking shapes, along with the criteria types built
//! from validated slot sets.

pub mod amadeus;
pub mod token;

pub use amadeus::AmadeusGateway;
pub use token::{FileTokenSource, TokenSource};

use crate::error::Result;
use crate::slots::Domain;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Monetary amount as reported by the provider
///
/// Amounts stay provider-formatted strings; this system never does
/// arithmetic on prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Decimal amount, provider-formatted (e.g. "345.60")
    pub amount: String,
    /// ISO currency code (e.g. "USD")
    pub currency: String,
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// One leg of a flight offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSegment {
    /// Marketing carrier code (e.g. "AA")
    pub carrier: String,
    /// Flight number within the carrier
    pub number: String,
    /// Departure airport IATA code
    pub departure_airport: String,
    /// Departure time, provider local
    pub departure_time: NaiveDateTime,
    /// Arrival airport IATA code
    pub arrival_airport: String,
    /// Arrival time, provider local
    pub arrival_time: NaiveDateTime,
}

/// A ranked flight search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOffer {
    /// Provider offer id, required for confirmation
    pub id: String,
    /// Total price for all travelers
    pub price: Price,
    /// Itinerary segments in travel order
    pub segments: Vec<FlightSegment>,
    /// Number of stops (segments minus one)
    pub stops: usize,
    /// Total duration as reported by the provider (ISO 8601)
    pub duration: String,
}

impl FlightOffer {
    /// Short one-line description for ranked listings
    pub fn summary(&self) -> String {
        let route = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => {
                format!("{} -> {}", first.departure_airport, last.arrival_airport)
            }
            _ => "unknown route".to_string(),
        };
        format!("{} ({} stops) {}", route, self.stops, self.price)
    }

    /// Departure time of the first segment, used for itinerary ordering
    pub fn departure(&self) -> Option<NaiveDateTime> {
        self.segments.first().map(|s| s.departure_time)
    }
}

/// A bookable room within a hotel offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomOffer {
    /// Room category (e.g. "DELUXE_ROOM")
    pub category: String,
    /// Bed type as reported by the provider
    pub bed_type: String,
    /// Room price for the stay
    pub price: Price,
    /// Whether the rate is refundable
    pub refundable: bool,
}

/// A ranked hotel search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelOffer {
    /// Provider hotel id
    pub id: String,
    /// Hotel display name
    pub name: String,
    /// Star rating, provider-formatted
    pub rating: String,
    /// Street address line plus city
    pub address: String,
    /// Available rooms, provider order
    pub rooms: Vec<RoomOffer>,
    /// Cheapest available room price
    pub price: Price,
}

impl HotelOffer {
    /// Short one-line description for ranked listings
    pub fn summary(&self) -> String {
        format!("{} ({}*) from {}", self.name, self.rating, self.price)
    }
}

/// A ranked ground transfer search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOffer {
    /// Provider transfer offer id
    pub id: String,
    /// Vehicle code (e.g. "SDN")
    pub vehicle: String,
    /// Human-readable vehicle description
    pub vehicle_description: String,
    /// Transfer service provider name
    pub provider_name: String,
    /// Ride duration, derived from start and end times
    pub duration: String,
    /// Quoted price
    pub price: Price,
}

impl TransferOffer {
    /// Short one-line description for ranked listings
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) by {} - {}",
            self.vehicle_description, self.duration, self.provider_name, self.price
        )
    }
}

/// Flight search criteria built from a ready flight slot set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightCriteria {
    /// Origin airport IATA code
    pub origin: String,
    /// Destination airport IATA code
    pub destination: String,
    /// Outbound date
    pub depart_date: NaiveDate,
    /// Return date; absent means a one-way search
    pub return_date: Option<NaiveDate>,
    /// Traveler count, >= 1
    pub passengers: u32,
}

/// Hotel search criteria built from a ready hotel slot set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelCriteria {
    /// Destination city IATA code
    pub city_code: String,
    /// Check-in date
    pub check_in: NaiveDate,
    /// Check-out date, strictly after check-in
    pub check_out: NaiveDate,
    /// Guest count, >= 1
    pub guests: u32,
}

/// Transfer search criteria built from a ready transfer slot set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCriteria {
    /// Pickup airport IATA code
    pub pickup: String,
    /// Free-form drop-off description (hotel name and address)
    pub dropoff: String,
    /// Pickup time
    pub datetime: NaiveDateTime,
    /// Passenger count, >= 1
    pub passengers: u32,
}

/// Traveler identity passed to booking confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traveler {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth, YYYY-MM-DD
    pub date_of_birth: String,
    /// Contact email address
    pub email: String,
    /// Contact phone number without country code
    pub phone: String,
}

/// The offer a confirm operation applies to
///
/// Carries everything the gateway needs to complete the provider's booking
/// flow for one travel product.
#[derive(Debug, Clone)]
pub enum ConfirmSelection {
    /// Confirm a flight offer through the provider's order flow
    Flight {
        /// Offer selected from a prior search
        offer: FlightOffer,
        /// Criteria the offer was searched with
        criteria: FlightCriteria,
        /// Traveler identity for the order
        traveler: Traveler,
    },
    /// Confirm a hotel stay
    Hotel {
        /// Offer selected from a prior search
        offer: HotelOffer,
        /// Criteria the offer was searched with
        criteria: HotelCriteria,
    },
    /// Confirm a ground transfer
    Transfer {
        /// Offer selected from a prior search
        offer: TransferOffer,
        /// Criteria the offer was searched with
        criteria: TransferCriteria,
    },
}

impl ConfirmSelection {
    /// The booking domain this selection belongs to
    pub fn domain(&self) -> Domain {
        match self {
            ConfirmSelection::Flight { .. } => Domain::Flights,
            ConfirmSelection::Hotel { .. } => Domain::Hotels,
            ConfirmSelection::Transfer { .. } => Domain::Transfers,
        }
    }

    /// The provider offer id being confirmed
    pub fn offer_id(&self) -> &str {
        match self {
            ConfirmSelection::Flight { offer, .. } => &offer.id,
            ConfirmSelection::Hotel { offer, .. } => &offer.id,
            ConfirmSelection::Transfer { offer, .. } => &offer.id,
        }
    }
}

/// A confirmed booking
///
/// Created only from a successful confirm result; immutable afterward.
/// `starts_at` is the trip-chronology key: flight departure, hotel
/// check-in, or transfer pickup time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Provider reference id; itinerary de-duplication key
    pub reference: String,
    /// Booking category
    pub domain: Domain,
    /// Display summary for itinerary rendering
    pub summary: String,
    /// Confirmed price
    pub price: Price,
    /// Chronology key within the category
    pub starts_at: NaiveDateTime,
}

/// Adapter over the travel-data provider's search and booking endpoints
///
/// Implementations own credential injection and retry behavior: search
/// operations may be retried on transient failures, confirm operations
/// never are (risk of duplicate bookings).
///
/// # Examples
///
/// ```no_run
/// use voyagent::gateway::{TravelGateway, FlightCriteria};
/// use voyagent::error::Result;
/// use async_trait::async_trait;
///
/// struct StubGateway;
///
/// #[async_trait]
/// impl TravelGateway for StubGateway {
///     async fn search_flights(
///         &self,
///         _criteria: &FlightCriteria,
///     ) -> Result<Vec<voyagent::gateway::FlightOffer>> {
///         Ok(vec![])
///     }
///     // ... remaining methods elided
///     # async fn search_hotels(&self, _c: &voyagent::gateway::HotelCriteria) -> Result<Vec<voyagent::gateway::HotelOffer>> { Ok(vec![]) }
///     # async fn search_transfers(&self, _c: &voyagent::gateway::TransferCriteria) -> Result<Vec<voyagent::gateway::TransferOffer>> { Ok(vec![]) }
///     # async fn confirm(&self, _s: &voyagent::gateway::ConfirmSelection) -> Result<voyagent::gateway::Booking> { unimplemented!() }
/// }
/// ```
#[async_trait]
pub trait TravelGateway: Send + Sync {
    /// Searches flight offers, returned in provider ranking order
    async fn search_flights(&self, criteria: &FlightCriteria) -> Result<Vec<FlightOffer>>;

    /// Searches hotel offers, returned in provider ranking order
    async fn search_hotels(&self, criteria: &HotelCriteria) -> Result<Vec<HotelOffer>>;

    /// Searches transfer offers, returned in provider ranking order
    async fn search_transfers(&self, criteria: &TransferCriteria) -> Result<Vec<TransferOffer>>;

    /// Confirms a previously searched offer into a booking
    ///
    /// # Errors
    ///
    /// Returns `VoyagentError::BookingFailed` when the provider declines
    /// the confirmation; never silently retries.
    async fn confirm(&self, selection: &ConfirmSelection) -> Result<Booking>;
}
