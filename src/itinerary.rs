//! Session itinerary accumulation and rendering
//!
//! The itinerary collects confirmed bookings keyed by provider reference
//! id, which makes insertion idempotent: re-confirming the same reference
//! never duplicates an entry. Rendering follows trip chronology (flights,
//! then hotels, then transfers, each sorted by date) regardless of the
//! order bookings were made in.

use crate::gateway::Booking;
use crate::slots::Domain;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Ordered, de-duplicated collection of the session's confirmed bookings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Itinerary {
    bookings: Vec<Booking>,
}

impl Itinerary {
    /// Creates an empty itinerary
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a confirmed booking
    ///
    /// # Returns
    ///
    /// Returns false when a booking with the same provider reference is
    /// already present (the insertion is skipped)
    pub fn add(&mut self, booking: Booking) -> bool {
        if self.get(&booking.reference).is_some() {
            tracing::debug!(
                "booking {} already in itinerary, skipping duplicate",
                booking.reference
            );
            return false;
        }
        self.bookings.push(booking);
        true
    }

    /// Looks up a booking by provider reference
    pub fn get(&self, reference: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.reference == reference)
    }

    /// Whether any booking exists in the given domain
    pub fn has_domain(&self, domain: Domain) -> bool {
        self.bookings.iter().any(|b| b.domain == domain)
    }

    /// Bookings in a domain, unsorted
    pub fn in_domain(&self, domain: Domain) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter(move |b| b.domain == domain)
    }

    /// Number of bookings held
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// Whether the itinerary is empty
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Bookings in trip-chronological order: flights by departure, then
    /// hotels by check-in, then transfers by pickup time
    pub fn ordered(&self) -> Vec<&Booking> {
        let mut ordered = Vec::with_capacity(self.bookings.len());
        for domain in Domain::ALL {
            let mut in_domain: Vec<&Booking> = self.in_domain(domain).collect();
            in_domain.sort_by_key(|b| b.starts_at);
            ordered.extend(in_domain);
        }
        ordered
    }

    /// Renders the itinerary as display text
    pub fn render_text(&self) -> String {
        if self.bookings.is_empty() {
            return "Your itinerary is empty so far.".to_string();
        }
        let mut lines = vec!["Your trip itinerary:".to_string()];
        for (index, booking) in self.ordered().iter().enumerate() {
            lines.push(format!(
                "{}. [{}] {} (ref {}, {})",
                index + 1,
                domain_label(booking.domain),
                booking.summary,
                booking.reference,
                booking.price
            ));
        }
        lines.join("\n")
    }

    /// Renders the itinerary as a structured value for the presentation layer
    pub fn render_value(&self) -> serde_json::Value {
        json!({
            "itinerary": self
                .ordered()
                .iter()
                .map(|booking| json!({
                    "kind": booking.domain,
                    "reference": booking.reference,
                    "summary": booking.summary,
                    "price": booking.price,
                    "starts_at": booking.starts_at,
                }))
                .collect::<Vec<_>>(),
        })
    }
}

fn domain_label(domain: Domain) -> &'static str {
    match domain {
        Domain::Flights => "Flight",
        Domain::Hotels => "Hotel",
        Domain::Transfers => "Transfer",
    }
}
