//! Booking slot storage and readiness validation
//!
//! This module holds the structured booking parameters collected over the
//! conversation, grouped per booking domain (flights, hotels, transfers).
//! Each domain carries a fixed required-field table and a staleness flag:
//! when an upstream value changes (e.g. a new flight destination after
//! hotels were already searched), the dependent domain is marked stale so
//! the user is asked to reconfirm instead of silently reusing old values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Booking domain grouping the slots for one travel product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Flight search and booking slots
    Flights,
    /// Hotel search and booking slots
    Hotels,
    /// Ground transfer slots
    Transfers,
}

impl Domain {
    /// All domains in trip-chronological order
    pub const ALL: [Domain; 3] = [Domain::Flights, Domain::Hotels, Domain::Transfers];
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Flights => write!(f, "flights"),
            Domain::Hotels => write!(f, "hotels"),
            Domain::Transfers => write!(f, "transfers"),
        }
    }
}

/// Required fields per domain
///
/// `return_date` is deliberately absent from the flights table: a missing
/// return date means a one-way search, not an incomplete slot set. When
/// present it still must order after `depart_date`.
pub fn required_fields(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Flights => &["origin", "destination", "depart_date", "passengers"],
        Domain::Hotels => &["destination", "check_in", "check_out", "guests"],
        Domain::Transfers => &["pickup", "dropoff", "datetime", "passengers"],
    }
}

fn iata_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]{3}$").expect("static regex"))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok()
}

fn parse_count(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// Per-domain slot values plus the staleness flag
///
/// Values survive invalidation: marking a domain stale clears readiness
/// without losing what the user already entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainSlots {
    values: BTreeMap<String, String>,
    stale: bool,
}

impl DomainSlots {
    /// Returns the stored value for a field, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Returns all stored values
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

/// Holds the booking parameters collected so far for one session
///
/// Readiness is a pure, total function of the stored values: every required
/// field must be present, non-empty, and pass domain-specific validation
/// (date ordering, IATA code shape, counts >= 1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotStore {
    flights: DomainSlots,
    hotels: DomainSlots,
    transfers: DomainSlots,
}

impl SlotStore {
    /// Creates an empty slot store
    pub fn new() -> Self {
        Self::default()
    }

    fn domain(&self, domain: Domain) -> &DomainSlots {
        match domain {
            Domain::Flights => &self.flights,
            Domain::Hotels => &self.hotels,
            Domain::Transfers => &self.transfers,
        }
    }

    fn domain_mut(&mut self, domain: Domain) -> &mut DomainSlots {
        match domain {
            Domain::Flights => &mut self.flights,
            Domain::Hotels => &mut self.hotels,
            Domain::Transfers => &mut self.transfers,
        }
    }

    /// Returns the stored value for a field in a domain
    pub fn get(&self, domain: Domain, field: &str) -> Option<&str> {
        self.domain(domain).get(field)
    }

    /// Returns the full slot map for a domain
    pub fn values(&self, domain: Domain) -> &BTreeMap<String, String> {
        self.domain(domain).values()
    }

    /// Merges extracted slot values into a domain
    ///
    /// New values overwrite matching keys; an empty value removes the key.
    /// Changing a field another domain depends on (flight destination or
    /// dates feed hotels and transfers; hotel destination or dates feed
    /// transfers) marks the dependent domains stale. Merging into a domain
    /// counts as the user re-confirming it, so its own stale flag clears.
    ///
    /// # Arguments
    ///
    /// * `domain` - Domain the updates belong to
    /// * `updates` - Field name/value pairs extracted from the user turn
    ///
    /// # Returns
    ///
    /// Returns the list of dependent domains that were invalidated
    pub fn merge<I, K, V>(&mut self, domain: Domain, updates: I) -> Vec<Domain>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut changed_upstream = false;
        let slots = self.domain_mut(domain);

        for (field, value) in updates {
            let field = field.into();
            let value = value.into();
            let previous = slots.values.get(&field).cloned();

            if value.is_empty() {
                slots.values.remove(&field);
            } else {
                slots.values.insert(field.clone(), value.clone());
            }

            let actually_changed = previous.as_deref() != Some(value.as_str());
            if actually_changed && dependency_field(domain, &field) {
                changed_upstream = true;
            }
        }
        slots.stale = false;

        let mut invalidated = Vec::new();
        if changed_upstream {
            for dependent in dependents_of(domain) {
                let dep = self.domain_mut(*dependent);
                // Only flag domains the user has actually started filling in
                if !dep.values.is_empty() && !dep.stale {
                    dep.stale = true;
                    invalidated.push(*dependent);
                }
            }
        }
        invalidated
    }

    /// Names of required fields that are absent or failing validation
    pub fn missing(&self, domain: Domain) -> Vec<&'static str> {
        let slots = self.domain(domain);
        required_fields(domain)
            .iter()
            .filter(|field| {
                !slots
                    .get(field)
                    .map(|value| field_is_valid(domain, field, value, &slots.values))
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }

    /// Whether all required fields for a domain are present, valid, and
    /// internally consistent, and the domain has not been invalidated
    pub fn is_ready(&self, domain: Domain) -> bool {
        !self.domain(domain).stale
            && self.missing(domain).is_empty()
            && self.cross_field_consistent(domain)
    }

    /// Whether the domain was invalidated by an upstream change
    pub fn is_stale(&self, domain: Domain) -> bool {
        self.domain(domain).stale
    }

    /// Marks a domain as needing user reconfirmation, keeping its values
    pub fn invalidate(&mut self, domain: Domain) {
        self.domain_mut(domain).stale = true;
    }

    fn cross_field_consistent(&self, domain: Domain) -> bool {
        let slots = self.domain(domain);
        match domain {
            Domain::Flights => {
                // return_date is optional but must order after depart_date
                match (slots.get("depart_date"), slots.get("return_date")) {
                    (Some(depart), Some(ret)) => match (parse_date(depart), parse_date(ret)) {
                        (Some(d), Some(r)) => r >= d,
                        _ => false,
                    },
                    _ => true,
                }
            }
            Domain::Hotels => match (slots.get("check_in"), slots.get("check_out")) {
                (Some(check_in), Some(check_out)) => {
                    match (parse_date(check_in), parse_date(check_out)) {
                        (Some(ci), Some(co)) => co > ci,
                        _ => false,
                    }
                }
                _ => true,
            },
            Domain::Transfers => true,
        }
    }
}

/// Whether a field in `domain` feeds downstream domains
fn dependency_field(domain: Domain, field: &str) -> bool {
    match domain {
        Domain::Flights => matches!(field, "destination" | "depart_date" | "return_date"),
        Domain::Hotels => matches!(field, "destination" | "check_in" | "check_out"),
        Domain::Transfers => false,
    }
}

/// Domains whose readiness depends on values in `domain`
fn dependents_of(domain: Domain) -> &'static [Domain] {
    match domain {
        Domain::Flights => &[Domain::Hotels, Domain::Transfers],
        Domain::Hotels => &[Domain::Transfers],
        Domain::Transfers => &[],
    }
}

/// Validates a single slot value for its domain
fn field_is_valid(
    domain: Domain,
    field: &str,
    value: &str,
    _all: &BTreeMap<String, String>,
) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    match (domain, field) {
        (Domain::Flights, "origin") | (Domain::Flights, "destination") => {
            iata_re().is_match(value)
        }
        (Domain::Flights, "depart_date") | (Domain::Flights, "return_date") => {
            parse_date(value).is_some()
        }
        (Domain::Flights, "passengers") | (Domain::Transfers, "passengers") => {
            parse_count(value).is_some()
        }
        (Domain::Hotels, "destination") => iata_re().is_match(value),
        (Domain::Hotels, "check_in") | (Domain::Hotels, "check_out") => parse_date(value).is_some(),
        (Domain::Hotels, "guests") => parse_count(value).is_some(),
        (Domain::Transfers, "pickup") => iata_re().is_match(value),
        (Domain::Transfers, "datetime") => parse_datetime(value).is_some(),
        // Free-form fields (transfer dropoff address, anything optional)
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_flight_updates() -> Vec<(&'static str, &'static str)> {
        vec![
            ("origin", "JFK"),
            ("destination", "LAX"),
            ("depart_date", "2024-06-01"),
            ("passengers", "1"),
        ]
    }

    #[test]
    fn test_empty_store_not_ready() {
        let store = SlotStore::new();
        for domain in Domain::ALL {
            assert!(!store.is_ready(domain));
            assert!(!store.missing(domain).is_empty());
        }
    }

    #[test]
    fn test_flights_ready_without_return_date() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        assert!(store.is_ready(Domain::Flights));
        assert!(store.missing(Domain::Flights).is_empty());
    }

    #[test]
    fn test_missing_names_exact_fields() {
        let mut store = SlotStore::new();
        store.merge(
            Domain::Flights,
            vec![("origin", "JFK"), ("destination", "LAX")],
        );
        let missing = store.missing(Domain::Flights);
        assert_eq!(missing, vec!["depart_date", "passengers"]);
    }

    #[test]
    fn test_invalid_iata_code_counts_as_missing() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        store.merge(Domain::Flights, vec![("origin", "New York")]);
        assert!(!store.is_ready(Domain::Flights));
        assert!(store.missing(Domain::Flights).contains(&"origin"));
    }

    #[test]
    fn test_return_before_departure_blocks_readiness() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        store.merge(Domain::Flights, vec![("return_date", "2024-05-01")]);
        assert!(!store.is_ready(Domain::Flights));

        store.merge(Domain::Flights, vec![("return_date", "2024-06-08")]);
        assert!(store.is_ready(Domain::Flights));
    }

    #[test]
    fn test_hotel_checkout_must_follow_checkin() {
        let mut store = SlotStore::new();
        store.merge(
            Domain::Hotels,
            vec![
                ("destination", "PAR"),
                ("check_in", "2024-06-01"),
                ("check_out", "2024-06-01"),
                ("guests", "2"),
            ],
        );
        assert!(!store.is_ready(Domain::Hotels));

        store.merge(Domain::Hotels, vec![("check_out", "2024-06-05")]);
        assert!(store.is_ready(Domain::Hotels));
    }

    #[test]
    fn test_zero_passengers_invalid() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        store.merge(Domain::Flights, vec![("passengers", "0")]);
        assert!(!store.is_ready(Domain::Flights));
    }

    #[test]
    fn test_removing_required_field_drops_readiness() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        assert!(store.is_ready(Domain::Flights));

        store.merge(Domain::Flights, vec![("depart_date", "")]);
        assert!(!store.is_ready(Domain::Flights));
        assert!(store.missing(Domain::Flights).contains(&"depart_date"));
    }

    #[test]
    fn test_destination_change_invalidates_hotels_and_transfers() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        store.merge(
            Domain::Hotels,
            vec![
                ("destination", "LAX"),
                ("check_in", "2024-06-01"),
                ("check_out", "2024-06-05"),
                ("guests", "1"),
            ],
        );
        store.merge(
            Domain::Transfers,
            vec![("pickup", "LAX"), ("dropoff", "Hotel Roosevelt")],
        );
        assert!(store.is_ready(Domain::Hotels));

        let invalidated = store.merge(Domain::Flights, vec![("destination", "SFO")]);
        assert_eq!(invalidated, vec![Domain::Hotels, Domain::Transfers]);
        assert!(store.is_stale(Domain::Hotels));
        assert!(!store.is_ready(Domain::Hotels));
        // Stored values survive the invalidation
        assert_eq!(store.get(Domain::Hotels, "check_in"), Some("2024-06-01"));
    }

    #[test]
    fn test_unchanged_value_does_not_invalidate() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        store.merge(
            Domain::Hotels,
            vec![("destination", "LAX"), ("check_in", "2024-06-01")],
        );

        let invalidated = store.merge(Domain::Flights, vec![("destination", "LAX")]);
        assert!(invalidated.is_empty());
        assert!(!store.is_stale(Domain::Hotels));
    }

    #[test]
    fn test_empty_dependent_domain_not_flagged() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        let invalidated = store.merge(Domain::Flights, vec![("destination", "SFO")]);
        // Nothing was collected for hotels or transfers yet
        assert!(invalidated.is_empty());
    }

    #[test]
    fn test_merge_into_stale_domain_reconfirms_it() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        store.merge(
            Domain::Hotels,
            vec![
                ("destination", "LAX"),
                ("check_in", "2024-06-01"),
                ("check_out", "2024-06-05"),
                ("guests", "1"),
            ],
        );
        store.merge(Domain::Flights, vec![("destination", "SFO")]);
        assert!(store.is_stale(Domain::Hotels));

        store.merge(Domain::Hotels, vec![("destination", "SFO")]);
        assert!(!store.is_stale(Domain::Hotels));
        assert!(store.is_ready(Domain::Hotels));
    }

    #[test]
    fn test_transfer_datetime_format() {
        let mut store = SlotStore::new();
        store.merge(
            Domain::Transfers,
            vec![
                ("pickup", "CDG"),
                ("dropoff", "Hotel Lutetia, 45 Boulevard Raspail, Paris"),
                ("datetime", "2024-06-01T14:30:00"),
                ("passengers", "2"),
            ],
        );
        assert!(store.is_ready(Domain::Transfers));

        store.merge(Domain::Transfers, vec![("datetime", "2024-06-01 14:30")]);
        assert!(!store.is_ready(Domain::Transfers));
    }

    #[test]
    fn test_domain_display() {
        assert_eq!(Domain::Flights.to_string(), "flights");
        assert_eq!(Domain::Hotels.to_string(), "hotels");
        assert_eq!(Domain::Transfers.to_string(), "transfers");
    }

    #[test]
    fn test_slot_store_serialization_round_trip() {
        let mut store = SlotStore::new();
        store.merge(Domain::Flights, ready_flight_updates());
        let json = serde_json::to_string(&store).unwrap();
        let restored: SlotStore = serde_json::from_str(&json).unwrap();
        assert!(restored.is_ready(Domain::Flights));
    }
}
