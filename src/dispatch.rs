//! Tool dispatch
//!
//! The dispatcher sits between the orchestrator and the travel gateway.
//! It validates slot readiness before every search, builds typed criteria
//! from the slot store, runs exactly one gateway operation per call, caps
//! ranked results to the configured limit, and caches results on the
//! session so later selections can be resolved.
//!
//! Confirmation is idempotent at this layer: an offer id that was already
//! confirmed in the session returns its existing booking without another
//! gateway call.

use crate::config::GatewayConfig;
use crate::error::{Result, VoyagentError};
use crate::gateway::{
    Booking, ConfirmSelection, FlightCriteria, FlightOffer, HotelCriteria, HotelOffer,
    TransferCriteria, TransferOffer, TravelGateway,
};
use crate::session::Session;
use crate::slots::{Domain, SlotStore};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// Outcome of a confirmation request
#[derive(Debug, Clone)]
pub struct ConfirmOutcome {
    /// The booking, freshly placed or already held
    pub booking: Booking,
    /// True when the offer was already confirmed earlier in the session
    pub repeated: bool,
}

/// Validates, routes, and caps gateway operations
pub struct Dispatcher {
    gateway: Arc<dyn TravelGateway>,
    max_results: usize,
}

impl Dispatcher {
    /// Creates a dispatcher over a gateway
    pub fn new(gateway: Arc<dyn TravelGateway>, config: &GatewayConfig) -> Self {
        Self {
            gateway,
            max_results: config.max_results,
        }
    }

    /// Runs a flight search for the session's collected flight slots
    ///
    /// # Errors
    ///
    /// Returns `VoyagentError::StaleSlots` when the domain is stale and
    /// needs reconfirmation, and `VoyagentError::MissingSlots` naming the
    /// absent or invalid fields when the domain is not ready
    pub async fn search_flights(&self, session: &mut Session) -> Result<Vec<FlightOffer>> {
        self.check_ready(&session.slots, Domain::Flights)?;
        let criteria = flight_criteria(&session.slots)?;

        tracing::info!(
            "searching flights {} -> {} on {}",
            criteria.origin,
            criteria.destination,
            criteria.depart_date
        );
        let mut offers = self.gateway.search_flights(&criteria).await?;
        offers.truncate(self.max_results);

        session.offers.store_flights(offers.clone(), criteria);
        Ok(offers)
    }

    /// Runs a hotel search for the session's collected hotel slots
    pub async fn search_hotels(&self, session: &mut Session) -> Result<Vec<HotelOffer>> {
        self.check_ready(&session.slots, Domain::Hotels)?;
        let criteria = hotel_criteria(&session.slots)?;

        tracing::info!(
            "searching hotels in {} for {} nights",
            criteria.city_code,
            (criteria.check_out - criteria.check_in).num_days()
        );
        let mut offers = self.gateway.search_hotels(&criteria).await?;
        offers.truncate(self.max_results);

        session.offers.store_hotels(offers.clone(), criteria);
        Ok(offers)
    }

    /// Runs a transfer search for the session's collected transfer slots
    pub async fn search_transfers(&self, session: &mut Session) -> Result<Vec<TransferOffer>> {
        self.check_ready(&session.slots, Domain::Transfers)?;
        let criteria = transfer_criteria(&session.slots)?;

        tracing::info!(
            "searching transfers from {} at {}",
            criteria.pickup,
            criteria.datetime
        );
        let mut offers = self.gateway.search_transfers(&criteria).await?;
        offers.truncate(self.max_results);

        session.offers.store_transfers(offers.clone(), criteria);
        Ok(offers)
    }

    /// Confirms a selected offer into a booking
    ///
    /// An offer id the session already confirmed returns the held booking
    /// with `repeated` set, without contacting the gateway.
    pub async fn confirm(
        &self,
        session: &mut Session,
        selection: ConfirmSelection,
    ) -> Result<ConfirmOutcome> {
        let offer_id = selection.offer_id().to_string();

        if let Some(reference) = session.booked_offers.get(&offer_id) {
            if let Some(existing) = session.itinerary.get(reference) {
                tracing::info!(
                    "offer {} already confirmed as {}, skipping gateway call",
                    offer_id,
                    reference
                );
                return Ok(ConfirmOutcome {
                    booking: existing.clone(),
                    repeated: true,
                });
            }
        }

        let booking = self.gateway.confirm(&selection).await?;
        session.itinerary.add(booking.clone());
        session.booked_offers.insert(offer_id, booking.reference.clone());

        tracing::info!(
            "confirmed {} booking {}",
            selection.domain(),
            booking.reference
        );
        Ok(ConfirmOutcome {
            booking,
            repeated: false,
        })
    }

    fn check_ready(&self, slots: &SlotStore, domain: Domain) -> Result<()> {
        if slots.is_stale(domain) {
            return Err(VoyagentError::StaleSlots {
                domain,
                message: format!(
                    "your earlier {} details may no longer match the rest of the trip; \
                     please confirm them before searching again",
                    domain
                ),
            }
            .into());
        }
        let missing = slots.missing(domain);
        if !missing.is_empty() {
            return Err(VoyagentError::MissingSlots {
                domain,
                fields: missing.iter().map(|f| f.to_string()).collect(),
            }
            .into());
        }
        if !slots.is_ready(domain) {
            // Present and individually valid, but mutually inconsistent
            // (return before departure, check-out not after check-in).
            let field = match domain {
                Domain::Flights => "return_date",
                Domain::Hotels => "check_out",
                Domain::Transfers => "datetime",
            };
            return Err(VoyagentError::MissingSlots {
                domain,
                fields: vec![field.to_string()],
            }
            .into());
        }
        Ok(())
    }
}

fn parse_date(slots: &SlotStore, domain: Domain, field: &str) -> Result<NaiveDate> {
    let value = require(slots, domain, field)?;
    value.parse().map_err(|_| {
        VoyagentError::MissingSlots {
            domain,
            fields: vec![field.to_string()],
        }
        .into()
    })
}

fn parse_count(slots: &SlotStore, domain: Domain, field: &str) -> Result<u32> {
    let value = require(slots, domain, field)?;
    match value.parse() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(VoyagentError::MissingSlots {
            domain,
            fields: vec![field.to_string()],
        }
        .into()),
    }
}

fn require<'a>(slots: &'a SlotStore, domain: Domain, field: &str) -> Result<&'a str> {
    slots.get(domain, field).ok_or_else(|| {
        VoyagentError::MissingSlots {
            domain,
            fields: vec![field.to_string()],
        }
        .into()
    })
}

fn flight_criteria(slots: &SlotStore) -> Result<FlightCriteria> {
    let domain = Domain::Flights;
    let return_date = match slots.get(domain, "return_date") {
        Some(_) => Some(parse_date(slots, domain, "return_date")?),
        None => None,
    };
    Ok(FlightCriteria {
        origin: require(slots, domain, "origin")?.to_uppercase(),
        destination: require(slots, domain, "destination")?.to_uppercase(),
        depart_date: parse_date(slots, domain, "depart_date")?,
        return_date,
        passengers: parse_count(slots, domain, "passengers")?,
    })
}

fn hotel_criteria(slots: &SlotStore) -> Result<HotelCriteria> {
    let domain = Domain::Hotels;
    Ok(HotelCriteria {
        city_code: require(slots, domain, "destination")?.to_uppercase(),
        check_in: parse_date(slots, domain, "check_in")?,
        check_out: parse_date(slots, domain, "check_out")?,
        guests: parse_count(slots, domain, "guests")?,
    })
}

fn transfer_criteria(slots: &SlotStore) -> Result<TransferCriteria> {
    let domain = Domain::Transfers;
    let datetime: NaiveDateTime = {
        let value = require(slots, domain, "datetime")?;
        value.parse().map_err(|_| VoyagentError::MissingSlots {
            domain,
            fields: vec!["datetime".to_string()],
        })?
    };
    Ok(TransferCriteria {
        pickup: require(slots, domain, "pickup")?.to_uppercase(),
        dropoff: require(slots, domain, "dropoff")?.to_string(),
        datetime,
        passengers: parse_count(slots, domain, "passengers")?,
    })
}
