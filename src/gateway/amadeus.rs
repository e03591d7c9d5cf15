//! Amadeus-backed travel gateway implementation
//!
//! Thin client over the provider's flight/hotel/transfer search and
//! booking endpoints. The bearer token is read fresh from the
//! [`TokenSource`] on every request. On a 401 the client triggers exactly
//! one token refresh and retries once; a second consecutive 401 surfaces
//! as `GatewayAuth` and is not retried again within the turn. Transient
//! failures (network, 429, 5xx) are retried with bounded exponential
//! backoff for idempotent search calls only; confirms are never silently
//! retried.

use crate::config::GatewayConfig;
use crate::error::{Result, VoyagentError};
use crate::gateway::token::TokenSource;
use crate::gateway::{
    Booking, ConfirmSelection, FlightCriteria, FlightOffer, FlightSegment, HotelCriteria,
    HotelOffer, Price, RoomOffer, TransferCriteria, TransferOffer, Traveler,
};
use crate::slots::Domain;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Flight offers search endpoint
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
/// Flight offer pricing confirmation endpoint
const FLIGHT_PRICING_PATH: &str = "/v1/shopping/flight-offers/pricing";
/// Flight order creation endpoint
const FLIGHT_ORDERS_PATH: &str = "/v1/booking/flight-orders";
/// Hotels-by-city reference endpoint
const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
/// Hotel offers endpoint
const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";
/// Transfer offers endpoint
const TRANSFER_OFFERS_PATH: &str = "/v1/shopping/transfer-offers";

/// Search radius for hotels-by-city, in kilometers
const HOTEL_RADIUS_KM: u32 = 5;
/// Re-search window floor when locating a previously listed offer
const CONFIRM_RESEARCH_MIN: usize = 10;

/// Gateway over the Amadeus travel-data API
pub struct AmadeusGateway {
    client: Client,
    api_base: String,
    currency: String,
    tokens: Arc<dyn TokenSource>,
    max_results: usize,
    max_attempts: u32,
    backoff_base: Duration,
}

/// One outgoing request, rebuilt per attempt so the token is fresh
struct RequestSpec {
    method: Method,
    path: &'static str,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
}

impl AmadeusGateway {
    /// Creates a gateway from configuration and a token source
    pub fn new(config: &GatewayConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(VoyagentError::Http)?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
            tokens,
            max_results: config.max_results.max(1),
            max_attempts: config.retry_max_attempts.max(1),
            backoff_base: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    async fn execute(&self, spec: &RequestSpec, token: &str) -> reqwest::Result<reqwest::Response> {
        let url = format!("{}{}", self.api_base, spec.path);
        let mut request = self
            .client
            .request(spec.method.clone(), url)
            .bearer_auth(token);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }
        request.send().await
    }

    /// Sends a request with the credential and retry policies applied
    ///
    /// `idempotent` enables the bounded-backoff retry loop; confirm calls
    /// pass false so a failure is surfaced for an explicit user decision.
    async fn send(&self, spec: RequestSpec, idempotent: bool) -> Result<Value> {
        let max_attempts = if idempotent { self.max_attempts } else { 1 };
        let mut attempt = 0;

        loop {
            attempt += 1;
            let token = self.tokens.current()?;

            let response = match self.execute(&spec, &token).await {
                Ok(response) => response,
                Err(e) => {
                    if idempotent && attempt < max_attempts {
                        tracing::warn!(
                            "gateway request to {} failed (attempt {}/{}): {}",
                            spec.path,
                            attempt,
                            max_attempts,
                            e
                        );
                        self.backoff(attempt).await;
                        continue;
                    }
                    return Err(VoyagentError::GatewayTransient(e.to_string()).into());
                }
            };

            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                // Exactly one transparent refresh + retry per turn
                tracing::warn!("gateway returned 401; triggering token refresh and retrying once");
                let refreshed = self.tokens.refresh()?;
                let retried = self
                    .execute(&spec, &refreshed)
                    .await
                    .map_err(|e| VoyagentError::GatewayTransient(e.to_string()))?;

                let retried_status = retried.status();
                if retried_status == StatusCode::UNAUTHORIZED {
                    tracing::error!(
                        "gateway rejected refreshed token; token refresh process may be down"
                    );
                    return Err(VoyagentError::GatewayAuth(
                        "provider rejected the refreshed token".to_string(),
                    )
                    .into());
                }
                return Self::finish(retried, retried_status).await;
            }

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                if idempotent && attempt < max_attempts {
                    tracing::warn!(
                        "gateway returned {} (attempt {}/{}); backing off",
                        status,
                        attempt,
                        max_attempts
                    );
                    self.backoff(attempt).await;
                    continue;
                }
                return Err(VoyagentError::GatewayTransient(format!(
                    "provider returned {} after {} attempts",
                    status, attempt
                ))
                .into());
            }

            return Self::finish(response, status).await;
        }
    }

    /// Resolves a terminal response into parsed JSON or a taxonomy error
    async fn finish(response: reqwest::Response, status: StatusCode) -> Result<Value> {
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(VoyagentError::GatewayTransient(format!(
                "provider returned {} on retried request",
                status
            ))
            .into());
        }
        let body: Value = response.json().await.map_err(|e| {
            VoyagentError::GatewayResponse(format!("unparseable provider response: {}", e))
        })?;
        if !status.is_success() {
            return Err(VoyagentError::GatewayResponse(provider_detail(&body)).into());
        }
        // The provider occasionally reports errors inside a 200 body
        if body.get("errors").map(|e| !e.is_null()).unwrap_or(false) {
            return Err(VoyagentError::GatewayResponse(provider_detail(&body)).into());
        }
        Ok(body)
    }

    async fn backoff(&self, attempt: u32) {
        let exp = self.backoff_base * 2u32.saturating_pow(attempt - 1);
        let jitter = Duration::from_millis(
            rand::rng().random_range(0..=self.backoff_base.as_millis().max(1) as u64),
        );
        tokio::time::sleep(exp + jitter).await;
    }

    fn flight_search_spec(&self, criteria: &FlightCriteria, max: usize) -> RequestSpec {
        let mut query = vec![
            ("originLocationCode", criteria.origin.clone()),
            ("destinationLocationCode", criteria.destination.clone()),
            ("departureDate", criteria.depart_date.to_string()),
            ("adults", criteria.passengers.to_string()),
            ("currencyCode", self.currency.clone()),
            ("max", max.to_string()),
        ];
        if let Some(return_date) = criteria.return_date {
            query.push(("returnDate", return_date.to_string()));
        }
        RequestSpec {
            method: Method::GET,
            path: FLIGHT_OFFERS_PATH,
            query,
            body: None,
        }
    }
}

/// Extracts the first error detail from a provider error body
///
/// Only the `detail` field ever travels further; raw provider payloads are
/// not surfaced to conversation-facing errors.
fn provider_detail(body: &Value) -> String {
    body.get("errors")
        .and_then(|errors| errors.get(0))
        .and_then(|first| first.get("detail"))
        .and_then(|detail| detail.as_str())
        .unwrap_or("provider request failed")
        .to_string()
}

/// Parses provider timestamps, tolerating a trailing Z
fn parse_provider_time(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").map_err(|e| {
        VoyagentError::GatewayResponse(format!("bad provider timestamp '{}': {}", raw, e)).into()
    })
}

/// Formats a transfer ride duration from its start and end times
fn format_duration(start: NaiveDateTime, end: NaiveDateTime) -> String {
    let minutes = (end - start).num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

// Wire shapes, matching the provider's test-environment schema.

#[derive(Debug, Deserialize)]
struct RawFlightOffers {
    #[serde(default)]
    data: Vec<RawFlightOffer>,
}

#[derive(Debug, Deserialize)]
struct RawFlightOffer {
    id: String,
    price: RawPrice,
    itineraries: Vec<RawItinerary>,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    total: String,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    #[serde(default)]
    duration: String,
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    #[serde(rename = "carrierCode")]
    carrier_code: String,
    number: String,
    departure: RawEndpoint,
    arrival: RawEndpoint,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    #[serde(rename = "iataCode")]
    iata_code: String,
    at: String,
}

#[derive(Debug, Deserialize)]
struct RawHotelList {
    #[serde(default)]
    data: Vec<RawHotelRef>,
}

#[derive(Debug, Deserialize)]
struct RawHotelRef {
    #[serde(rename = "hotelId")]
    hotel_id: String,
}

#[derive(Debug, Deserialize)]
struct RawHotelOffers {
    #[serde(default)]
    data: Vec<RawHotelOffer>,
}

#[derive(Debug, Deserialize)]
struct RawHotelOffer {
    hotel: RawHotel,
    #[serde(default)]
    offers: Vec<RawRoomOffer>,
}

#[derive(Debug, Deserialize)]
struct RawHotel {
    #[serde(rename = "hotelId")]
    hotel_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    address: Option<RawAddress>,
}

#[derive(Debug, Deserialize, Default)]
struct RawAddress {
    #[serde(default)]
    lines: Vec<String>,
    #[serde(rename = "cityName", default)]
    city_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRoomOffer {
    #[serde(default)]
    room: Option<RawRoom>,
    price: RawPrice,
    #[serde(default)]
    policies: Option<RawPolicies>,
}

#[derive(Debug, Deserialize, Default)]
struct RawRoom {
    #[serde(rename = "typeEstimated", default)]
    type_estimated: Option<RawRoomType>,
}

#[derive(Debug, Deserialize, Default)]
struct RawRoomType {
    #[serde(default)]
    category: Option<String>,
    #[serde(rename = "bedType", default)]
    bed_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawPolicies {
    #[serde(default)]
    refundable: Option<RawRefundable>,
}

#[derive(Debug, Deserialize, Default)]
struct RawRefundable {
    #[serde(rename = "cancellationRefund", default)]
    cancellation_refund: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTransferOffers {
    #[serde(default)]
    data: Vec<RawTransferOffer>,
}

#[derive(Debug, Deserialize)]
struct RawTransferOffer {
    id: String,
    start: RawTransferPoint,
    end: RawTransferPoint,
    quotation: RawQuotation,
    vehicle: RawVehicle,
    #[serde(rename = "serviceProvider")]
    service_provider: RawServiceProvider,
}

#[derive(Debug, Deserialize)]
struct RawTransferPoint {
    #[serde(rename = "dateTime")]
    date_time: String,
}

#[derive(Debug, Deserialize)]
struct RawQuotation {
    #[serde(rename = "monetaryAmount")]
    monetary_amount: String,
    #[serde(rename = "currencyCode")]
    currency_code: String,
}

#[derive(Debug, Deserialize)]
struct RawVehicle {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawServiceProvider {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawFlightOrder {
    data: RawFlightOrderData,
}

#[derive(Debug, Deserialize)]
struct RawFlightOrderData {
    id: String,
    #[serde(rename = "flightOffers")]
    flight_offers: Vec<RawFlightOffer>,
}

impl AmadeusGateway {
    fn adapt_flight_offer(&self, raw: RawFlightOffer) -> Result<FlightOffer> {
        let itinerary = raw.itineraries.into_iter().next().ok_or_else(|| {
            VoyagentError::GatewayResponse("flight offer without itineraries".to_string())
        })?;
        let mut segments = Vec::with_capacity(itinerary.segments.len());
        for segment in itinerary.segments {
            segments.push(FlightSegment {
                carrier: segment.carrier_code,
                number: segment.number,
                departure_airport: segment.departure.iata_code,
                departure_time: parse_provider_time(&segment.departure.at)?,
                arrival_airport: segment.arrival.iata_code,
                arrival_time: parse_provider_time(&segment.arrival.at)?,
            });
        }
        let stops = segments.len().saturating_sub(1);
        Ok(FlightOffer {
            id: raw.id,
            price: Price {
                amount: raw.price.total,
                currency: raw.price.currency.unwrap_or_else(|| self.currency.clone()),
            },
            segments,
            stops,
            duration: itinerary.duration,
        })
    }

    async fn confirm_flight(
        &self,
        offer: &FlightOffer,
        criteria: &FlightCriteria,
        traveler: &Traveler,
    ) -> Result<Booking> {
        // Re-search to obtain the provider's full offer payload, which the
        // pricing and order endpoints require verbatim.
        let window = self.max_results.max(CONFIRM_RESEARCH_MIN);
        let search = self
            .send(self.flight_search_spec(criteria, window), false)
            .await
            .map_err(as_booking_failure)?;
        let raw_offer = search
            .get("data")
            .and_then(|data| data.as_array())
            .and_then(|offers| {
                offers
                    .iter()
                    .find(|o| o.get("id").and_then(|id| id.as_str()) == Some(offer.id.as_str()))
            })
            .cloned()
            .ok_or_else(|| VoyagentError::BookingFailed {
                reason: "the selected flight is no longer available; please search again"
                    .to_string(),
            })?;

        let pricing = self
            .send(
                RequestSpec {
                    method: Method::POST,
                    path: FLIGHT_PRICING_PATH,
                    query: vec![],
                    body: Some(json!({
                        "data": {
                            "type": "flight-offers-pricing",
                            "flightOffers": [raw_offer],
                        }
                    })),
                },
                false,
            )
            .await
            .map_err(as_booking_failure)?;
        let priced_offer = pricing
            .get("data")
            .and_then(|data| data.get("flightOffers"))
            .and_then(|offers| offers.get(0))
            .cloned()
            .ok_or_else(|| {
                VoyagentError::GatewayResponse("pricing response without offers".to_string())
            })?;

        let order = self
            .send(
                RequestSpec {
                    method: Method::POST,
                    path: FLIGHT_ORDERS_PATH,
                    query: vec![],
                    body: Some(json!({
                        "data": {
                            "type": "flight-order",
                            "flightOffers": [priced_offer],
                            "travelers": [{
                                "id": "1",
                                "dateOfBirth": traveler.date_of_birth,
                                "name": {
                                    "firstName": traveler.first_name,
                                    "lastName": traveler.last_name,
                                },
                                "contact": {
                                    "emailAddress": traveler.email,
                                    "phones": [{
                                        "deviceType": "MOBILE",
                                        "countryCallingCode": "1",
                                        "number": traveler.phone,
                                    }],
                                },
                            }],
                        }
                    })),
                },
                false,
            )
            .await
            .map_err(as_booking_failure)?;

        let order: RawFlightOrder = serde_json::from_value(order)
            .map_err(|e| VoyagentError::GatewayResponse(format!("bad order response: {}", e)))?;
        let confirmed = order
            .data
            .flight_offers
            .into_iter()
            .next()
            .ok_or_else(|| {
                VoyagentError::GatewayResponse("order response without offers".to_string())
            })?;
        let confirmed = self.adapt_flight_offer(confirmed)?;
        let starts_at = confirmed.departure().ok_or_else(|| {
            VoyagentError::GatewayResponse("confirmed flight without segments".to_string())
        })?;

        Ok(Booking {
            reference: order.data.id,
            domain: Domain::Flights,
            summary: confirmed.summary(),
            price: confirmed.price,
            starts_at,
        })
    }
}

/// Maps a confirm-path gateway failure into the booking taxonomy
///
/// Provider declines become `BookingFailed`; auth and transient failures
/// keep their kinds so the orchestrator can phrase them accordingly.
fn as_booking_failure(error: anyhow::Error) -> anyhow::Error {
    match error.downcast::<VoyagentError>() {
        Ok(VoyagentError::GatewayResponse(detail)) => {
            VoyagentError::BookingFailed { reason: detail }.into()
        }
        Ok(other) => other.into(),
        Err(other) => other,
    }
}

#[async_trait]
impl crate::gateway::TravelGateway for AmadeusGateway {
    async fn search_flights(&self, criteria: &FlightCriteria) -> Result<Vec<FlightOffer>> {
        let body = self
            .send(self.flight_search_spec(criteria, self.max_results), true)
            .await?;
        let raw: RawFlightOffers = serde_json::from_value(body).map_err(|e| {
            VoyagentError::GatewayResponse(format!("bad flight search response: {}", e))
        })?;
        raw.data
            .into_iter()
            .map(|offer| self.adapt_flight_offer(offer))
            .collect()
    }

    async fn search_hotels(&self, criteria: &HotelCriteria) -> Result<Vec<HotelOffer>> {
        let listing = self
            .send(
                RequestSpec {
                    method: Method::GET,
                    path: HOTELS_BY_CITY_PATH,
                    query: vec![
                        ("cityCode", criteria.city_code.clone()),
                        ("radius", HOTEL_RADIUS_KM.to_string()),
                        ("radiusUnit", "KM".to_string()),
                        ("hotelSource", "ALL".to_string()),
                    ],
                    body: None,
                },
                true,
            )
            .await?;
        let listing: RawHotelList = serde_json::from_value(listing).map_err(|e| {
            VoyagentError::GatewayResponse(format!("bad hotel listing response: {}", e))
        })?;

        let hotel_ids: Vec<String> = listing
            .data
            .into_iter()
            .take(self.max_results)
            .map(|h| h.hotel_id)
            .collect();
        if hotel_ids.is_empty() {
            return Ok(vec![]);
        }

        let offers = self
            .send(
                RequestSpec {
                    method: Method::GET,
                    path: HOTEL_OFFERS_PATH,
                    query: vec![
                        ("hotelIds", hotel_ids.join(",")),
                        ("adults", criteria.guests.to_string()),
                        ("checkInDate", criteria.check_in.to_string()),
                        ("checkOutDate", criteria.check_out.to_string()),
                        ("roomQuantity", "1".to_string()),
                        ("currency", self.currency.clone()),
                    ],
                    body: None,
                },
                true,
            )
            .await?;
        let offers: RawHotelOffers = serde_json::from_value(offers).map_err(|e| {
            VoyagentError::GatewayResponse(format!("bad hotel offers response: {}", e))
        })?;

        Ok(offers
            .data
            .into_iter()
            .map(|raw| {
                let rooms: Vec<RoomOffer> = raw
                    .offers
                    .iter()
                    .map(|offer| RoomOffer {
                        category: offer
                            .room
                            .as_ref()
                            .and_then(|r| r.type_estimated.as_ref())
                            .and_then(|t| t.category.clone())
                            .unwrap_or_else(|| "STANDARD_ROOM".to_string()),
                        bed_type: offer
                            .room
                            .as_ref()
                            .and_then(|r| r.type_estimated.as_ref())
                            .and_then(|t| t.bed_type.clone())
                            .unwrap_or_else(|| "Unknown".to_string()),
                        price: Price {
                            amount: offer.price.total.clone(),
                            currency: offer
                                .price
                                .currency
                                .clone()
                                .unwrap_or_else(|| self.currency.clone()),
                        },
                        refundable: offer
                            .policies
                            .as_ref()
                            .and_then(|p| p.refundable.as_ref())
                            .and_then(|r| r.cancellation_refund.as_deref())
                            != Some("NON_REFUNDABLE"),
                    })
                    .collect();

                // Cheapest room leads the listing price
                let price = rooms
                    .iter()
                    .min_by(|a, b| {
                        let pa = a.price.amount.parse::<f64>().unwrap_or(f64::INFINITY);
                        let pb = b.price.amount.parse::<f64>().unwrap_or(f64::INFINITY);
                        pa.total_cmp(&pb)
                    })
                    .map(|room| room.price.clone())
                    .unwrap_or(Price {
                        amount: "N/A".to_string(),
                        currency: self.currency.clone(),
                    });

                let address = raw
                    .hotel
                    .address
                    .unwrap_or_default();
                let mut address_line = address.lines.first().cloned().unwrap_or_default();
                if let Some(city) = address.city_name {
                    if address_line.is_empty() {
                        address_line = city;
                    } else {
                        address_line = format!("{}, {}", address_line, city);
                    }
                }

                HotelOffer {
                    id: raw.hotel.hotel_id,
                    name: raw.hotel.name.unwrap_or_else(|| "Unknown Hotel".to_string()),
                    rating: raw.hotel.rating.unwrap_or_else(|| "N/A".to_string()),
                    address: address_line,
                    rooms,
                    price,
                }
            })
            .collect())
    }

    async fn search_transfers(&self, criteria: &TransferCriteria) -> Result<Vec<TransferOffer>> {
        let body = self
            .send(
                RequestSpec {
                    method: Method::POST,
                    path: TRANSFER_OFFERS_PATH,
                    query: vec![],
                    body: Some(json!({
                        "startLocationCode": criteria.pickup,
                        "endName": criteria.dropoff,
                        "startDateTime": criteria.datetime.format("%Y-%m-%dT%H:%M:%S").to_string(),
                        "passengers": criteria.passengers,
                    })),
                },
                true,
            )
            .await?;
        let raw: RawTransferOffers = serde_json::from_value(body).map_err(|e| {
            VoyagentError::GatewayResponse(format!("bad transfer search response: {}", e))
        })?;

        let mut offers = Vec::with_capacity(raw.data.len());
        for offer in raw.data {
            let start = parse_provider_time(&offer.start.date_time)?;
            let end = parse_provider_time(&offer.end.date_time)?;
            offers.push(TransferOffer {
                id: offer.id,
                vehicle: offer.vehicle.code,
                vehicle_description: offer.vehicle.description,
                provider_name: offer.service_provider.name,
                duration: format_duration(start, end),
                price: Price {
                    amount: offer.quotation.monetary_amount,
                    currency: offer.quotation.currency_code,
                },
            });
        }
        Ok(offers)
    }

    async fn confirm(&self, selection: &ConfirmSelection) -> Result<Booking> {
        match selection {
            ConfirmSelection::Flight {
                offer,
                criteria,
                traveler,
            } => self.confirm_flight(offer, criteria, traveler).await,
            // Hotel and transfer stays are held locally against the searched
            // offer; the test environment exposes no booking endpoint for
            // them, so a provider-shaped reference is minted here.
            ConfirmSelection::Hotel { offer, criteria } => Ok(Booking {
                reference: format!("HB-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]),
                domain: Domain::Hotels,
                summary: format!(
                    "{}, {} to {}",
                    offer.summary(),
                    criteria.check_in,
                    criteria.check_out
                ),
                price: offer.price.clone(),
                starts_at: criteria.check_in.and_time(chrono::NaiveTime::MIN),
            }),
            ConfirmSelection::Transfer { offer, criteria } => Ok(Booking {
                reference: format!("TR-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]),
                domain: Domain::Transfers,
                summary: format!("{} at {}", offer.summary(), criteria.datetime),
                price: offer.price.clone(),
                starts_at: criteria.datetime,
            }),
        }
    }
}
