//! Turn handling
//!
//! One call to [`Orchestrator::handle_turn`] processes one user message to
//! completion: interpret, merge slots, run at most one travel operation,
//! compose the reply. Gateway and interpreter failures surface as
//! conversational assistant replies rather than transport errors, so a
//! failed turn degrades gracefully and the session stays usable.

use crate::dispatch::Dispatcher;
use crate::error::{Result, VoyagentError};
use crate::gateway::ConfirmSelection;
use crate::reasoning::{Intent, Interpretation, Interpreter};
use crate::session::{Message, Session};
use crate::slots::Domain;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Drives one conversation turn at a time
pub struct Orchestrator {
    interpreter: Arc<dyn Interpreter>,
    dispatcher: Dispatcher,
    max_context_messages: usize,
}

impl Orchestrator {
    /// Creates an orchestrator over an interpreter and a dispatcher
    pub fn new(
        interpreter: Arc<dyn Interpreter>,
        dispatcher: Dispatcher,
        max_context_messages: usize,
    ) -> Self {
        Self {
            interpreter,
            dispatcher,
            max_context_messages,
        }
    }

    /// Handles one user turn and returns the assistant reply
    ///
    /// The user message and the reply are both appended to the session
    /// transcript. When interpretation fails, no slot, offer, or itinerary
    /// state changes; the reply is an apology and the user can retry.
    pub async fn handle_turn(&self, session: &mut Session, text: &str) -> Result<Message> {
        session.push(Message::user(text));

        let interpretation = match self
            .interpreter
            .interpret(
                session.recent_context(self.max_context_messages),
                &session.slots,
                &session.profile,
            )
            .await
        {
            Ok(interpretation) => interpretation,
            Err(e) => {
                tracing::warn!("interpretation failed: {}", e);
                let reply = Message::assistant(
                    "I'm having trouble understanding requests right now. \
                     Please try again in a moment.",
                );
                session.push(reply.clone());
                return Ok(reply);
            }
        };

        tracing::debug!("interpreted intent: {:?}", interpretation.intent);

        self.apply_profile_updates(session, &interpretation);
        let conflicted = self.merge_slots(session, &interpretation);

        // Changing details a confirmed booking was made under needs the
        // user's say-so before anything else runs.
        if !conflicted.is_empty() {
            let conflict = VoyagentError::SlotConflict {
                domain: conflicted[0],
                message: conflict_reply(session, &conflicted),
            };
            let reply = Message::assistant(reply_for_error(&conflict.into()));
            session.push(reply.clone());
            return Ok(reply);
        }

        let reply = match self.act(session, &interpretation).await {
            Ok(reply) => reply,
            Err(e) => Message::assistant(reply_for_error(&e)),
        };
        session.push(reply.clone());
        Ok(reply)
    }

    fn apply_profile_updates(&self, session: &mut Session, interpretation: &Interpretation) {
        for (field, value) in &interpretation.profile_updates {
            match field.as_str() {
                "first_name" => session.profile.first_name = value.clone(),
                "last_name" => session.profile.last_name = value.clone(),
                "date_of_birth" => session.profile.date_of_birth = value.clone(),
                "email" => session.profile.email = value.clone(),
                "phone" => session.profile.phone = value.clone(),
                other => tracing::warn!("ignoring unknown profile field '{}'", other),
            }
        }
    }

    /// Merges extracted slots and returns invalidated domains that already
    /// hold confirmed bookings
    fn merge_slots(&self, session: &mut Session, interpretation: &Interpretation) -> Vec<Domain> {
        let mut by_domain: BTreeMap<Domain, Vec<(String, String)>> = BTreeMap::new();
        for update in &interpretation.slot_updates {
            by_domain
                .entry(update.domain)
                .or_default()
                .push((update.field.clone(), update.value.clone()));
        }

        let mut conflicted = Vec::new();
        for (domain, updates) in by_domain {
            let invalidated = session.slots.merge(domain, updates);
            for dependent in invalidated {
                tracing::info!("{} details marked stale by {} change", dependent, domain);
                session.offers.clear(dependent);
                if session.itinerary.has_domain(dependent) {
                    conflicted.push(dependent);
                }
            }
        }
        conflicted
    }

    async fn act(&self, session: &mut Session, interpretation: &Interpretation) -> Result<Message> {
        match interpretation.intent {
            Intent::SearchFlights => {
                let offers = self.dispatcher.search_flights(session).await?;
                if offers.is_empty() {
                    return Ok(Message::assistant(
                        "I couldn't find any flights for those details. \
                         Want to try different dates or airports?",
                    ));
                }
                Ok(Message::assistant_structured(json!({
                    "domain": Domain::Flights,
                    "prompt": "Here are the best flight options I found:",
                    "results": offers
                        .iter()
                        .enumerate()
                        .map(|(i, offer)| json!({
                            "option": i + 1,
                            "summary": offer.summary(),
                        }))
                        .collect::<Vec<_>>(),
                })))
            }
            Intent::SearchHotels => {
                let offers = self.dispatcher.search_hotels(session).await?;
                if offers.is_empty() {
                    return Ok(Message::assistant(
                        "I couldn't find any hotels for those details. \
                         Want to try different dates?",
                    ));
                }
                Ok(Message::assistant_structured(json!({
                    "domain": Domain::Hotels,
                    "prompt": "Here are the best hotel options I found:",
                    "results": offers
                        .iter()
                        .enumerate()
                        .map(|(i, offer)| json!({
                            "option": i + 1,
                            "summary": offer.summary(),
                        }))
                        .collect::<Vec<_>>(),
                })))
            }
            Intent::SearchTransfers => {
                let offers = self.dispatcher.search_transfers(session).await?;
                if offers.is_empty() {
                    return Ok(Message::assistant(
                        "I couldn't find any transfers for that pickup. \
                         Want to try a different time?",
                    ));
                }
                Ok(Message::assistant_structured(json!({
                    "domain": Domain::Transfers,
                    "prompt": "Here are the transfer options I found:",
                    "results": offers
                        .iter()
                        .enumerate()
                        .map(|(i, offer)| json!({
                            "option": i + 1,
                            "summary": offer.summary(),
                        }))
                        .collect::<Vec<_>>(),
                })))
            }
            Intent::ConfirmBooking => self.confirm(session, interpretation).await,
            Intent::ShowItinerary => Ok(Message::assistant(session.itinerary.render_text())),
            Intent::UpdateProfile => Ok(Message::assistant(format!(
                "Got it. Your traveler details are now: {} {}, born {}, {}, {}.",
                session.profile.first_name,
                session.profile.last_name,
                session.profile.date_of_birth,
                session.profile.email,
                session.profile.phone
            ))),
            Intent::Clarify | Intent::Smalltalk => {
                let reply = interpretation
                    .reply
                    .clone()
                    .unwrap_or_else(|| {
                        "I can search and book flights, hotels, and airport transfers. \
                         Where would you like to go?"
                            .to_string()
                    });
                Ok(Message::assistant(reply))
            }
        }
    }

    async fn confirm(
        &self,
        session: &mut Session,
        interpretation: &Interpretation,
    ) -> Result<Message> {
        let domain = match interpretation.domain.or_else(|| session.offers.last_domain()) {
            Some(domain) => domain,
            None => {
                return Ok(Message::assistant(
                    "I don't have any search results to book from yet. \
                     Let's search first; what are you looking for?",
                ));
            }
        };

        let index = match interpretation.selection {
            Some(index) if index >= 1 => index - 1,
            _ => {
                return Ok(Message::assistant(
                    "Which option would you like to book? You can say \
                     something like \"book the second one\".",
                ));
            }
        };

        let selection = match build_selection(session, domain, index) {
            Some(selection) => selection,
            None => {
                return Ok(Message::assistant(format!(
                    "I don't have a {} option number {} on the list. \
                     Could you pick one of the options I showed?",
                    singular(domain),
                    index + 1
                )));
            }
        };

        let outcome = self.dispatcher.confirm(session, selection).await?;
        if outcome.repeated {
            return Ok(Message::assistant(format!(
                "That {} is already booked; your reference is {}.",
                singular(domain),
                outcome.booking.reference
            )));
        }
        Ok(Message::assistant(format!(
            "Booked! Your {} confirmation reference is {} ({}). \
             Anything else for this trip?",
            singular(domain),
            outcome.booking.reference,
            outcome.booking.price
        )))
    }
}

fn build_selection(session: &Session, domain: Domain, index: usize) -> Option<ConfirmSelection> {
    match domain {
        Domain::Flights => {
            let (offers, criteria) = session.offers.flights()?;
            let offer = offers.get(index)?;
            Some(ConfirmSelection::Flight {
                offer: offer.clone(),
                criteria: criteria.clone(),
                traveler: session.profile.clone(),
            })
        }
        Domain::Hotels => {
            let (offers, criteria) = session.offers.hotels()?;
            let offer = offers.get(index)?;
            Some(ConfirmSelection::Hotel {
                offer: offer.clone(),
                criteria: criteria.clone(),
            })
        }
        Domain::Transfers => {
            let (offers, criteria) = session.offers.transfers()?;
            let offer = offers.get(index)?;
            Some(ConfirmSelection::Transfer {
                offer: offer.clone(),
                criteria: criteria.clone(),
            })
        }
    }
}

fn conflict_reply(session: &Session, conflicted: &[Domain]) -> String {
    let names: Vec<&str> = conflicted.iter().map(|d| singular(*d)).collect();
    let references: Vec<String> = conflicted
        .iter()
        .flat_map(|domain| session.itinerary.in_domain(*domain))
        .map(|booking| booking.reference.clone())
        .collect();
    format!(
        "Heads up: you already have a confirmed {} booking ({}) made with \
         the earlier details, and this change may not match it anymore. \
         I kept your new details; tell me whether to search again with \
         them or leave the existing booking as is.",
        names.join(" and "),
        references.join(", ")
    )
}

fn singular(domain: Domain) -> &'static str {
    match domain {
        Domain::Flights => "flight",
        Domain::Hotels => "hotel",
        Domain::Transfers => "transfer",
    }
}

/// User-facing reply for a failed travel operation
fn reply_for_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<VoyagentError>() {
        Some(VoyagentError::MissingSlots { .. }) => {
            format!("{}. Could you fill those in?", error)
        }
        Some(VoyagentError::SlotConflict { message, .. }) => message.clone(),
        Some(VoyagentError::StaleSlots { message, .. }) => message.clone(),
        Some(VoyagentError::BookingFailed { reason }) => {
            format!("I couldn't complete that booking: {}", reason)
        }
        Some(VoyagentError::GatewayAuth(_)) => {
            "I'm having trouble reaching the travel data service right now. \
             Please try again shortly."
                .to_string()
        }
        Some(VoyagentError::GatewayTransient(_)) => {
            "The travel data service seems briefly unavailable. \
             Please try again in a moment."
                .to_string()
        }
        _ => {
            tracing::error!("unexpected turn failure: {}", error);
            "Something went wrong handling that request. Please try again.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::error::Result;
    use crate::gateway::{
        Booking, FlightCriteria, FlightOffer, HotelCriteria, HotelOffer, Price, TransferCriteria,
        TransferOffer, TravelGateway, Traveler,
    };
    use crate::reasoning::SlotUpdate;
    use crate::slots::SlotStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Interpreter that pops scripted interpretations in order
    struct ScriptedInterpreter {
        script: Mutex<Vec<Result<Interpretation>>>,
    }

    impl ScriptedInterpreter {
        fn new(script: Vec<Result<Interpretation>>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
            }
        }
    }

    #[async_trait]
    impl Interpreter for ScriptedInterpreter {
        async fn interpret(
            &self,
            _context: &[Message],
            _slots: &SlotStore,
            _profile: &Traveler,
        ) -> Result<Interpretation> {
            self.script
                .lock()
                .unwrap()
                .pop()
                .expect("interpreter script exhausted")
        }
    }

    struct StubGateway;

    #[async_trait]
    impl TravelGateway for StubGateway {
        async fn search_flights(&self, _criteria: &FlightCriteria) -> Result<Vec<FlightOffer>> {
            Ok(vec![
                FlightOffer {
                    id: "1".to_string(),
                    price: Price {
                        amount: "120.00".to_string(),
                        currency: "USD".to_string(),
                    },
                    segments: vec![],
                    stops: 0,
                    duration: "PT5H".to_string(),
                },
                FlightOffer {
                    id: "2".to_string(),
                    price: Price {
                        amount: "150.00".to_string(),
                        currency: "USD".to_string(),
                    },
                    segments: vec![],
                    stops: 1,
                    duration: "PT7H".to_string(),
                },
            ])
        }

        async fn search_hotels(&self, _criteria: &HotelCriteria) -> Result<Vec<HotelOffer>> {
            Ok(vec![])
        }

        async fn search_transfers(
            &self,
            _criteria: &TransferCriteria,
        ) -> Result<Vec<TransferOffer>> {
            Ok(vec![])
        }

        async fn confirm(&self, selection: &ConfirmSelection) -> Result<Booking> {
            Ok(Booking {
                reference: format!("REF-{}", selection.offer_id()),
                domain: selection.domain(),
                summary: "stub".to_string(),
                price: Price {
                    amount: "150.00".to_string(),
                    currency: "USD".to_string(),
                },
                starts_at: "2024-06-01T08:00:00".parse().unwrap(),
            })
        }
    }

    fn profile() -> Traveler {
        Traveler {
            first_name: "Alex".to_string(),
            last_name: "Traveler".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            email: "alex@example.com".to_string(),
            phone: "5550100".to_string(),
        }
    }

    fn orchestrator(script: Vec<Result<Interpretation>>) -> Orchestrator {
        Orchestrator::new(
            Arc::new(ScriptedInterpreter::new(script)),
            Dispatcher::new(Arc::new(StubGateway), &GatewayConfig::default()),
            40,
        )
    }

    fn search_flights_interpretation(updates: Vec<(&str, &str)>) -> Interpretation {
        let mut interpretation = Interpretation::of(Intent::SearchFlights);
        interpretation.slot_updates = updates
            .into_iter()
            .map(|(field, value)| SlotUpdate {
                domain: Domain::Flights,
                field: field.to_string(),
                value: value.to_string(),
            })
            .collect();
        interpretation
    }

    #[tokio::test]
    async fn test_missing_fields_turn_into_a_question() {
        let orchestrator = orchestrator(vec![Ok(search_flights_interpretation(vec![
            ("origin", "JFK"),
            ("destination", "LAX"),
        ]))]);
        let mut session = Session::new("s1", profile());

        let reply = orchestrator
            .handle_turn(&mut session, "flights from JFK to LAX")
            .await
            .unwrap();

        let text = reply.content.as_text();
        assert!(text.contains("depart_date"));
        assert!(text.contains("passengers"));
        assert!(!text.contains("origin"));
        // The partial details were kept for the next turn
        assert_eq!(session.slots.get(Domain::Flights, "origin"), Some("JFK"));
    }

    #[tokio::test]
    async fn test_ready_search_lists_ranked_options() {
        let orchestrator = orchestrator(vec![Ok(search_flights_interpretation(vec![
            ("origin", "JFK"),
            ("destination", "LAX"),
            ("depart_date", "2024-06-01"),
            ("passengers", "1"),
        ]))]);
        let mut session = Session::new("s1", profile());

        let reply = orchestrator
            .handle_turn(&mut session, "flights JFK to LAX June 1, 1 adult")
            .await
            .unwrap();

        let value = match &reply.content {
            crate::session::MessageContent::Structured(value) => value.clone(),
            other => panic!("expected structured reply, got {:?}", other),
        };
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["results"][0]["option"], 1);
    }

    #[tokio::test]
    async fn test_confirm_second_option() {
        let mut confirm = Interpretation::of(Intent::ConfirmBooking);
        confirm.selection = Some(2);
        let orchestrator = orchestrator(vec![
            Ok(search_flights_interpretation(vec![
                ("origin", "JFK"),
                ("destination", "LAX"),
                ("depart_date", "2024-06-01"),
                ("passengers", "1"),
            ])),
            Ok(confirm),
        ]);
        let mut session = Session::new("s1", profile());

        orchestrator
            .handle_turn(&mut session, "flights JFK to LAX June 1")
            .await
            .unwrap();
        let reply = orchestrator
            .handle_turn(&mut session, "book the second option")
            .await
            .unwrap();

        assert!(reply.content.as_text().contains("REF-2"));
        assert_eq!(session.itinerary.len(), 1);
        assert!(session.itinerary.get("REF-2").is_some());
    }

    #[tokio::test]
    async fn test_confirm_out_of_range_asks_again() {
        let mut confirm = Interpretation::of(Intent::ConfirmBooking);
        confirm.selection = Some(7);
        let orchestrator = orchestrator(vec![
            Ok(search_flights_interpretation(vec![
                ("origin", "JFK"),
                ("destination", "LAX"),
                ("depart_date", "2024-06-01"),
                ("passengers", "1"),
            ])),
            Ok(confirm),
        ]);
        let mut session = Session::new("s1", profile());

        orchestrator
            .handle_turn(&mut session, "flights JFK to LAX")
            .await
            .unwrap();
        let reply = orchestrator
            .handle_turn(&mut session, "book option 7")
            .await
            .unwrap();

        assert!(reply.content.as_text().contains("option number 7"));
        assert!(session.itinerary.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_without_results_redirects_to_search() {
        let mut confirm = Interpretation::of(Intent::ConfirmBooking);
        confirm.selection = Some(1);
        let orchestrator = orchestrator(vec![Ok(confirm)]);
        let mut session = Session::new("s1", profile());

        let reply = orchestrator
            .handle_turn(&mut session, "book the first one")
            .await
            .unwrap();
        assert!(reply.content.as_text().contains("search first"));
    }

    #[tokio::test]
    async fn test_interpretation_failure_leaves_state_untouched() {
        let orchestrator = orchestrator(vec![Err(VoyagentError::ReasoningUnavailable(
            "endpoint returned 500".to_string(),
        )
        .into())]);
        let mut session = Session::new("s1", profile());
        session.slots.merge(Domain::Flights, [("origin", "JFK")]);

        let reply = orchestrator
            .handle_turn(&mut session, "anything")
            .await
            .unwrap();

        assert!(reply.content.as_text().contains("try again"));
        assert_eq!(session.slots.get(Domain::Flights, "origin"), Some("JFK"));
        assert!(session.itinerary.is_empty());
        // Turn still recorded: user message plus apology
        assert_eq!(session.transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_upstream_change_after_booking_warns() {
        let mut date_change = Interpretation::of(Intent::SearchFlights);
        date_change.slot_updates = vec![SlotUpdate {
            domain: Domain::Flights,
            field: "depart_date".to_string(),
            value: "2024-07-01".to_string(),
        }];

        let orchestrator = orchestrator(vec![Ok(date_change)]);
        let mut session = Session::new("s1", profile());

        // An existing hotel booking built on the old flight dates
        session.slots.merge(
            Domain::Flights,
            [
                ("origin", "JFK"),
                ("destination", "LAX"),
                ("depart_date", "2024-06-01"),
                ("passengers", "1"),
            ],
        );
        session.slots.merge(
            Domain::Hotels,
            [
                ("destination", "LAX"),
                ("check_in", "2024-06-01"),
                ("check_out", "2024-06-05"),
                ("guests", "1"),
            ],
        );
        session.itinerary.add(Booking {
            reference: "HB-123".to_string(),
            domain: Domain::Hotels,
            summary: "Hotel stay".to_string(),
            price: Price {
                amount: "400.00".to_string(),
                currency: "USD".to_string(),
            },
            starts_at: "2024-06-01T00:00:00".parse().unwrap(),
        });

        let reply = orchestrator
            .handle_turn(&mut session, "actually depart July 1")
            .await
            .unwrap();

        assert!(reply.content.as_text().contains("HB-123"));
        assert!(session.slots.is_stale(Domain::Hotels));
        // The new value was still merged
        assert_eq!(
            session.slots.get(Domain::Flights, "depart_date"),
            Some("2024-07-01")
        );
    }

    #[tokio::test]
    async fn test_smalltalk_uses_interpreter_reply() {
        let mut smalltalk = Interpretation::of(Intent::Smalltalk);
        smalltalk.reply = Some("Hello! Ready to plan a trip?".to_string());
        let orchestrator = orchestrator(vec![Ok(smalltalk)]);
        let mut session = Session::new("s1", profile());

        let reply = orchestrator.handle_turn(&mut session, "hi").await.unwrap();
        assert_eq!(reply.content.as_text(), "Hello! Ready to plan a trip?");
    }

    #[tokio::test]
    async fn test_show_itinerary_renders_text() {
        let orchestrator = orchestrator(vec![Ok(Interpretation::of(Intent::ShowItinerary))]);
        let mut session = Session::new("s1", profile());

        let reply = orchestrator
            .handle_turn(&mut session, "show my itinerary")
            .await
            .unwrap();
        assert!(reply.content.as_text().contains("empty"));
    }
}
