//! Interpreter integration tests against a mock chat-completions endpoint

use serde_json::json;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voyagent::config::ReasoningConfig;
use voyagent::error::VoyagentError;
use voyagent::gateway::Traveler;
use voyagent::reasoning::{Intent, Interpreter, OpenAiInterpreter};
use voyagent::session::Message;
use voyagent::slots::{Domain, SlotStore};

fn reasoning_config(uri: &str) -> ReasoningConfig {
    ReasoningConfig {
        api_base: uri.to_string(),
        ..Default::default()
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

fn tool_call_response(arguments: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call-1",
                    "type": "function",
                    "function": {
                        "name": "interpret_turn",
                        "arguments": arguments.to_string()
                    }
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
}

#[tokio::test]
async fn test_function_call_parses_into_interpretation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_response(json!({
            "intent": "search_flights",
            "slot_updates": [
                {"domain": "flights", "field": "origin", "value": "JFK"},
                {"domain": "flights", "field": "destination", "value": "LAX"},
                {"domain": "flights", "field": "depart_date", "value": "2024-06-01"}
            ]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let interpreter =
        OpenAiInterpreter::new(&reasoning_config(&server.uri()), "test-key".to_string()).unwrap();
    let context = vec![Message::user("flights from JFK to LAX on June 1")];

    let interpretation = interpreter
        .interpret(&context, &SlotStore::new(), &profile())
        .await
        .unwrap();

    assert_eq!(interpretation.intent, Intent::SearchFlights);
    assert_eq!(interpretation.slot_updates.len(), 3);
    assert_eq!(interpretation.slot_updates[0].domain, Domain::Flights);
    assert_eq!(interpretation.slot_updates[0].value, "JFK");
}

#[tokio::test]
async fn test_selection_round_trips() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_response(json!({
            "intent": "confirm_booking",
            "selection": 2,
            "domain": "flights"
        }))))
        .mount(&server)
        .await;

    let interpreter =
        OpenAiInterpreter::new(&reasoning_config(&server.uri()), "test-key".to_string()).unwrap();
    let context = vec![Message::user("book the second option")];

    let interpretation = interpreter
        .interpret(&context, &SlotStore::new(), &profile())
        .await
        .unwrap();

    assert_eq!(interpretation.intent, Intent::ConfirmBooking);
    assert_eq!(interpretation.selection, Some(2));
    assert_eq!(interpretation.domain, Some(Domain::Flights));
}

#[tokio::test]
async fn test_endpoint_failure_maps_to_reasoning_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let interpreter =
        OpenAiInterpreter::new(&reasoning_config(&server.uri()), "test-key".to_string()).unwrap();
    let context = vec![Message::user("hello")];

    let err = interpreter
        .interpret(&context, &SlotStore::new(), &profile())
        .await
        .unwrap_err();
    let err = err.downcast::<VoyagentError>().unwrap();
    assert!(matches!(err, VoyagentError::ReasoningUnavailable(_)));
}

#[tokio::test]
async fn test_plain_text_answer_becomes_clarification() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-2",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Which city are you departing from?"
                },
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let interpreter =
        OpenAiInterpreter::new(&reasoning_config(&server.uri()), "test-key".to_string()).unwrap();
    let context = vec![Message::user("I want to fly somewhere")];

    let interpretation = interpreter
        .interpret(&context, &SlotStore::new(), &profile())
        .await
        .unwrap();

    assert_eq!(interpretation.intent, Intent::Clarify);
    assert_eq!(
        interpretation.reply.as_deref(),
        Some("Which city are you departing from?")
    );
}

#[tokio::test]
async fn test_malformed_arguments_map_to_reasoning_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-3",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call-1",
                        "type": "function",
                        "function": {
                            "name": "interpret_turn",
                            "arguments": "{not json"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .mount(&server)
        .await;

    let interpreter =
        OpenAiInterpreter::new(&reasoning_config(&server.uri()), "test-key".to_string()).unwrap();
    let context = vec![Message::user("hello")];

    let err = interpreter
        .interpret(&context, &SlotStore::new(), &profile())
        .await
        .unwrap_err();
    let err = err.downcast::<VoyagentError>().unwrap();
    assert!(matches!(err, VoyagentError::ReasoningUnavailable(_)));
}
