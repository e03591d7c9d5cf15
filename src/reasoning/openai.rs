//! OpenAI-compatible interpreter
//!
//! Calls a chat-completions endpoint with a single fixed function schema
//! and parses the forced function call back into an [`Interpretation`].
//! Every failure along the way (network, non-success status, missing or
//! malformed function call) maps to `ReasoningUnavailable` so the
//! orchestrator can apologize without touching session state.

use crate::config::ReasoningConfig;
use crate::error::{Result, VoyagentError};
use crate::gateway::Traveler;
use crate::reasoning::{Interpretation, Interpreter};
use crate::session::{Message, Role};
use crate::slots::{Domain, SlotStore};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Name of the single function the model is forced to call
const INTERPRET_FUNCTION: &str = "interpret_turn";

/// Interpreter backed by an OpenAI-compatible chat-completions endpoint
pub struct OpenAiInterpreter {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    tools: Vec<serde_json::Value>,
    tool_choice: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    function: ResponseFunctionCall,
}

#[derive(Debug, Deserialize)]
struct ResponseFunctionCall {
    name: String,
    arguments: String,
}

impl OpenAiInterpreter {
    /// Creates an interpreter from configuration and an API key
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: &ReasoningConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(VoyagentError::Http)?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn system_prompt(slots: &SlotStore, profile: &Traveler) -> String {
        let today = chrono::Utc::now().format("%Y-%m-%d");
        let mut prompt = format!(
            "You are a travel booking assistant. Today's date is {}.\n\
             Classify the user's latest message and extract any booking \
             details they mention.\n\
             Domains and their fields:\n\
             - flights: origin, destination, depart_date, return_date, passengers\n\
             - hotels: destination, check_in, check_out, guests\n\
             - transfers: pickup, dropoff, datetime, passengers\n\
             Airport and city codes are 3-letter IATA codes. Dates are \
             YYYY-MM-DD and transfer datetimes are YYYY-MM-DDTHH:MM:SS. \
             Resolve relative dates against today's date.\n\
             When the user picks a listed option (\"book the second one\"), \
             use intent confirm_booking with the 1-based selection index. \
             Only report values the user actually stated; never invent \
             origins, dates, or counts. Set an empty value to clear a field \
             the user retracted.\n",
            today
        );
        for domain in Domain::ALL {
            let values = slots.values(domain);
            if !values.is_empty() {
                let rendered: Vec<String> = values
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                prompt.push_str(&format!(
                    "Known {} details: {}\n",
                    domain,
                    rendered.join(", ")
                ));
            }
        }
        prompt.push_str(&format!(
            "Traveler on file: {} {}, born {}, {}, {}\n",
            profile.first_name,
            profile.last_name,
            profile.date_of_birth,
            profile.email,
            profile.phone
        ));
        prompt
    }

    fn interpret_tool() -> serde_json::Value {
        json!({
            "type": "function",
            "function": {
                "name": INTERPRET_FUNCTION,
                "description": "Report the structured reading of the user's latest message",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "intent": {
                            "type": "string",
                            "enum": [
                                "search_flights",
                                "search_hotels",
                                "search_transfers",
                                "confirm_booking",
                                "show_itinerary",
                                "update_profile",
                                "clarify",
                                "smalltalk"
                            ]
                        },
                        "slot_updates": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "domain": {
                                        "type": "string",
                                        "enum": ["flights", "hotels", "transfers"]
                                    },
                                    "field": {"type": "string"},
                                    "value": {"type": "string"}
                                },
                                "required": ["domain", "field", "value"]
                            }
                        },
                        "profile_updates": {
                            "type": "array",
                            "items": {
                                "type": "array",
                                "items": {"type": "string"},
                                "minItems": 2,
                                "maxItems": 2
                            }
                        },
                        "selection": {
                            "type": "integer",
                            "description": "1-based index of the chosen option"
                        },
                        "domain": {
                            "type": "string",
                            "enum": ["flights", "hotels", "transfers"]
                        },
                        "reply": {
                            "type": "string",
                            "description": "Conversational reply for clarify and smalltalk turns"
                        }
                    },
                    "required": ["intent"]
                }
            }
        })
    }

    fn convert_context(context: &[Message]) -> Vec<ChatMessage> {
        context
            .iter()
            .map(|message| ChatMessage {
                // Tool results are folded in as assistant context; the wire
                // protocol's tool role needs call ids we do not carry.
                role: match message.role {
                    Role::User => "user",
                    Role::Assistant | Role::Tool => "assistant",
                },
                content: message.content.as_text(),
            })
            .collect()
    }
}

#[async_trait]
impl Interpreter for OpenAiInterpreter {
    async fn interpret(
        &self,
        context: &[Message],
        slots: &SlotStore,
        profile: &Traveler,
    ) -> Result<Interpretation> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: Self::system_prompt(slots, profile),
        }];
        messages.extend(Self::convert_context(context));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            tools: vec![Self::interpret_tool()],
            tool_choice: json!({
                "type": "function",
                "function": {"name": INTERPRET_FUNCTION}
            }),
        };

        tracing::debug!(
            "sending interpretation request: {} context messages",
            request.messages.len() - 1
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| VoyagentError::ReasoningUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("interpretation endpoint returned {}: {}", status, body);
            return Err(VoyagentError::ReasoningUnavailable(format!(
                "endpoint returned {}",
                status
            ))
            .into());
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            VoyagentError::ReasoningUnavailable(format!("malformed response: {}", e))
        })?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                VoyagentError::ReasoningUnavailable("response contained no choices".to_string())
            })?;

        if let Some(call) = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .find(|call| call.function.name == INTERPRET_FUNCTION)
        {
            return serde_json::from_str(&call.function.arguments).map_err(|e| {
                VoyagentError::ReasoningUnavailable(format!(
                    "malformed function arguments: {}",
                    e
                ))
                .into()
            });
        }

        // Some backends answer in plain text despite the forced tool choice;
        // treat that as a clarifying reply rather than a hard failure.
        if let Some(content) = message.content.filter(|c| !c.is_empty()) {
            let mut interpretation = Interpretation::of(crate::reasoning::Intent::Clarify);
            interpretation.reply = Some(content);
            return Ok(interpretation);
        }

        Err(VoyagentError::ReasoningUnavailable(
            "response carried neither a function call nor text".to_string(),
        )
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Traveler {
        Traveler {
            first_name: "Alex".to_string(),
            last_name: "Traveler".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            email: "alex@example.com".to_string(),
            phone: "5550100".to_string(),
        }
    }

    #[test]
    fn test_system_prompt_includes_known_slots() {
        let mut slots = SlotStore::new();
        slots.merge(Domain::Flights, [("origin", "JFK"), ("destination", "LAX")]);

        let prompt = OpenAiInterpreter::system_prompt(&slots, &profile());
        assert!(prompt.contains("Known flights details"));
        assert!(prompt.contains("origin=JFK"));
        assert!(prompt.contains("Alex Traveler"));
    }

    #[test]
    fn test_convert_context_maps_tool_to_assistant() {
        let context = vec![
            Message::user("hi"),
            Message::tool(json!({"results": []})),
        ];
        let converted = OpenAiInterpreter::convert_context(&context);
        assert_eq!(converted[0].role, "user");
        assert_eq!(converted[1].role, "assistant");
    }

    #[test]
    fn test_interpret_tool_schema_names_function() {
        let tool = OpenAiInterpreter::interpret_tool();
        assert_eq!(tool["function"]["name"], INTERPRET_FUNCTION);
        assert!(tool["function"]["parameters"]["properties"]["intent"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "confirm_booking"));
    }
}
