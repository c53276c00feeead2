//! Webhook - Dialogflow v2 fulfillment wire types
//!
//! Dialogflow posts a `WebhookRequest` for every matched intent whose
//! fulfillment is enabled, and reads back a `WebhookResponse`. Only the
//! fields this service uses are modeled; unknown fields are ignored.
//!
//! Contexts are owned by Dialogflow. A webhook can only observe the
//! contexts it was sent and ask for changes in its response: a context
//! is deleted by echoing it back with a lifespan of zero.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inbound fulfillment request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub response_id: String,
    /// `projects/<project>/agent/sessions/<session>`
    pub session: String,
    pub query_result: QueryResult,
}

/// Result of intent matching for the current turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub query_text: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub intent: Option<MatchedIntent>,
    #[serde(default)]
    pub output_contexts: Vec<Context>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedIntent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// A conversation context as carried on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// `<session>/contexts/<context-id>`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

impl Context {
    /// Context id without the session prefix
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        string_param(&self.parameters, key)
    }
}

/// A non-empty string parameter. Dialogflow sends unfilled
/// parameters as empty strings.
pub fn string_param<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Outbound fulfillment response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fulfillment_messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_contexts: Vec<Context>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: Vec<String>,
}

/// Narrow view of the session's contexts
pub trait ContextAccess {
    fn get(&self, name: &str) -> Option<&Context>;
    fn delete(&mut self, name: &str);
}

/// Contexts received with a request, plus the changes to send back
#[derive(Debug, Clone, Default)]
pub struct SessionContexts {
    session: String,
    active: Vec<Context>,
    deleted: Vec<Context>,
}

impl SessionContexts {
    pub fn new(session: &str, contexts: Vec<Context>) -> Self {
        Self {
            session: session.to_string(),
            active: contexts,
            deleted: Vec::new(),
        }
    }

    /// Contexts to include in the response
    pub fn into_output_contexts(self) -> Vec<Context> {
        self.deleted
    }
}

impl ContextAccess for SessionContexts {
    fn get(&self, name: &str) -> Option<&Context> {
        self.active.iter().find(|c| c.short_name() == name)
    }

    fn delete(&mut self, name: &str) {
        self.active.retain(|c| c.short_name() != name);
        if self.deleted.iter().any(|c| c.short_name() == name) {
            return;
        }
        self.deleted.push(Context {
            name: format!("{}/contexts/{}", self.session, name),
            lifespan_count: Some(0),
            parameters: Map::new(),
        });
    }
}

/// Utterances collected while handling one turn, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    utterances: Vec<String>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: impl Into<String>) {
        self.utterances.push(text.into());
    }

    #[cfg(test)]
    pub fn utterances(&self) -> &[String] {
        &self.utterances
    }

    /// Build the wire response; each utterance becomes its own text message
    pub fn into_response(self, output_contexts: Vec<Context>) -> WebhookResponse {
        let fulfillment_text = self.utterances.first().cloned();
        let fulfillment_messages = self
            .utterances
            .into_iter()
            .map(|line| Message {
                text: Text { text: vec![line] },
            })
            .collect();

        WebhookResponse {
            fulfillment_text,
            fulfillment_messages,
            output_contexts,
        }
    }
}
