//! Fulfillment - Routes matched intents to the trivia handlers
//!
//! A conversation alternates between two states, both tracked by
//! Dialogflow rather than by this service:
//! - awaiting a city: the `City name` intent asks that city's question
//!   and narrows the `street` entity to that city's streets
//! - awaiting an answer: the `Trivia answer` intent checks the street
//!   against the city remembered in the `cityname-followup` context
//!
//! A failure never escapes a handler. Every outcome is an utterance.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::dataset::CityDataset;
use crate::dialogflow::{
    session_entity_type_name, Entity, EntityOverrideMode, EntityTypesApi, SessionEntityType,
};
use crate::intent::Intent;
use crate::webhook::{
    string_param, ContextAccess, Reply, SessionContexts, WebhookRequest, WebhookResponse,
};

/// Context Dialogflow keeps alive between the city and the answer
pub const FOLLOWUP_CONTEXT: &str = "cityname-followup";

/// Entity type overridden per session with the current city's streets
pub const STREET_ENTITY: &str = "street";

/// The fulfillment dispatcher
#[derive(Clone)]
pub struct TriviaAgent {
    dataset: Arc<CityDataset>,
    entity_api: Arc<dyn EntityTypesApi>,
    /// Built once so the lost-context path never touches the dataset
    restart_prompt: String,
}

impl TriviaAgent {
    pub fn new(dataset: Arc<CityDataset>, entity_api: Arc<dyn EntityTypesApi>) -> Self {
        let restart_prompt = format!(
            "Would you like me to ask you about {}?",
            dataset.spoken_city_list()
        );
        Self {
            dataset,
            entity_api,
            restart_prompt,
        }
    }

    /// Handle a raw webhook request end to end
    #[instrument(
        skip(self, request),
        fields(
            request_id = %uuid::Uuid::new_v4(),
            response_id = %request.response_id,
        )
    )]
    pub async fn handle_webhook(&self, request: WebhookRequest) -> WebhookResponse {
        let display_name = request
            .query_result
            .intent
            .as_ref()
            .map(|i| i.display_name.as_str())
            .unwrap_or_default();

        let Some(intent) = Intent::from_display_name(display_name) else {
            // Dialogflow falls back to the intent's static responses
            warn!(intent = display_name, "No handler for intent");
            return WebhookResponse::default();
        };

        let mut contexts =
            SessionContexts::new(&request.session, request.query_result.output_contexts);
        let reply = self
            .dispatch(
                intent,
                &request.session,
                &request.query_result.parameters,
                &mut contexts,
            )
            .await;

        reply.into_response(contexts.into_output_contexts())
    }

    /// Run the handler for a matched intent
    pub async fn dispatch(
        &self,
        intent: Intent,
        session: &str,
        parameters: &Map<String, Value>,
        contexts: &mut (dyn ContextAccess + Send),
    ) -> Reply {
        debug!(%intent, session, "Dispatching intent");
        let mut reply = Reply::new();
        match intent {
            Intent::CityName => {
                self.ask_trivia_question(string_param(parameters, "city"), session, &mut reply)
                    .await
            }
            Intent::TriviaAnswer => {
                self.check_trivia_answer(string_param(parameters, "street"), contexts, &mut reply)
            }
        }
        reply
    }

    /// Narrow the session's streets to the chosen city, then ask its question
    pub async fn ask_trivia_question(&self, city: Option<&str>, session: &str, reply: &mut Reply) {
        let Some(data) = city.and_then(|name| self.dataset.get(name)) else {
            warn!(city = ?city, "City parameter missing or not in dataset");
            apologize_for_city(reply);
            return;
        };

        let request = SessionEntityType {
            name: session_entity_type_name(session, STREET_ENTITY),
            entity_override_mode: EntityOverrideMode::Override,
            entities: data.streets.iter().map(Entity::from).collect(),
        };

        match self
            .entity_api
            .create_session_entity_type(session, &request)
            .await
        {
            Ok(_) => {
                info!(
                    city = %data.name,
                    request = %serde_json::to_string(&request).unwrap_or_default(),
                    "Created session entity type"
                );
                reply.add(format!(
                    "Great! I love {}. Here's a question about its streets!",
                    data.name
                ));
                reply.add(data.trivia.question.clone());
            }
            Err(e) => {
                error!("Error creating session entity type: {}", e);
                apologize_for_city(reply);
            }
        }
    }

    /// Compare the submitted street against the remembered city's answer
    pub fn check_trivia_answer(
        &self,
        street: Option<&str>,
        contexts: &mut dyn ContextAccess,
        reply: &mut Reply,
    ) {
        let city = contexts
            .get(FOLLOWUP_CONTEXT)
            .and_then(|c| c.parameter("city"))
            .map(str::to_string);

        let Some(city) = city else {
            error!("Expected context or parameter was not present");
            self.ask_to_restart(reply);
            return;
        };

        let Some(data) = self.dataset.get(&city) else {
            error!(%city, "Context refers to a city not in the dataset");
            self.ask_to_restart(reply);
            return;
        };

        let street = street.unwrap_or_default();
        if data.is_correct_answer(street) {
            info!(%city, street, "Correct answer");
            reply.add(format!(
                "Nice work! You got the answer right. You're truly an expert on {}.",
                city
            ));
            reply.add("Give me another city and I'll ask you more questions.");
            // Stop expecting streets for this city
            contexts.delete(FOLLOWUP_CONTEXT);
        } else {
            info!(%city, street, "Incorrect answer");
            reply.add(format!(
                "Oops, {} isn't the right street! Try another street name...",
                street
            ));
        }
    }

    fn ask_to_restart(&self, reply: &mut Reply) {
        reply.add("I'm sorry, I forgot which city we're talking about!");
        reply.add(self.restart_prompt.clone());
    }
}

fn apologize_for_city(reply: &mut Reply) {
    reply.add("I'm sorry, I'm having trouble remembering that city.");
    reply.add("Is there a different city you'd like to be quizzed on?");
}
