//! Intent - The intents this webhook fulfills
//!
//! Dialogflow matches user utterances to intents and reports the
//! matched intent by display name. Only the intents listed here have
//! fulfillment handlers; anything else falls back to the agent's own
//! static responses.

use std::fmt;

/// Intents with a fulfillment handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// User named a city to be quizzed on
    CityName,
    /// User answered the current city's trivia question
    TriviaAnswer,
}

impl Intent {
    pub const ALL: [Intent; 2] = [Intent::CityName, Intent::TriviaAnswer];

    /// Display name of the intent in the Dialogflow agent
    pub fn display_name(self) -> &'static str {
        match self {
            Self::CityName => "City name",
            Self::TriviaAnswer => "Trivia answer",
        }
    }

    /// Resolve a matched intent's display name
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.display_name() == name)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_intents_resolve() {
        assert_eq!(Intent::from_display_name("City name"), Some(Intent::CityName));
        assert_eq!(
            Intent::from_display_name("Trivia answer"),
            Some(Intent::TriviaAnswer)
        );
    }

    #[test]
    fn test_unknown_intent_does_not_resolve() {
        assert_eq!(Intent::from_display_name("Default Welcome Intent"), None);
        assert_eq!(Intent::from_display_name("city name"), None);
    }
}
