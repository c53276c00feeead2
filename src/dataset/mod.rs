//! Dataset - Static city trivia and street vocabularies
//!
//! The dataset is built once at startup, validated, and then shared
//! read-only between requests. It comes either from the built-in table
//! or from a TOML file:
//!
//! ```toml
//! [[cities]]
//! name = "New York"
//! synonyms = ["NYC"]
//! trivia = { question = "...", answer = "Broadway" }
//! streets = [
//!     { value = "Broadway", synonyms = ["Broadway"] },
//! ]
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while loading or validating a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("dataset contains no cities")]
    Empty,
    #[error("city '{0}' appears more than once")]
    DuplicateCity(String),
    #[error("city '{0}' has no streets")]
    NoStreets(String),
    #[error("answer '{answer}' for city '{city}' is not one of its streets")]
    AnswerNotAStreet { city: String, answer: String },
}

/// A trivia question and the street that answers it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trivia {
    pub question: String,
    pub answer: String,
}

/// A street name and the phrases that should resolve to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetEntry {
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl StreetEntry {
    pub fn new(value: &str, synonyms: &[&str]) -> Self {
        let mut entry = Self {
            value: value.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        };
        entry.normalize();
        entry
    }

    /// Ensure the canonical value is listed among its own synonyms
    fn normalize(&mut self) {
        if !self.synonyms.iter().any(|s| s == &self.value) {
            self.synonyms.insert(0, self.value.clone());
        }
    }
}

/// Everything known about one city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    /// Alternative names registered in the `city` vocabulary
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// How the city is named when listed back to the user
    #[serde(default)]
    pub spoken_name: Option<String>,
    pub trivia: Trivia,
    pub streets: Vec<StreetEntry>,
}

impl CityRecord {
    /// Canonical values of this city's streets, in order
    pub fn street_values(&self) -> impl Iterator<Item = &str> {
        self.streets.iter().map(|s| s.value.as_str())
    }

    pub fn spoken_name(&self) -> &str {
        self.spoken_name.as_deref().unwrap_or(&self.name)
    }

    /// Exact comparison, no normalization or synonym lookup
    pub fn is_correct_answer(&self, street: &str) -> bool {
        self.trivia.answer == street
    }

    fn normalize(&mut self) {
        if !self.synonyms.iter().any(|s| s == &self.name) {
            self.synonyms.insert(0, self.name.clone());
        }
        for street in &mut self.streets {
            street.normalize();
        }
    }
}

/// The immutable table of cities, in presentation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDataset {
    cities: Vec<CityRecord>,
}

static BUILTIN: Lazy<CityDataset> = Lazy::new(|| {
    let city = |name: &str,
                spoken: &str,
                synonyms: &[&str],
                question: &str,
                answer: &str,
                streets: Vec<StreetEntry>| CityRecord {
        name: name.to_string(),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        spoken_name: (spoken != name).then(|| spoken.to_string()),
        trivia: Trivia {
            question: question.to_string(),
            answer: answer.to_string(),
        },
        streets,
    };

    CityDataset {
        cities: vec![
            city(
                "New York",
                "New York",
                &["New York", "NYC"],
                "Which street in New York is famous for its musical theater?",
                "Broadway",
                vec![
                    StreetEntry::new("Wall Street", &["Wall Street"]),
                    StreetEntry::new("Fifth Avenue", &["Fifth Avenue", "5th Avenue", "5th"]),
                    StreetEntry::new("Broadway", &["Broadway"]),
                ],
            ),
            city(
                "Los Angeles",
                "LA",
                &["Los Angeles", "LA", "L.A."],
                "What street in Beverly Hills boasts some of the most expensive shops in the world?",
                "Rodeo Drive",
                vec![
                    StreetEntry::new("Rodeo Drive", &["Rodeo Drive", "Rodeo"]),
                    StreetEntry::new("Mulholland Drive", &["Mulholland Drive", "Mulholland"]),
                    StreetEntry::new("Hollywood Boulevard", &["Hollywood Boulevard"]),
                ],
            ),
            city(
                "Chicago",
                "Chicago",
                &["Chicago"],
                "Which fashionable street did Chicago's first mayor live on?",
                "Rush Street",
                vec![
                    StreetEntry::new("Rush Street", &["Rush Street", "Rush"]),
                    StreetEntry::new("Lake Shore Drive", &["Lake Shore Drive"]),
                    StreetEntry::new("Broadway", &["Broadway"]),
                ],
            ),
            city(
                "Houston",
                "Houston",
                &["Houston"],
                "What is the main street at the University of Houston?",
                "Cullen Boulevard",
                vec![
                    StreetEntry::new("Cullen Boulevard", &["Cullen Boulevard", "Cullen"]),
                    StreetEntry::new("Kirby Drive", &["Kirby Drive", "Kirby"]),
                    StreetEntry::new("Westheimer Road", &["Westheimer Road", "Westheimer"]),
                ],
            ),
        ],
    }
});

impl CityDataset {
    /// The bundled four-city table
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Build a dataset from records, normalizing synonyms and checking invariants
    pub fn from_records(mut cities: Vec<CityRecord>) -> Result<Self, DatasetError> {
        for city in &mut cities {
            city.normalize();
        }
        let dataset = Self { cities };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_toml(content: &str) -> Result<Self, DatasetError> {
        let parsed: CityDataset = toml::from_str(content)?;
        Self::from_records(parsed.cities)
    }

    pub fn load(path: &str) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Check the data-authoring invariants
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.cities.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut seen = HashSet::new();
        for city in &self.cities {
            if !seen.insert(city.name.as_str()) {
                return Err(DatasetError::DuplicateCity(city.name.clone()));
            }
            if city.streets.is_empty() {
                return Err(DatasetError::NoStreets(city.name.clone()));
            }
            if !city.street_values().any(|v| v == city.trivia.answer) {
                return Err(DatasetError::AnswerNotAStreet {
                    city: city.name.clone(),
                    answer: city.trivia.answer.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CityRecord> {
        self.cities.iter().find(|c| c.name == name)
    }

    pub fn cities(&self) -> &[CityRecord] {
        &self.cities
    }

    /// Spoken city names as a list: "A, B, or C"
    pub fn spoken_city_list(&self) -> String {
        let names: Vec<&str> = self.cities.iter().map(CityRecord::spoken_name).collect();
        match names.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [first, second] => format!("{} or {}", first, second),
            [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dataset_is_valid() {
        let dataset = CityDataset::builtin();
        assert!(dataset.validate().is_ok());
        assert_eq!(dataset.cities().len(), 4);
    }

    #[test]
    fn test_every_answer_is_a_street_of_its_city() {
        let dataset = CityDataset::builtin();
        for city in dataset.cities() {
            assert!(
                city.street_values().any(|v| v == city.trivia.answer),
                "answer for {} missing from its streets",
                city.name
            );
        }
    }

    #[test]
    fn test_street_synonyms_include_value() {
        let dataset = CityDataset::builtin();
        for city in dataset.cities() {
            for street in &city.streets {
                assert!(street.synonyms.contains(&street.value));
            }
        }
    }

    #[test]
    fn test_chicago_trivia() {
        let dataset = CityDataset::builtin();
        let chicago = dataset.get("Chicago").unwrap();
        assert_eq!(
            chicago.trivia.question,
            "Which fashionable street did Chicago's first mayor live on?"
        );
        assert!(chicago.is_correct_answer("Rush Street"));
        // Broadway is a Chicago street, just not the answer
        assert!(chicago.street_values().any(|v| v == "Broadway"));
        assert!(!chicago.is_correct_answer("Broadway"));
    }

    #[test]
    fn test_answer_comparison_is_exact() {
        let dataset = CityDataset::builtin();
        let la = dataset.get("Los Angeles").unwrap();
        assert!(!la.is_correct_answer("rodeo drive"));
        assert!(!la.is_correct_answer("Rodeo"));
    }

    #[test]
    fn test_unknown_city() {
        assert!(CityDataset::builtin().get("Boston").is_none());
    }

    #[test]
    fn test_spoken_city_list() {
        assert_eq!(
            CityDataset::builtin().spoken_city_list(),
            "New York, LA, Chicago, or Houston"
        );
    }

    #[test]
    fn test_load_from_toml_normalizes_synonyms() {
        let dataset = CityDataset::from_toml(
            r#"
[[cities]]
name = "Boston"
trivia = { question = "Where is the Freedom Trail's start?", answer = "Tremont Street" }
streets = [
    { value = "Tremont Street", synonyms = ["Tremont"] },
    { value = "Newbury Street" },
]
"#,
        )
        .unwrap();

        let boston = dataset.get("Boston").unwrap();
        assert_eq!(boston.synonyms, vec!["Boston"]);
        assert_eq!(boston.spoken_name(), "Boston");
        assert_eq!(boston.streets[0].synonyms, vec!["Tremont Street", "Tremont"]);
        assert_eq!(boston.streets[1].synonyms, vec!["Newbury Street"]);
    }

    #[test]
    fn test_answer_outside_streets_rejected() {
        let result = CityDataset::from_toml(
            r#"
[[cities]]
name = "Boston"
trivia = { question = "?", answer = "Broadway" }
streets = [{ value = "Tremont Street" }]
"#,
        );
        assert!(matches!(result, Err(DatasetError::AnswerNotAStreet { .. })));
    }

    #[test]
    fn test_duplicate_and_empty_rejected() {
        let mut cities = CityDataset::builtin().cities().to_vec();
        cities.push(cities[0].clone());
        assert!(matches!(
            CityDataset::from_records(cities),
            Err(DatasetError::DuplicateCity(_))
        ));

        assert!(matches!(
            CityDataset::from_records(Vec::new()),
            Err(DatasetError::Empty)
        ));

        let mut city = CityDataset::builtin().cities()[0].clone();
        city.streets.clear();
        assert!(matches!(
            CityDataset::from_records(vec![city]),
            Err(DatasetError::NoStreets(_))
        ));
    }
}
