//! Setup - One-time registration of the agent's entity types
//!
//! Creates the `city` entity type from the dataset, then a `street`
//! entity type holding a single placeholder. Training phrases can refer
//! to `@street`, and each session later overrides it with the streets
//! of the city being quizzed.

use tracing::{error, info};

use crate::dataset::CityDataset;
use crate::dialogflow::{agent_path, ApiError, Entity, EntityKind, EntityType, EntityTypesApi};

pub const CITY_ENTITY: &str = "city";

/// The `city` entity type: one entity per dataset city
pub fn city_entity_type(dataset: &CityDataset) -> EntityType {
    EntityType {
        name: None,
        display_name: CITY_ENTITY.to_string(),
        kind: EntityKind::Map,
        entities: dataset
            .cities()
            .iter()
            .map(|city| Entity {
                value: city.name.clone(),
                synonyms: city.synonyms.clone(),
            })
            .collect(),
    }
}

/// The agent-level `street` entity type, replaced per session
pub fn street_entity_type() -> EntityType {
    EntityType {
        name: None,
        display_name: crate::fulfillment::STREET_ENTITY.to_string(),
        kind: EntityKind::Map,
        entities: vec![Entity {
            value: "Broadway".to_string(),
            synonyms: vec!["Broadway".to_string()],
        }],
    }
}

/// Create both entity types in order, stopping at the first failure
pub async fn register_vocabularies(
    api: &dyn EntityTypesApi,
    project_id: &str,
    dataset: &CityDataset,
) -> Result<Vec<EntityType>, ApiError> {
    let parent = agent_path(project_id);
    let mut created = Vec::with_capacity(2);

    for entity_type in [city_entity_type(dataset), street_entity_type()] {
        match api.create_entity_type(&parent, &entity_type).await {
            Ok(response) => {
                info!(
                    entity_type = %serde_json::to_string(&response).unwrap_or_default(),
                    "Created new entity type"
                );
                created.push(response);
            }
            Err(e) => {
                error!(display_name = %entity_type.display_name, "Error creating entity type: {}", e);
                return Err(e);
            }
        }
    }

    Ok(created)
}
