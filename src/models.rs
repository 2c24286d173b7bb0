//! Response shapes for the static listing endpoints.
//!
//! All listings are pure functions of [`RoutingConfig`]; nothing here touches
//! the network.

use serde::{Deserialize, Serialize};

use crate::routing_config::{DefaultModels, RoutingConfig};

/// OpenAI-style `{"object": "list", "data": [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelList<T> {
    pub object: String,
    pub data: Vec<T>,
}

impl<T> ModelList<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            object: "list".to_string(),
            data,
        }
    }
}

/// Entry in `/v1/models` and `/v1/chat/models`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelEntry {
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

/// Entry in `/v1/images/models`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageModelEntry {
    pub id: String,
    pub object: String,
    pub provider: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

const CHAT_OWNER: &str = "openai-compatible";

pub fn chat_models(config: &RoutingConfig) -> ModelList<ModelEntry> {
    ModelList::new(chat_entries(config))
}

/// Chat aliases followed by image models.
pub fn all_models(config: &RoutingConfig) -> ModelList<ModelEntry> {
    let mut data = chat_entries(config);
    data.extend(config.image_models.iter().map(|m| ModelEntry {
        id: m.id.clone(),
        object: "image-model".to_string(),
        owned_by: m.provider.clone(),
    }));
    ModelList::new(data)
}

pub fn image_models(config: &RoutingConfig) -> ModelList<ImageModelEntry> {
    ModelList::new(
        config
            .image_models
            .iter()
            .map(|m| ImageModelEntry {
                id: m.id.clone(),
                object: "image-model".to_string(),
                provider: m.provider.clone(),
                name: m.display_name.clone(),
                width: m.width,
                height: m.height,
            })
            .collect(),
    )
}

pub fn defaults(config: &RoutingConfig) -> &DefaultModels {
    &config.defaults
}

fn chat_entries(config: &RoutingConfig) -> Vec<ModelEntry> {
    config
        .aliases
        .iter()
        .map(|a| ModelEntry {
            id: a.alias.clone(),
            object: "model".to_string(),
            owned_by: CHAT_OWNER.to_string(),
        })
        .collect()
}
