use indexmap::IndexMap;

use crate::{
    checker_config::ModelEntry,
    error::{AppError, AppResult},
};

/// Remote model bound to a category, with the confidence a concept must
/// reach for the row to pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub category: String,
    pub model_id: String,
    pub threshold: f32,
}

/// Immutable category → model mapping, built once per run from config.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelConfig>,
}

impl ModelRegistry {
    pub fn from_entries(entries: &[ModelEntry]) -> AppResult<Self> {
        let mut models = IndexMap::new();

        for entry in entries {
            if !(0.0..=1.0).contains(&entry.threshold) {
                return Err(AppError::BadRequest(format!(
                    "threshold for category '{}' must be within [0, 1], got {}",
                    entry.category, entry.threshold
                )));
            }

            let previous = models.insert(
                entry.category.clone(),
                ModelConfig {
                    category: entry.category.clone(),
                    model_id: entry.id.clone(),
                    threshold: entry.threshold,
                },
            );
            if previous.is_some() {
                return Err(AppError::BadRequest(format!(
                    "duplicate model entry for category '{}'",
                    entry.category
                )));
            }
        }

        Ok(Self { models })
    }

    /// Absence signals an unknown category to the caller; there is no other
    /// failure mode.
    pub fn lookup(&self, category: &str) -> Option<&ModelConfig> {
        self.models.get(category)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
