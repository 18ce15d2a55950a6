//! The set of selectable models comes from configuration. Ids are
//! passed through to OpenRouter untouched.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("No models configured")]
    NoModels,

    #[error("Model id can't be empty")]
    Empty,

    #[error("Unknown model: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone)]
pub struct ModelSelector {
    models: Vec<String>,
    selected: usize,
}

impl ModelSelector {
    /// Builds a selector from the configured ids, skipping blank ones.
    /// Selects `initial` when given, otherwise the first model.
    pub fn new(models: Vec<String>, initial: Option<&str>) -> Result<Self, ModelError> {
        let models: Vec<String> = models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if models.is_empty() {
            return Err(ModelError::NoModels);
        }

        let mut selector = Self {
            models,
            selected: 0,
        };
        if let Some(id) = initial {
            selector.select(id)?;
        }
        Ok(selector)
    }

    pub fn select(&mut self, id: &str) -> Result<(), ModelError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ModelError::Empty);
        }
        self.selected = self
            .models
            .iter()
            .position(|m| m == id)
            .ok_or_else(|| ModelError::Unknown(id.to_string()))?;
        Ok(())
    }

    pub fn selected(&self) -> &str {
        &self.models[self.selected]
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}
