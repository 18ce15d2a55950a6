use std::env;

use crate::openrouter::Endpoint;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub api_hostname: String,
    pub models: Vec<String>,
    pub default_model: Option<String>,
    pub referer: String,
    pub title: String,
}

impl AppConfig {
    /// Builds the config from any variable lookup so it can be tested
    /// without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let storage_path = lookup("ORCHAT_STORAGE_PATH").unwrap_or("./".to_string());
        let api_hostname = lookup("ORCHAT_API_HOST")
            .unwrap_or_else(|| "https://openrouter.ai/api".to_string());
        let models = lookup("ORCHAT_MODELS")
            .map(|s| parse_models(&s))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| vec![String::from("openrouter/auto")]);
        let default_model = lookup("ORCHAT_DEFAULT_MODEL").filter(|m| !m.trim().is_empty());
        let referer = lookup("ORCHAT_REFERER").unwrap_or_else(|| "http://localhost".to_string());
        let title = lookup("ORCHAT_TITLE").unwrap_or_else(|| "Simple AI Chat".to_string());

        Self {
            storage_path,
            api_hostname,
            models,
            default_model,
            referer,
            title,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            api_hostname: self.api_hostname.clone(),
            referer: self.referer.clone(),
            title: self.title.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }
}

fn parse_models(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}
