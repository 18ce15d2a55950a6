use std::fmt;
use std::io;

use thiserror::Error;

use super::storage::{BoxedStorage, Storage};

/// Storage key holding the raw credential.
pub const CREDENTIAL_KEY: &str = "openrouter-api-key";

/// Every OpenRouter key starts with this.
pub const CREDENTIAL_PREFIX: &str = "sk-or-v1-";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Please enter an API key")]
    EmptyInput,

    #[error("Invalid API key format. OpenRouter keys start with \"sk-or-v1-\"")]
    InvalidFormat,

    #[error("Failed to access credential storage: {0}")]
    Storage(#[from] io::Error),
}

/// An OpenRouter API key. The value is redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Credential({}***)", CREDENTIAL_PREFIX)
    }
}

pub struct CredentialStore {
    storage: BoxedStorage,
}

impl CredentialStore {
    pub fn new(storage: impl Storage + Send + Sync + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Returns the stored credential. Surrounding whitespace is dropped
    /// and a blank value counts as no credential.
    pub fn get(&self) -> Option<Credential> {
        match self.storage.get(CREDENTIAL_KEY) {
            Ok(value) => value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(Credential),
            Err(e) => {
                tracing::error!("Reading credential failed: {}", e);
                None
            }
        }
    }

    /// Validates and persists `candidate`. Nothing is written when the
    /// candidate is rejected.
    pub fn set(&mut self, candidate: &str) -> Result<Credential, CredentialError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(CredentialError::EmptyInput);
        }
        if !candidate.starts_with(CREDENTIAL_PREFIX) {
            return Err(CredentialError::InvalidFormat);
        }

        self.storage.set(CREDENTIAL_KEY, candidate)?;
        tracing::debug!("Saved credential");
        Ok(Credential(candidate.to_string()))
    }

    pub fn clear(&mut self) -> Result<(), CredentialError> {
        self.storage.remove(CREDENTIAL_KEY)?;
        tracing::debug!("Removed credential");
        Ok(())
    }
}
