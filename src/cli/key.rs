use anyhow::Result;

use crate::core::AppConfig;
use crate::credential::{CredentialStore, FileStorage};

pub fn credential_store(config: &AppConfig) -> CredentialStore {
    CredentialStore::new(FileStorage::new(&config.storage_path))
}

pub fn set(config: &AppConfig, key: &str) -> Result<()> {
    credential_store(config).set(key)?;
    println!("API key saved securely!");
    Ok(())
}

pub fn clear(config: &AppConfig) -> Result<()> {
    credential_store(config).clear()?;
    println!("API key removed");
    Ok(())
}
