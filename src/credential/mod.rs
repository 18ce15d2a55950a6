//! Persists the single OpenRouter API key between sessions

mod storage;
mod store;

pub use storage::{BoxedStorage, FileStorage, MemoryStorage, Storage};
pub use store::{CREDENTIAL_KEY, CREDENTIAL_PREFIX, Credential, CredentialError, CredentialStore};
