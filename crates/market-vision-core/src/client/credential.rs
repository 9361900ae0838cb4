//! Where the client keeps its API key between runs.

use crate::error::PersistError;

/// Persistent storage for a single credential string.
pub trait CredentialStore: Send + Sync {
    /// Previously saved credential, if any.
    fn load(&self) -> Option<String>;

    /// Replace the saved credential.
    fn save(&mut self, credential: &str) -> Result<(), PersistError>;
}

/// Pick the credential to start with: a non-empty build-time default wins,
/// otherwise whatever the store holds.
pub fn initial_credential(default: Option<&str>, store: &dyn CredentialStore) -> String {
    match default {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => store.load().unwrap_or_default(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory store; the shared cell lets tests observe writes.
    #[derive(Default, Clone)]
    pub(crate) struct MemoryStore {
        pub(crate) value: Arc<Mutex<Option<String>>>,
        pub(crate) fail: bool,
    }

    impl MemoryStore {
        pub(crate) fn with(value: &str) -> Self {
            Self {
                value: Arc::new(Mutex::new(Some(value.to_string()))),
                fail: false,
            }
        }
    }

    impl CredentialStore for MemoryStore {
        fn load(&self) -> Option<String> {
            self.value.lock().unwrap().clone()
        }

        fn save(&mut self, credential: &str) -> Result<(), PersistError> {
            if self.fail {
                return Err(PersistError("read-only".to_string()));
            }
            *self.value.lock().unwrap() = Some(credential.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_default_takes_precedence() {
        let store = MemoryStore::with("stored");
        assert_eq!(initial_credential(Some("built-in"), &store), "built-in");
    }

    #[test]
    fn test_empty_default_falls_back_to_store() {
        let store = MemoryStore::with("stored");
        assert_eq!(initial_credential(Some(""), &store), "stored");
        assert_eq!(initial_credential(None, &store), "stored");
    }

    #[test]
    fn test_nothing_anywhere_is_empty() {
        let store = MemoryStore::default();
        assert_eq!(initial_credential(None, &store), "");
    }
}
