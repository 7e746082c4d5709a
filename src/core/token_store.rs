//! Persistence for the API auth token.
//!
//! The token lives in the platform keyring under a single well-known entry.
//! When the keyring is disabled (`--env-only`, `use_keyring = false`, tests)
//! it is held in memory for the life of the process instead.

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};

use keyring::Entry;
use tracing::debug;

pub const KEYRING_SERVICE: &str = "huddle";
pub const TOKEN_KEY: &str = "auth_token";

/// Failure reading or writing the stored token.
///
/// Recoverable errors mean the backend was temporarily unavailable (for
/// example a locked keychain).
#[derive(Debug)]
pub enum TokenStoreError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl TokenStoreError {
    fn inner(&self) -> &keyring::Error {
        match self {
            TokenStoreError::Recoverable(err) | TokenStoreError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, TokenStoreError::Recoverable(_))
    }
}

impl From<keyring::Error> for TokenStoreError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                TokenStoreError::Recoverable(err)
            }
            other => TokenStoreError::Permanent(other),
        }
    }
}

impl fmt::Display for TokenStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token storage unavailable: {}", self.inner())?;
        if self.is_recoverable() {
            write!(f, " (unlock the system keyring or rerun with --env-only)")?;
        }
        Ok(())
    }
}

impl Error for TokenStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Keyring,
    Memory(Arc<Mutex<Option<String>>>),
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    backend: Backend,
}

impl TokenStore {
    pub fn new(use_keyring: bool) -> Self {
        if use_keyring {
            Self::keyring()
        } else {
            Self::in_memory()
        }
    }

    pub fn keyring() -> Self {
        Self {
            backend: Backend::Keyring,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(None))),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, Backend::Keyring)
    }

    pub fn get_token(&self) -> Result<Option<String>, TokenStoreError> {
        match &self.backend {
            Backend::Keyring => {
                let entry = Entry::new(KEYRING_SERVICE, TOKEN_KEY)?;
                match entry.get_password() {
                    Ok(token) => Ok(Some(token)),
                    Err(keyring::Error::NoEntry) => Ok(None),
                    Err(err) => Err(err.into()),
                }
            }
            Backend::Memory(slot) => Ok(lock_slot(slot).clone()),
        }
    }

    pub fn set_token(&self, token: &str) -> Result<(), TokenStoreError> {
        match &self.backend {
            Backend::Keyring => {
                let entry = Entry::new(KEYRING_SERVICE, TOKEN_KEY)?;
                entry.set_password(token)?;
            }
            Backend::Memory(slot) => {
                *lock_slot(slot) = Some(token.to_string());
            }
        }
        debug!(persistent = self.is_persistent(), "stored auth token");
        Ok(())
    }

    /// Removes the stored token. Returns whether one was present.
    pub fn clear(&self) -> Result<bool, TokenStoreError> {
        match &self.backend {
            Backend::Keyring => {
                let entry = Entry::new(KEYRING_SERVICE, TOKEN_KEY)?;
                match entry.delete_credential() {
                    Ok(()) => Ok(true),
                    Err(keyring::Error::NoEntry) => Ok(false),
                    Err(err) => Err(err.into()),
                }
            }
            Backend::Memory(slot) => Ok(lock_slot(slot).take().is_some()),
        }
    }
}

fn lock_slot(slot: &Mutex<Option<String>>) -> std::sync::MutexGuard<'_, Option<String>> {
    // A poisoned slot still holds a usable Option.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip_and_clear() {
        let store = TokenStore::in_memory();
        assert_eq!(store.get_token().unwrap(), None);

        store.set_token("abc").unwrap();
        assert_eq!(store.get_token().unwrap().as_deref(), Some("abc"));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert_eq!(store.get_token().unwrap(), None);
    }

    #[test]
    fn clones_share_the_memory_slot() {
        let store = TokenStore::in_memory();
        let clone = store.clone();
        store.set_token("shared").unwrap();
        assert_eq!(clone.get_token().unwrap().as_deref(), Some("shared"));
        assert!(!store.is_persistent());
    }

    #[test]
    fn platform_failures_are_recoverable() {
        let err = TokenStoreError::from(keyring::Error::PlatformFailure("locked".into()));
        assert!(err.is_recoverable());
        assert!(err.to_string().ends_with("rerun with --env-only)"));
        let err = TokenStoreError::from(keyring::Error::NoEntry);
        assert!(!err.is_recoverable());
        assert!(!err.to_string().contains("--env-only"));
    }
}
