//! Sender identity: the opaque session key the webhook uses to keep context.
//!
//! The identity is generated once per profile and persisted in a key-value
//! store. The client never touches storage directly; it goes through an
//! [`IdentityProvider`], so tests can swap in [`MemoryIdentityStore`].

use core::fmt;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of every generated identity.
pub const SENDER_PREFIX: &str = "campus-";

/// Length of the random suffix.
pub const SENDER_SUFFIX_LEN: usize = 12;

/// Storage key of the persisted identity.
pub const SENDER_STORAGE_KEY: &str = "rasa_sender_id";

/// Errors produced while loading or storing the identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Reading or writing the identity file failed.
    #[error("identity storage io error: {0}")]
    Io(#[from] io::Error),
    /// The identity file is not a JSON object of strings.
    #[error("identity storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Opaque per-profile session key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderIdentity(String);

impl SenderIdentity {
    /// Generate a fresh identity: fixed prefix plus a random alphanumeric suffix.
    #[must_use]
    pub fn generate() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SENDER_SUFFIX_LEN)
            .map(char::from)
            .collect();
        Self(format!("{SENDER_PREFIX}{suffix}"))
    }

    /// Wrap a stored value. Blank values are rejected.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Borrow the identity string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of the sender identity.
pub trait IdentityProvider: Send + Sync {
    /// Identity already stored, if any.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    fn get(&self) -> Result<Option<SenderIdentity>, IdentityError>;

    /// Generate a new identity and persist it.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    fn create_and_store(&self) -> Result<SenderIdentity, IdentityError>;

    /// Stored identity, creating one on first use.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read or written.
    fn get_or_create(&self) -> Result<SenderIdentity, IdentityError> {
        match self.get()? {
            Some(identity) => Ok(identity),
            None => {
                let identity = self.create_and_store()?;
                tracing::info!("Created sender identity {identity}");
                Ok(identity)
            }
        }
    }
}

/// In-memory key-value store. Lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    entries: DashMap<String, String>,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `identity`.
    #[must_use]
    pub fn with_identity(identity: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .entries
            .insert(SENDER_STORAGE_KEY.to_string(), identity.into());
        store
    }
}

impl IdentityProvider for MemoryIdentityStore {
    fn get(&self) -> Result<Option<SenderIdentity>, IdentityError> {
        Ok(self
            .entries
            .get(SENDER_STORAGE_KEY)
            .and_then(|entry| SenderIdentity::from_stored(entry.value().clone())))
    }

    fn create_and_store(&self) -> Result<SenderIdentity, IdentityError> {
        let identity = SenderIdentity::generate();
        self.entries
            .insert(SENDER_STORAGE_KEY.to_string(), identity.as_str().to_string());
        Ok(identity)
    }
}

/// Key-value store backed by a JSON file, one per profile.
///
/// Other keys in the file are preserved on write.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Use the file at `path`; it is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, IdentityError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl IdentityProvider for FileIdentityStore {
    fn get(&self) -> Result<Option<SenderIdentity>, IdentityError> {
        let mut entries = self.read_entries()?;
        Ok(entries
            .remove(SENDER_STORAGE_KEY)
            .and_then(SenderIdentity::from_stored))
    }

    fn create_and_store(&self) -> Result<SenderIdentity, IdentityError> {
        let mut entries = self.read_entries()?;
        let identity = SenderIdentity::generate();
        entries.insert(SENDER_STORAGE_KEY.to_string(), identity.as_str().to_string());
        self.write_entries(&entries)?;
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_identity_shape() {
        let identity = SenderIdentity::generate();
        let suffix = identity.as_str().strip_prefix(SENDER_PREFIX);

        assert!(suffix.is_some());
        let suffix = suffix.unwrap_or_default();
        assert_eq!(suffix.len(), SENDER_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(identity, SenderIdentity::generate());
    }

    #[test]
    fn test_blank_stored_value_is_ignored() {
        assert!(SenderIdentity::from_stored("  ").is_none());
        assert!(SenderIdentity::from_stored("campus-abc").is_some());
    }

    #[test]
    fn test_memory_store_get_or_create_is_stable() -> Result<(), IdentityError> {
        let store = MemoryIdentityStore::new();
        assert!(store.get()?.is_none());

        let first = store.get_or_create()?;
        let second = store.get_or_create()?;
        assert_eq!(first, second);
        assert_eq!(store.get()?, Some(first));
        Ok(())
    }

    #[test]
    fn test_memory_store_with_identity() -> Result<(), IdentityError> {
        let store = MemoryIdentityStore::with_identity("campus-fixed");
        assert_eq!(store.get_or_create()?.as_str(), "campus-fixed");
        Ok(())
    }

    #[test]
    fn test_file_store_persists_across_instances() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("profile").join("identity.json");

        let created = FileIdentityStore::new(&path).get_or_create()?;
        let reloaded = FileIdentityStore::new(&path).get()?;

        assert_eq!(reloaded, Some(created));
        Ok(())
    }

    #[test]
    fn test_file_store_keeps_other_keys() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("identity.json");
        fs::write(&path, r#"{"theme":"dark"}"#)?;

        let store = FileIdentityStore::new(&path);
        assert!(store.get()?.is_none());
        store.create_and_store()?;

        let entries: BTreeMap<String, String> = serde_json::from_slice(&fs::read(&path)?)?;
        assert_eq!(entries.get("theme").map(String::as_str), Some("dark"));
        assert!(entries.contains_key(SENDER_STORAGE_KEY));
        Ok(())
    }

    #[test]
    fn test_file_store_reports_corrupt_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("identity.json");
        fs::write(&path, "not json")?;

        let result = FileIdentityStore::new(&path).get();
        assert!(matches!(result, Err(IdentityError::Serialization(_))));
        Ok(())
    }
}
