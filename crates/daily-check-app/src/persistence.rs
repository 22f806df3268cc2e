//! Persistence seam shared by the task store and the device registry.

use anyhow::{Context, Error};
use daily_check_store_fs::{FsStore, FsStoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// Minimal key-value storage required by the state objects.
pub trait KeyValueStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Read the document stored under `key`, `None` when absent.
    ///
    /// # Errors
    /// Returns a store-specific error when reading fails.
    fn load(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    /// Returns a store-specific error when writing fails.
    fn save(&self, key: &str, contents: &str) -> Result<(), Self::Error>;
}

impl KeyValueStore for FsStore {
    type Error = FsStoreError;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Self::load(self, key)
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), Self::Error> {
        Self::save(self, key, contents)
    }
}

impl<S> KeyValueStore for &S
where
    S: KeyValueStore + ?Sized,
{
    type Error = S::Error;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (*self).load(key)
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), Self::Error> {
        (*self).save(key, contents)
    }
}

impl<S> KeyValueStore for Rc<S>
where
    S: KeyValueStore + ?Sized,
{
    type Error = S::Error;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).load(key)
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), Self::Error> {
        (**self).save(key, contents)
    }
}

/// Volatile store kept in memory, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RefCell<BTreeMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Raw document currently stored under `key`.
    #[must_use]
    pub fn document(&self, key: &str) -> Option<String> {
        self.documents.borrow().get(key).cloned()
    }

    /// Seed a raw document, bypassing the write-failure switch.
    pub fn insert(&self, key: &str, contents: impl Into<String>) {
        self.documents.borrow_mut().insert(key.to_owned(), contents.into());
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Error;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.document(key))
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            anyhow::bail!("memory store rejected write to {key}");
        }
        self.insert(key, contents);
        Ok(())
    }
}

/// Load and decode the JSON document stored under `key`.
pub(crate) fn load_json<T, S>(store: &S, key: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore,
{
    let Some(raw) = store.load(key).map_err(Into::<Error>::into)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw)
        .with_context(|| format!("stored {key} document is not valid"))?;
    debug!(key, "decoded stored document");
    Ok(Some(value))
}

/// Encode `value` as JSON and store it under `key`.
pub(crate) fn save_json<T, S>(store: &S, key: &str, value: &T) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore,
{
    let raw = serde_json::to_string(value).with_context(|| format!("failed to encode {key}"))?;
    store.save(key, &raw).map_err(Into::into)
}
