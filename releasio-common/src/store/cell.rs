//! Typed handle to one named cell

use super::{Store, Subscription};
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// A named, typed slot of durable state
///
/// Handles are cheap to clone; all handles for the same key in one context
/// see the same value.
#[derive(Clone)]
pub struct PersistentCell<T> {
    store: Store,
    key: String,
    default: T,
}

impl<T> PersistentCell<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub(crate) fn new(store: Store, key: &str, default: T) -> Self {
        Self {
            store,
            key: key.to_string(),
            default,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn get(&self) -> T {
        self.store.read(&self.key, self.default.clone())
    }

    pub fn set(&self, value: &T) -> Result<()> {
        self.store.write(&self.key, value)
    }

    /// Replace the value with `f(current)`, returning the new value
    pub fn update<F: FnOnce(T) -> T>(&self, f: F) -> Result<T> {
        self.store.update(&self.key, self.default.clone(), f)
    }

    /// Read-modify-write that may refuse; see [`Store::try_update`]
    pub fn try_update<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(T) -> Result<(T, R)>,
    {
        self.store.try_update(&self.key, self.default.clone(), f)
    }

    pub fn clear(&self) {
        self.store.clear(&self.key);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.store
            .subscribe(&self.key, self.default.clone(), listener)
    }
}

impl<T> fmt::Debug for PersistentCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentCell")
            .field("key", &self.key)
            .field("context", &self.store.context())
            .finish()
    }
}
