//! # Strategy Registry
//!
//! Lazy, memoizing factory keyed by strategy key (provider + variant).
//! A factory runs the first time its key is requested; every later lookup
//! returns the same instance, which is what lets a strategy keep session
//! state across `initialize → execute → deinitialize`.

use crate::error::{PaymentError, PaymentResult};
use crate::strategy::PaymentStrategy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type Factory<T> = Box<dyn Fn() -> Arc<T> + Send + Sync>;

/// Memoizing registry of lazily built instances
pub struct Registry<T: ?Sized> {
    factories: HashMap<String, Factory<T>>,
    instances: Mutex<HashMap<String, Arc<T>>>,
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Store a constructor for `key`. The constructor is not called here.
    ///
    /// Registering a key again replaces its factory and forgets any instance
    /// already built for it.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let key = key.into();
        self.instances.lock().remove(&key);
        self.factories.insert(key, Box::new(factory));
    }

    /// Register with builder pattern
    pub fn with<F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        self.register(key, factory);
        self
    }

    /// Get the instance for `key`, building it on first use
    pub fn get(&self, key: &str) -> PaymentResult<Arc<T>> {
        let mut instances = self.instances.lock();
        if let Some(instance) = instances.get(key) {
            return Ok(Arc::clone(instance));
        }

        let factory = self.factories.get(key).ok_or_else(|| PaymentError::NotFound {
            key: key.to_string(),
        })?;

        debug!(key, "Building registry instance");
        let instance = factory();
        instances.insert(key.to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Check if a key is registered
    pub fn has(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of payment strategies
pub type PaymentStrategyRegistry = Registry<dyn PaymentStrategy>;
