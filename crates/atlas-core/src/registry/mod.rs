//! Plugin-based backend registry
//!
//! The registry allows catalog backends to be registered dynamically at
//! runtime, so drivers select a backend from configuration instead of
//! hard-coding construction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atlas_core::registry::BackendRegistry;
//! use atlas_core::config::BackendConfig;
//!
//! let registry = BackendRegistry::new();
//!
//! // In the backend crate
//! atlas_backend_http::register(&registry);
//!
//! // Create a backend from config
//! let config = BackendConfig::Http { base_url: "http://localhost:5254".into(), timeout_secs: None };
//! let backend = registry.create_backend(&config)?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::traits::{CatalogBackend, CatalogBackendFactory};

/// Registry for plugin-based catalog backend creation
///
/// Maintains a map of backend type names to factory objects, allowing
/// dynamic instantiation of backends based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct BackendRegistry {
    /// Registered backend factories
    backends: RwLock<HashMap<String, Box<dyn CatalogBackendFactory>>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend factory
    ///
    /// # Parameters
    ///
    /// - `name`: Backend type name (e.g., "http")
    /// - `factory`: Factory object for creating backend instances
    pub fn register_backend(
        &self,
        name: impl Into<String>,
        factory: Box<dyn CatalogBackendFactory>,
    ) {
        let name = name.into();
        let mut backends = self.backends.write().unwrap();
        backends.insert(name, factory);
    }

    /// Create a backend from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Backend configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn CatalogBackend>)`: Created backend instance
    /// - `Err(Error)`: If the backend type is not registered or creation fails
    pub fn create_backend(&self, config: &BackendConfig) -> Result<Box<dyn CatalogBackend>> {
        let backend_type = config.type_name();
        let backends = self.backends.read().unwrap();

        let factory = backends
            .get(backend_type)
            .ok_or_else(|| Error::config(format!("Unknown backend type: {}", backend_type)))?;

        factory.create(config)
    }

    /// List all registered backend types
    pub fn list_backends(&self) -> Vec<String> {
        let backends = self.backends.read().unwrap();
        backends.keys().cloned().collect()
    }

    /// Check if a backend type is registered
    pub fn has_backend(&self, name: &str) -> bool {
        let backends = self.backends.read().unwrap();
        backends.contains_key(name)
    }
}
