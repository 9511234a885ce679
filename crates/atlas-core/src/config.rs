//! Configuration types for the Atlas catalog client
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main catalog client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Backend configuration
    pub backend: BackendConfig,

    /// Resource naming for the creation flow
    pub resource: ResourceConfig,

    /// Optional form-session settings
    #[serde(default)]
    pub session: SessionConfig,
}

impl CatalogConfig {
    /// Create a new configuration for the given backend and resource pair
    pub fn new(backend: BackendConfig, resource: ResourceConfig) -> Self {
        Self {
            backend,
            resource,
            session: SessionConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.backend.validate()?;
        self.resource.validate()?;
        Ok(())
    }
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// HTTP REST backend
    Http {
        /// Base URL of the API (e.g., "http://localhost:5254")
        base_url: String,
        /// Request timeout in seconds (default 30)
        timeout_secs: Option<u64>,
    },

    /// Custom backend
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl BackendConfig {
    /// Validate the backend configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            BackendConfig::Http {
                base_url,
                timeout_secs,
            } => {
                if base_url.is_empty() {
                    return Err(crate::Error::config("HTTP backend base URL cannot be empty"));
                }
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "HTTP backend base URL must use HTTP or HTTPS scheme. Got: {}",
                        base_url
                    )));
                }
                if let Some(timeout) = timeout_secs
                    && *timeout == 0
                {
                    return Err(crate::Error::config("HTTP backend timeout must be > 0"));
                }
                Ok(())
            }
            BackendConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom backend factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom backend config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the backend type name
    pub fn type_name(&self) -> &str {
        match self {
            BackendConfig::Http { .. } => "http",
            BackendConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Http {
            base_url: String::new(),
            timeout_secs: None,
        }
    }
}

/// Resource naming for a creation flow
///
/// Binds one form session to a concrete entity type: where its reference
/// options come from, where creation is posted, how the reference field is
/// named on the wire, and where a successful creation redirects to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource serving the reference option list (e.g., "countries")
    pub options_resource: String,

    /// Resource accepting the creation POST (e.g., "cities")
    pub create_resource: String,

    /// Wire name of the reference field in the multipart payload
    /// (e.g., "CountryId")
    #[serde(default = "default_reference_field")]
    pub reference_field: String,

    /// Route to navigate to after a successful creation
    #[serde(default = "default_listing_route")]
    pub listing_route: String,
}

impl ResourceConfig {
    /// Create a resource configuration with default field/route naming
    pub fn new(options_resource: impl Into<String>, create_resource: impl Into<String>) -> Self {
        Self {
            options_resource: options_resource.into(),
            create_resource: create_resource.into(),
            reference_field: default_reference_field(),
            listing_route: default_listing_route(),
        }
    }

    /// Set the wire name of the reference field
    pub fn with_reference_field(mut self, reference_field: impl Into<String>) -> Self {
        self.reference_field = reference_field.into();
        self
    }

    /// Set the post-success listing route
    pub fn with_listing_route(mut self, listing_route: impl Into<String>) -> Self {
        self.listing_route = listing_route.into();
        self
    }

    /// Validate the resource configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        for (label, value) in [
            ("options resource", &self.options_resource),
            ("create resource", &self.create_resource),
        ] {
            if value.is_empty() {
                return Err(crate::Error::config(format!("{} cannot be empty", label)));
            }
            if value.contains('/') {
                return Err(crate::Error::config(format!(
                    "{} must be a bare resource name, got: {}",
                    label, value
                )));
            }
        }

        if self.reference_field.is_empty() {
            return Err(crate::Error::config("reference field cannot be empty"));
        }

        if !self.listing_route.starts_with('/') {
            return Err(crate::Error::config(format!(
                "listing route must start with '/', got: {}",
                self.listing_route
            )));
        }

        Ok(())
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self::new("countries", "cities")
    }
}

fn default_reference_field() -> String {
    "CountryId".to_string()
}

fn default_listing_route() -> String {
    "/city".to_string()
}

/// Form-session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Capacity of the session event channel
    ///
    /// When full, new session events are dropped (with a warning log).
    /// This prevents unbounded memory growth when no consumer drains
    /// the channel.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    64
}
