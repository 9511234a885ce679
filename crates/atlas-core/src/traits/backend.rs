// # Catalog Backend Trait
//
// Defines the interface for talking to a catalog REST backend.
//
// ## Implementations
//
// - HTTP/REST: `atlas-backend-http` crate
// - Test doubles: counting mocks under `tests/common/`
//
// ## Responsibilities
//
// Backends are transport adapters only. They perform one API call per
// method invocation and report the result; they never retry, never cache,
// and never decide whether a draft is submittable. Validation gating and
// single-flight suppression are owned by the form session.

use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::config::BackendConfig;
use crate::record::{CreatedEntity, NewEntityPayload, ReferenceOption};

/// A finite, non-restartable sequence of reference options
///
/// Produced once per fetch; draining it consumes the underlying response.
pub type OptionStream = Pin<Box<dyn Stream<Item = ReferenceOption> + Send + 'static>>;

/// Trait for catalog backend implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Fetch the reference option list for a resource
    ///
    /// Issues one GET request and returns the parsed entries as a finite
    /// stream. The stream is not restartable: a fresh call is a fresh
    /// fetch.
    ///
    /// # Parameters
    ///
    /// - `resource`: Bare resource name (e.g., "countries")
    ///
    /// # Returns
    ///
    /// - `Ok(OptionStream)`: The option entries
    /// - `Err(Error)`: If the fetch or parse failed
    async fn reference_options(&self, resource: &str) -> Result<OptionStream, crate::Error>;

    /// Create an entity from a protocol-ready payload
    ///
    /// Issues one POST request carrying the payload as multipart form
    /// data. Exactly one request per invocation; the caller owns
    /// suppression of duplicates.
    ///
    /// # Parameters
    ///
    /// - `resource`: Bare resource name accepting the POST (e.g., "cities")
    /// - `payload`: The validated, protocol-ready payload
    ///
    /// # Returns
    ///
    /// - `Ok(CreatedEntity)`: The backend accepted the creation
    /// - `Err(Error)`: Network failure or non-success status
    async fn create_entity(
        &self,
        resource: &str,
        payload: &NewEntityPayload,
    ) -> Result<CreatedEntity, crate::Error>;

    /// Get the backend name (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}

/// Helper trait for constructing catalog backends from configuration
pub trait CatalogBackendFactory: Send + Sync {
    /// Create a CatalogBackend instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this backend
    ///
    /// # Returns
    ///
    /// A boxed CatalogBackend trait object
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn CatalogBackend>, crate::Error>;
}
