// # HTTP Catalog Backend
//
// This crate provides the HTTP/REST backend implementation for the Atlas
// catalog client.
//
// ## Endpoints
//
// - List reference options: GET `{base}/api/{resource}` → JSON array of
//   `{id, name}`
// - Create entity: POST `{base}/api/{resource}` with `multipart/form-data`
//   parts `Name`, `Slug`, `Description`, `{Resource}Id`, `Image`
// - Account: POST `{base}/api/account/register` and
//   `{base}/api/account/login` with JSON bodies
//
// ## Behavior
//
// - One HTTP request per method invocation; the form session owns
//   validation gating and duplicate suppression
// - Full error propagation with specific handling for HTTP status codes
//   (401/403, 404, 429, 5xx)
// - HTTP timeout configured (30 seconds by default)
// - A 2xx creation response with an unparseable body still succeeds: the
//   created representation is informative, not required

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use atlas_core::account::{AccountUser, Credentials, RegisterForm};
use atlas_core::config::BackendConfig;
use atlas_core::record::{CreatedEntity, NewEntityPayload, ReferenceOption};
use atlas_core::registry::BackendRegistry;
use atlas_core::traits::{AccountBackend, CatalogBackend, CatalogBackendFactory, OptionStream};
use atlas_core::{Error, Result};

/// Backend name used in errors and registry registration
const BACKEND_NAME: &str = "http";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP/REST catalog backend
///
/// Holds one `reqwest::Client`; cloning the backend shares the underlying
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// API base URL without a trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a new HTTP backend with the default timeout
    ///
    /// # Parameters
    ///
    /// - `base_url`: API base URL (e.g., "http://localhost:5254")
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a new HTTP backend with a custom timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(Error::config("HTTP backend base URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build the URL for an API resource
    fn api_url(&self, resource: &str) -> String {
        format!("{}/api/{}", self.base_url, resource)
    }
}

/// Map a non-success response to a specific error
///
/// Reads the body for diagnostics, so it consumes the response.
async fn error_for_status(context: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid credentials or insufficient permissions. Status: {}",
            context, status
        )),
        404 => Error::not_found(format!("{}: resource not found. Status: {}", context, status)),
        429 => Error::rate_limited(format!(
            "{}: rate limit exceeded. Please retry later. Status: {}",
            context, status
        )),
        500..=599 => Error::backend(
            BACKEND_NAME,
            format!(
                "{}: server error (transient): {} - {}",
                context, status, error_text
            ),
        ),
        _ => Error::backend(
            BACKEND_NAME,
            format!("{}: request failed: {} - {}", context, status, error_text),
        ),
    }
}

#[async_trait]
impl CatalogBackend for HttpBackend {
    /// Fetch the reference option list for a resource
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /api/{resource}
    /// ```
    ///
    /// The response is a bare JSON array. Both numeric and string ids are
    /// accepted; entries missing an id or name are skipped with a warning
    /// rather than failing the whole list.
    async fn reference_options(&self, resource: &str) -> Result<OptionStream> {
        let url = self.api_url(resource);
        debug!("Fetching reference options from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::backend(BACKEND_NAME, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_for_status("Option fetch", response).await);
        }

        let json: Value = response.json().await.map_err(|e| {
            Error::backend(BACKEND_NAME, format!("Failed to parse response: {}", e))
        })?;

        let items = json.as_array().ok_or_else(|| {
            Error::backend(
                BACKEND_NAME,
                "Invalid response format: expected a JSON array",
            )
        })?;

        let mut options = Vec::with_capacity(items.len());
        for item in items {
            let id = match item.get("id") {
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::String(s)) => s.clone(),
                _ => {
                    warn!("Skipping reference entry without usable id: {}", item);
                    continue;
                }
            };

            let Some(label) = item.get("name").and_then(Value::as_str) else {
                warn!("Skipping reference entry without name: {}", item);
                continue;
            };

            options.push(ReferenceOption {
                id,
                label: label.to_string(),
            });
        }

        debug!("Parsed {} reference option(s)", options.len());
        Ok(Box::pin(tokio_stream::iter(options)))
    }

    /// Create an entity from a protocol-ready payload
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/{resource}
    /// Content-Type: multipart/form-data
    ///
    /// Name=...&Slug=...&Description=...&{Resource}Id=...&Image=<binary>
    /// ```
    async fn create_entity(
        &self,
        resource: &str,
        payload: &NewEntityPayload,
    ) -> Result<CreatedEntity> {
        let url = self.api_url(resource);
        debug!("Creating {} via {}", resource, url);

        let image_part = reqwest::multipart::Part::bytes(payload.image.bytes.clone())
            .file_name(payload.image.file_name.clone())
            .mime_str(&payload.image.content_type)
            .map_err(|e| Error::invalid_input(format!("Invalid image content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .text("Name", payload.name.clone())
            .text("Slug", payload.slug.clone())
            .text("Description", payload.description.clone())
            .text(payload.reference_field.clone(), payload.reference_id.clone())
            .part("Image", image_part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::backend(BACKEND_NAME, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_for_status("Entity creation", response).await);
        }

        // The created representation is optional: a 2xx with an empty or
        // unparseable body is still a success
        let created = response.json::<CreatedEntity>().await.unwrap_or_else(|e| {
            debug!("Created-entity body not parsed ({}), using empty repr", e);
            CreatedEntity::default()
        });

        Ok(created)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}

/// Wire body for registration (the confirmation password stays client-side)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Wire body for login
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[async_trait]
impl AccountBackend for HttpBackend {
    /// Register a new account
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/account/register
    /// Content-Type: application/json
    /// ```
    async fn register(&self, form: &RegisterForm) -> Result<AccountUser> {
        let url = self.api_url("account/register");

        let body = RegisterBody {
            first_name: &form.first_name,
            last_name: &form.last_name,
            email: &form.email,
            password: &form.password,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::backend(BACKEND_NAME, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_for_status("Registration", response).await);
        }

        response.json::<AccountUser>().await.map_err(|e| {
            Error::backend(BACKEND_NAME, format!("Failed to parse user response: {}", e))
        })
    }

    /// Authenticate with existing credentials
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/account/login
    /// Content-Type: application/json
    /// ```
    async fn login(&self, credentials: &Credentials) -> Result<AccountUser> {
        let url = self.api_url("account/login");

        let body = LoginBody {
            email: &credentials.email,
            password: &credentials.password,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::backend(BACKEND_NAME, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_for_status("Login", response).await);
        }

        response.json::<AccountUser>().await.map_err(|e| {
            Error::backend(BACKEND_NAME, format!("Failed to parse user response: {}", e))
        })
    }
}

/// Factory for creating HTTP backends
pub struct HttpBackendFactory;

impl CatalogBackendFactory for HttpBackendFactory {
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn CatalogBackend>> {
        match config {
            BackendConfig::Http {
                base_url,
                timeout_secs,
            } => {
                if base_url.is_empty() {
                    return Err(Error::config("HTTP backend base URL is required"));
                }

                let timeout = timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT);

                Ok(Box::new(HttpBackend::with_timeout(base_url, timeout)?))
            }
            _ => Err(Error::config("Invalid config for HTTP backend")),
        }
    }
}

/// Register the HTTP backend with a registry
///
/// This function should be called during initialization to make the
/// HTTP backend available under the `"http"` type name.
///
/// # Example
///
/// ```rust
/// use atlas_core::BackendRegistry;
///
/// let registry = BackendRegistry::new();
/// atlas_backend_http::register(&registry);
/// assert!(registry.has_backend("http"));
/// ```
pub fn register(registry: &BackendRegistry) {
    registry.register_backend(BACKEND_NAME, Box::new(HttpBackendFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_creates_from_http_config() {
        let factory = HttpBackendFactory;

        let config = BackendConfig::Http {
            base_url: "http://localhost:5254".to_string(),
            timeout_secs: Some(10),
        };

        let backend = factory.create(&config);
        assert!(backend.is_ok());
        assert_eq!(backend.unwrap().backend_name(), "http");
    }

    #[test]
    fn factory_rejects_missing_base_url() {
        let factory = HttpBackendFactory;

        let config = BackendConfig::Http {
            base_url: String::new(),
            timeout_secs: None,
        };

        assert!(factory.create(&config).is_err());
    }

    #[test]
    fn factory_rejects_foreign_config() {
        let factory = HttpBackendFactory;

        let config = BackendConfig::Custom {
            factory: "other".to_string(),
            config: serde_json::json!({}),
        };

        assert!(factory.create(&config).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:5254/").unwrap();
        assert_eq!(
            backend.api_url("countries"),
            "http://localhost:5254/api/countries"
        );
    }

    #[test]
    fn registry_registration() {
        let registry = BackendRegistry::new();
        register(&registry);
        assert!(registry.has_backend("http"));
    }
}
