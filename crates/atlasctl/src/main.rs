// # atlasctl - Catalog Creation Driver
//
// Thin command-line driver for the Atlas catalog creation flow:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Registering backends and creating one from configuration
// 4. Driving a single form session: load options, fill fields, submit
//
// All flow logic lives in atlas-core; this binary only wires it up.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Backend
// - `ATLAS_API_BASE_URL`: API base URL (required)
// - `ATLAS_HTTP_TIMEOUT_SECS`: Request timeout in seconds (optional)
//
// ### Resource naming
// - `ATLAS_OPTIONS_RESOURCE`: Reference list resource (default: countries)
// - `ATLAS_CREATE_RESOURCE`: Creation resource (default: cities)
// - `ATLAS_REFERENCE_FIELD`: Wire name of the reference field
//   (default: CountryId)
// - `ATLAS_LISTING_ROUTE`: Post-success route (default: /city)
//
// ### Draft fields
// - `ATLAS_CITY_NAME`: City name (required)
// - `ATLAS_CITY_SLUG`: Manual slug override (optional; derived otherwise)
// - `ATLAS_COUNTRY_ID`: Selected reference id (required)
// - `ATLAS_DESCRIPTION`: Description (optional)
// - `ATLAS_IMAGE_PATH`: Path to the image file (required)
//
// ### Logging
// - `ATLAS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export ATLAS_API_BASE_URL=http://localhost:5254
// export ATLAS_CITY_NAME="Київ"
// export ATLAS_COUNTRY_ID=1
// export ATLAS_IMAGE_PATH=./kyiv.jpg
//
// atlasctl
// ```

use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use atlas_core::{
    BackendConfig, CatalogConfig, FormSession, ImageAttachment, ResourceConfig, SessionConfig,
    SubmissionOutcome,
};

/// Exit codes for different termination scenarios
///
/// - 0: Entity created
/// - 1: Configuration error
/// - 2: Runtime error (submission failed, I/O failure)
#[derive(Debug, Clone, Copy)]
enum AtlasExitCode {
    /// The entity was created
    Created = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<AtlasExitCode> for ExitCode {
    fn from(code: AtlasExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    base_url: String,
    http_timeout_secs: Option<u64>,
    options_resource: String,
    create_resource: String,
    reference_field: String,
    listing_route: String,
    city_name: String,
    city_slug: Option<String>,
    country_id: String,
    description: String,
    image_path: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: env::var("ATLAS_API_BASE_URL")
                .context("ATLAS_API_BASE_URL is required. Set it via: export ATLAS_API_BASE_URL=http://localhost:5254")?,
            http_timeout_secs: env::var("ATLAS_HTTP_TIMEOUT_SECS")
                .ok()
                .map(|s| s.parse().unwrap_or(30)),
            options_resource: env::var("ATLAS_OPTIONS_RESOURCE")
                .unwrap_or_else(|_| "countries".to_string()),
            create_resource: env::var("ATLAS_CREATE_RESOURCE")
                .unwrap_or_else(|_| "cities".to_string()),
            reference_field: env::var("ATLAS_REFERENCE_FIELD")
                .unwrap_or_else(|_| "CountryId".to_string()),
            listing_route: env::var("ATLAS_LISTING_ROUTE").unwrap_or_else(|_| "/city".to_string()),
            city_name: env::var("ATLAS_CITY_NAME")
                .context("ATLAS_CITY_NAME is required. Set it via: export ATLAS_CITY_NAME=Kyiv")?,
            city_slug: env::var("ATLAS_CITY_SLUG").ok(),
            country_id: env::var("ATLAS_COUNTRY_ID")
                .context("ATLAS_COUNTRY_ID is required. Set it via: export ATLAS_COUNTRY_ID=1")?,
            description: env::var("ATLAS_DESCRIPTION").unwrap_or_default(),
            image_path: env::var("ATLAS_IMAGE_PATH")
                .context("ATLAS_IMAGE_PATH is required. Set it via: export ATLAS_IMAGE_PATH=./city.jpg")?,
            log_level: env::var("ATLAS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Performs comprehensive validation before anything is wired up:
    /// URL scheme, field presence, numeric ranges, file existence, and
    /// log level enumeration.
    fn validate(&self) -> Result<()> {
        // Validate base URL scheme
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            anyhow::bail!(
                "ATLAS_API_BASE_URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            );
        }

        if self.base_url.starts_with("http://") {
            eprintln!(
                "WARNING: ATLAS_API_BASE_URL uses HTTP (not HTTPS). \
                 This is less secure. Consider using HTTPS."
            );
        }

        // Validate draft inputs
        if self.city_name.trim().is_empty() {
            anyhow::bail!("ATLAS_CITY_NAME cannot be empty or whitespace");
        }

        if self.country_id.trim().is_empty() {
            anyhow::bail!("ATLAS_COUNTRY_ID cannot be empty");
        }

        if let Some(ref slug) = self.city_slug
            && slug.is_empty()
        {
            anyhow::bail!("ATLAS_CITY_SLUG cannot be empty when set; unset it to derive the slug");
        }

        // Validate the image path
        let image_path = Path::new(&self.image_path);
        if !image_path.exists() {
            anyhow::bail!("ATLAS_IMAGE_PATH does not exist: {}", self.image_path);
        }
        if !image_path.is_file() {
            anyhow::bail!("ATLAS_IMAGE_PATH is not a file: {}", self.image_path);
        }

        // Validate numeric ranges
        if let Some(timeout) = self.http_timeout_secs
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "ATLAS_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        // Validate log level
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ATLAS_LOG_LEVEL '{}' is not valid. \
                 Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the library-level configuration
    fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new(
            BackendConfig::Http {
                base_url: self.base_url.clone(),
                timeout_secs: self.http_timeout_secs,
            },
            ResourceConfig::new(&self.options_resource, &self.create_resource)
                .with_reference_field(&self.reference_field)
                .with_listing_route(&self.listing_route),
        )
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return AtlasExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return AtlasExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AtlasExitCode::ConfigError.into();
    }

    info!("Starting atlasctl");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AtlasExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(()) => AtlasExitCode::Created,
            Err(e) => {
                error!("Creation flow failed: {}", e);
                AtlasExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Drive one creation flow
async fn run(config: Config) -> Result<()> {
    let catalog_config = config.catalog_config();
    catalog_config
        .validate()
        .context("Invalid catalog configuration")?;

    // Create backend registry and register built-in backends
    let registry = atlas_core::BackendRegistry::new();
    atlas_backend_http::register(&registry);

    let backend: Arc<dyn atlas_core::CatalogBackend> =
        Arc::from(registry.create_backend(&catalog_config.backend)?);
    info!("Using backend: {}", backend.backend_name());

    // Read the image before opening the session
    let image = read_image(&config.image_path).await?;

    // Open the form session
    let (session, mut events) = FormSession::new(
        backend,
        catalog_config.resource.clone(),
        SessionConfig::default(),
    );

    // Drain session events into the log
    let event_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            info!("Session event: {:?}", event);
        }
    });

    // Load reference options (display-only; a failure degrades to none)
    let options = session.load_options().await;
    if options.is_empty() {
        warn!("No reference options available");
    } else {
        info!("Loaded {} reference option(s)", options.len());
        for option in &options {
            info!("  {} - {}", option.id, option.label);
        }
    }

    // Fill the draft
    session.set_name(&config.city_name);
    if let Some(ref slug) = config.city_slug {
        session.set_slug(slug);
    }
    session.set_reference(&config.country_id);
    session.set_description(&config.description);
    session.attach_image(image);

    let draft = session.draft();
    info!("Submitting '{}' (slug: {})", draft.name, draft.slug);

    // Surface validation errors before submitting
    let report = session.validate();
    if !report.is_clean() {
        for (field, field_error) in report.iter() {
            error!("Field '{}': {}", field, field_error);
        }
        session.close();
        anyhow::bail!("Draft failed validation: {}", report.summary());
    }

    let outcome = session.submit().await?;
    session.close();
    drop(event_task);

    match outcome {
        SubmissionOutcome::Success { redirect } => {
            info!("City created. Listing available at {}", redirect);
            Ok(())
        }
        SubmissionOutcome::Failure { reason } => {
            anyhow::bail!("Submission failed (draft preserved for retry): {}", reason)
        }
    }
}

/// Read the draft image from disk
async fn read_image(path: &str) -> Result<ImageAttachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image file: {}", path))?;

    let file_name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(ImageAttachment {
        content_type: content_type_for(&file_name).to_string(),
        file_name,
        bytes,
    })
}

/// Guess a MIME type from the file extension
fn content_type_for(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_covers_common_extensions() {
        assert_eq!(content_type_for("kyiv.jpg"), "image/jpeg");
        assert_eq!(content_type_for("kyiv.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("kyiv.png"), "image/png");
        assert_eq!(content_type_for("kyiv.webp"), "image/webp");
        assert_eq!(content_type_for("kyiv"), "application/octet-stream");
    }
}
