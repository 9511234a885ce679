//! Test doubles and common utilities for form-flow contract tests
//!
//! This module provides minimal, scriptable backends that count their
//! calls so tests can verify the session's gating behavior without any
//! real network traffic.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use atlas_core::record::{CreatedEntity, NewEntityPayload, ReferenceOption};
use atlas_core::traits::{CatalogBackend, OptionStream};
use atlas_core::{Error, FormSession, ImageAttachment, Result};

/// A scriptable backend that counts calls
///
/// Construct with [`ScriptedBackend::succeeding`] and adjust behavior
/// through the builder methods, then share behind an `Arc` so the test
/// keeps a handle to the counters after the session takes its clone.
pub struct ScriptedBackend {
    /// Call counter for create_entity()
    create_calls: AtomicUsize,
    /// Call counter for reference_options()
    option_calls: AtomicUsize,
    /// Fail every create_entity() call
    fail_create: bool,
    /// Fail every reference_options() call
    fail_options: bool,
    /// Options served on a successful fetch
    options: Vec<ReferenceOption>,
    /// When set, create_entity() parks until the gate is notified
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    /// A backend that succeeds on every call
    pub fn succeeding() -> Self {
        Self {
            create_calls: AtomicUsize::new(0),
            option_calls: AtomicUsize::new(0),
            fail_create: false,
            fail_options: false,
            options: Vec::new(),
            gate: None,
        }
    }

    /// Serve the given options on fetch
    pub fn with_options(mut self, options: Vec<ReferenceOption>) -> Self {
        self.options = options;
        self
    }

    /// Fail every option fetch
    pub fn failing_options(mut self) -> Self {
        self.fail_options = true;
        self
    }

    /// Fail every creation request
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Park creation requests until the gate is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Number of creation requests issued
    pub fn create_call_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of option fetches issued
    pub fn option_call_count(&self) -> usize {
        self.option_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogBackend for ScriptedBackend {
    async fn reference_options(&self, _resource: &str) -> Result<OptionStream> {
        self.option_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_options {
            return Err(Error::http("scripted option failure"));
        }

        Ok(Box::pin(tokio_stream::iter(self.options.clone())))
    }

    async fn create_entity(
        &self,
        _resource: &str,
        _payload: &NewEntityPayload,
    ) -> Result<CreatedEntity> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.fail_create {
            return Err(Error::http("scripted create failure"));
        }

        Ok(CreatedEntity {
            id: Some(1),
            name: Some("Kyiv".to_string()),
            slug: Some("kyiv".to_string()),
        })
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

/// A small valid image attachment
pub fn sample_image() -> ImageAttachment {
    ImageAttachment {
        file_name: "kyiv.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4E, 0x47],
    }
}

/// Two plausible reference options
pub fn sample_options() -> Vec<ReferenceOption> {
    vec![
        ReferenceOption {
            id: "1".to_string(),
            label: "Ukraine".to_string(),
        },
        ReferenceOption {
            id: "2".to_string(),
            label: "Poland".to_string(),
        },
    ]
}

/// Fill a session so that its draft validates cleanly
pub fn fill_valid_draft(session: &FormSession) {
    session.set_name("Kyiv");
    session.set_reference("1");
    session.set_description("Capital of Ukraine");
    session.attach_image(sample_image());
}
