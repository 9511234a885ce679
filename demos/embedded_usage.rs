//! Minimal embedding example for atlas-core
//!
//! This example demonstrates using atlas-core as a library in a custom
//! application with an in-memory backend. The session lifecycle is fully
//! managed by the application; no network access is required.

#![allow(dead_code)]

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use atlas_core::record::{CreatedEntity, NewEntityPayload, ReferenceOption};
use atlas_core::traits::{CatalogBackend, OptionStream};
use atlas_core::{
    FormSession, ImageAttachment, ResourceConfig, Result, SessionConfig, SubmissionOutcome,
};
use tokio_stream::Stream;

/// Custom in-memory backend for embedded usage
struct EmbeddedBackend {
    options: Vec<ReferenceOption>,
    create_calls: Arc<AtomicUsize>,
}

impl EmbeddedBackend {
    fn new() -> Self {
        Self {
            options: vec![
                ReferenceOption {
                    id: "1".to_string(),
                    label: "Ukraine".to_string(),
                },
                ReferenceOption {
                    id: "2".to_string(),
                    label: "Poland".to_string(),
                },
            ],
            create_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogBackend for EmbeddedBackend {
    async fn reference_options(&self, _resource: &str) -> Result<OptionStream> {
        let stream: Pin<Box<dyn Stream<Item = ReferenceOption> + Send + 'static>> =
            Box::pin(tokio_stream::iter(self.options.clone()));
        Ok(stream)
    }

    async fn create_entity(
        &self,
        resource: &str,
        payload: &NewEntityPayload,
    ) -> Result<CreatedEntity> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] Creating {} '{}'", resource, payload.name);

        Ok(CreatedEntity {
            id: Some(1),
            name: Some(payload.name.clone()),
            slug: Some(payload.slug.clone()),
        })
    }

    fn backend_name(&self) -> &'static str {
        "embedded"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded atlas-core Example ===\n");

    // Create a custom backend
    let backend = Arc::new(EmbeddedBackend::new());

    // Open a form session
    println!("1. Opening form session...");
    let (session, mut event_rx) = FormSession::new(
        backend.clone(),
        ResourceConfig::default(),
        SessionConfig::default(),
    );

    // Spawn event listener (optional)
    let event_listener = tokio::spawn(async move {
        println!("2. Event listener started");
        while let Some(event) = event_rx.recv().await {
            println!("[Event] {:?}", event);
        }
        println!("Event listener stopped");
    });

    // Load reference options
    println!("3. Loading reference options...");
    let options = session.load_options().await;
    for option in &options {
        println!("   option {} - {}", option.id, option.label);
    }

    // Fill the draft; the slug tracks the name automatically
    println!("\n4. Filling the draft...");
    session.set_name("Київ");
    println!("   derived slug: {}", session.draft().slug);
    session.set_reference("1");
    session.set_description("Capital of Ukraine");
    session.attach_image(ImageAttachment {
        file_name: "kyiv.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4E, 0x47],
    });

    // Submit
    println!("\n5. Submitting...");
    match session.submit().await? {
        SubmissionOutcome::Success { redirect } => {
            println!("   created; navigate to {}", redirect);
        }
        SubmissionOutcome::Failure { reason } => {
            println!("   failed: {}", reason);
        }
    }

    println!("   backend saw {} creation request(s)", backend.create_count());

    // Close the session; late results would be discarded from here on
    session.close();
    drop(session);

    let _ = tokio::time::timeout(tokio::time::Duration::from_millis(100), event_listener).await;

    println!("\n=== Embedding Successful ===");
    println!("Key Points:");
    println!("- Session lifecycle is fully controlled by the application");
    println!("- No global state");
    println!("- Validation and duplicate suppression live in the library");

    Ok(())
}
