//! Form session
//!
//! A `FormSession` owns one creation flow end to end:
//! - the draft under construction and its slug-override flag
//! - the reference-option cache, filled at most once
//! - the submission pipeline with single-flight suppression
//! - a bounded event channel for observers
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   set_name / set_slug / …   ┌──────────────┐
//! │  UI / driver │ ──────────────────────────▶ │  FormSession │
//! └──────────────┘                             └──────────────┘
//!                                                     │
//!                        ┌────────────────────────────┼──────────────────┐
//!                        ▼                            ▼                  ▼
//!               ┌────────────────┐          ┌─────────────────┐   ┌───────────┐
//!               │ validate_city  │          │ CatalogBackend  │   │  Events   │
//!               │ (gate)         │          │ (one POST)      │   │ (notify)  │
//!               └────────────────┘          └─────────────────┘   └───────────┘
//! ```
//!
//! Validation errors never reach the backend; backend failures come back
//! as a `Failure` outcome with the draft left intact for retry.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::config::{ResourceConfig, SessionConfig};
use crate::error::{Error, Result};
use crate::record::{
    CityDraft, ImageAttachment, NewEntityPayload, ReferenceOption, SubmissionOutcome,
    SubmissionReceipt,
};
use crate::slug::derive_slug;
use crate::traits::CatalogBackend;
use crate::validate::{ValidationReport, validate_city};

/// Events emitted by a form session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The reference option list finished loading
    OptionsLoaded {
        /// Number of options received
        count: usize,
    },

    /// The reference option fetch failed; the list stays empty
    OptionLoadFailed {
        /// Description of the underlying error
        reason: String,
    },

    /// A submission request was sent
    SubmissionStarted,

    /// The backend accepted the creation
    SubmissionSucceeded {
        /// Route the caller should navigate to
        redirect: String,
    },

    /// The submission failed; the draft is intact
    SubmissionFailed {
        /// Description of the underlying error
        reason: String,
    },

    /// A duplicate submit was suppressed while one was in flight
    SubmissionSuppressed,

    /// The session was closed
    Closed,
}

/// State owned by one form session
struct DraftState {
    draft: CityDraft,

    /// Set on direct slug input; once set, name changes stop rewriting
    /// the slug until a fresh session starts
    slug_overridden: bool,
}

/// A single creation-form session
///
/// ## Lifecycle
///
/// 1. Create with [`FormSession::new()`] — the draft starts empty
/// 2. Optionally [`load_options`](FormSession::load_options) once
/// 3. Mutate fields as the user types
/// 4. [`submit`](FormSession::submit) when the draft validates
/// 5. [`close`](FormSession::close) on teardown; results resolving after
///    close are discarded rather than applied
///
/// ## Threading
///
/// The session is `Send + Sync` and can be shared behind an `Arc`; no
/// lock is held across an await point. State never leaks across
/// sessions — draft, override flag, option cache, and receipt all die
/// with the instance.
pub struct FormSession {
    /// Backend used for option fetches and creation
    backend: Arc<dyn CatalogBackend>,

    /// Resource naming for this flow
    resource: ResourceConfig,

    /// Draft plus the slug-override flag
    state: Mutex<DraftState>,

    /// Reference options, filled at most once (also on failed loads)
    options: Mutex<Option<Vec<ReferenceOption>>>,

    /// Record of the last completed submission
    receipt: Mutex<Option<SubmissionReceipt>>,

    /// Single-flight gate for submissions
    in_flight: AtomicBool,

    /// Set by close(); late results are discarded once set
    closed: AtomicBool,

    /// Event sender for external observers
    event_tx: mpsc::Sender<SessionEvent>,
}

impl FormSession {
    /// Open a new form session with an empty draft
    ///
    /// # Parameters
    ///
    /// - `backend`: Backend implementation
    /// - `resource`: Resource naming for this flow
    /// - `config`: Session settings
    ///
    /// # Returns
    ///
    /// A tuple of (session, event_receiver) where event_receiver yields
    /// session events
    pub fn new(
        backend: Arc<dyn CatalogBackend>,
        resource: ResourceConfig,
        config: SessionConfig,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(config.event_channel_capacity.max(1));

        let session = Self {
            backend,
            resource,
            state: Mutex::new(DraftState {
                draft: CityDraft::default(),
                slug_overridden: false,
            }),
            options: Mutex::new(None),
            receipt: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            event_tx: tx,
        };

        (session, rx)
    }

    /// Set the name field, deriving the slug unless manually overridden
    ///
    /// An empty name derives an empty slug.
    pub fn set_name(&self, name: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.draft.name = name.into();
        if !state.slug_overridden {
            state.draft.slug = derive_slug(&state.draft.name);
        }
    }

    /// Set the slug field directly
    ///
    /// Marks the slug as manually edited: subsequent name changes stop
    /// rewriting it for the rest of this session.
    pub fn set_slug(&self, slug: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.draft.slug = slug.into();
        state.slug_overridden = true;
    }

    /// Set the selected reference id (kept as a string)
    pub fn set_reference(&self, reference_id: impl Into<String>) {
        self.state.lock().unwrap().draft.reference_id = reference_id.into();
    }

    /// Set the description field
    pub fn set_description(&self, description: impl Into<String>) {
        self.state.lock().unwrap().draft.description = description.into();
    }

    /// Attach an image to the draft
    ///
    /// Attachments accumulate; only the first is submitted.
    pub fn attach_image(&self, image: ImageAttachment) {
        self.state.lock().unwrap().draft.images.push(image);
    }

    /// Snapshot of the current draft
    pub fn draft(&self) -> CityDraft {
        self.state.lock().unwrap().draft.clone()
    }

    /// Validate the current draft
    pub fn validate(&self) -> ValidationReport {
        validate_city(&self.state.lock().unwrap().draft)
    }

    /// Load the reference option list, once
    ///
    /// The first call fetches and caches; later calls return the cached
    /// list without touching the backend. A failed fetch caches an empty
    /// list — the failure is logged and reported as a session event but
    /// never raised to the caller, and it is not retried.
    pub async fn load_options(&self) -> Vec<ReferenceOption> {
        if let Some(options) = self.options.lock().unwrap().clone() {
            return options;
        }

        let fetched = self
            .backend
            .reference_options(&self.resource.options_resource)
            .await;

        let loaded = match fetched {
            Ok(stream) => {
                let options: Vec<ReferenceOption> = stream.collect().await;
                self.emit_event(SessionEvent::OptionsLoaded {
                    count: options.len(),
                });
                options
            }
            Err(e) => {
                warn!(
                    "Failed to load reference options for {}: {}",
                    self.resource.options_resource, e
                );
                self.emit_event(SessionEvent::OptionLoadFailed {
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };

        if self.closed.load(Ordering::SeqCst) {
            debug!("Session closed during option load, discarding result");
            return loaded;
        }

        let mut guard = self.options.lock().unwrap();
        match guard.as_ref() {
            // A concurrent load won the race; its list is the session's
            Some(existing) => existing.clone(),
            None => {
                *guard = Some(loaded.clone());
                loaded
            }
        }
    }

    /// The cached option list, if a load has completed
    pub fn options(&self) -> Option<Vec<ReferenceOption>> {
        self.options.lock().unwrap().clone()
    }

    /// Submit the draft
    ///
    /// The one suspension point of the pipeline is the backend call.
    /// Validation errors and duplicate in-flight attempts are rejected
    /// before any request is made.
    ///
    /// # Returns
    ///
    /// - `Ok(SubmissionOutcome::Success { redirect })`: Entity created
    /// - `Ok(SubmissionOutcome::Failure { reason })`: Request failed; the
    ///   draft is intact and can be resubmitted
    /// - `Err(Error::SessionClosed)`: The session was closed
    /// - `Err(Error::DraftInvalid)`: The draft failed validation
    /// - `Err(Error::SubmissionInFlight)`: Another submit is in flight
    pub async fn submit(&self) -> Result<SubmissionOutcome> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }

        let payload = {
            let state = self.state.lock().unwrap();
            let report = validate_city(&state.draft);
            if !report.is_clean() {
                return Err(Error::draft_invalid(&report));
            }
            build_payload(&state.draft, &self.resource)?
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Suppressing duplicate submit while one is in flight");
            self.emit_event(SessionEvent::SubmissionSuppressed);
            return Err(Error::SubmissionInFlight);
        }

        self.emit_event(SessionEvent::SubmissionStarted);

        let result = self
            .backend
            .create_entity(&self.resource.create_resource, &payload)
            .await;

        self.in_flight.store(false, Ordering::SeqCst);

        let outcome = match result {
            Ok(created) => {
                debug!(
                    "Created {} (id: {:?})",
                    self.resource.create_resource, created.id
                );
                SubmissionOutcome::Success {
                    redirect: self.resource.listing_route.clone(),
                }
            }
            Err(e) => SubmissionOutcome::Failure {
                reason: e.to_string(),
            },
        };

        if self.closed.load(Ordering::SeqCst) {
            debug!("Session closed while submission was in flight, discarding result");
            return Ok(outcome);
        }

        match &outcome {
            SubmissionOutcome::Success { redirect } => {
                self.emit_event(SessionEvent::SubmissionSucceeded {
                    redirect: redirect.clone(),
                });
            }
            SubmissionOutcome::Failure { reason } => {
                warn!("Submission failed: {}", reason);
                self.emit_event(SessionEvent::SubmissionFailed {
                    reason: reason.clone(),
                });
            }
        }

        *self.receipt.lock().unwrap() = Some(SubmissionReceipt::new(outcome.clone()));

        Ok(outcome)
    }

    /// Whether a submission is currently in flight
    ///
    /// The submit control should render disabled/busy while this is true.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The session's record of its last completed submission
    pub fn last_receipt(&self) -> Option<SubmissionReceipt> {
        self.receipt.lock().unwrap().clone()
    }

    /// Close the session
    ///
    /// Further submits are rejected, and any call still in flight
    /// discards its result instead of applying it.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.emit_event(SessionEvent::Closed);
        }
    }

    /// Whether the session has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Emit a session event
    fn emit_event(&self, event: SessionEvent) {
        // Send event, logging a warning if the channel is full. Events are
        // observability only; a slow or absent consumer must not block the
        // form flow.
        if self.event_tx.try_send(event).is_err() {
            warn!("Session event channel full or closed, dropping event");
        }
    }
}

/// Build the protocol-ready payload from a validated draft
///
/// Only the first attachment is carried; extras are ignored.
fn build_payload(draft: &CityDraft, resource: &ResourceConfig) -> Result<NewEntityPayload> {
    let image = draft
        .images
        .first()
        .cloned()
        .ok_or_else(|| Error::invalid_input("no image attached"))?;

    if draft.images.len() > 1 {
        debug!(
            "Ignoring {} extra image attachment(s)",
            draft.images.len() - 1
        );
    }

    Ok(NewEntityPayload {
        name: draft.name.clone(),
        slug: draft.slug.clone(),
        description: draft.description.clone(),
        reference_field: resource.reference_field.clone(),
        reference_id: draft.reference_id.clone(),
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::record::CreatedEntity;
    use crate::traits::OptionStream;

    /// Backend that answers nothing; field mutators never touch it
    struct NullBackend;

    #[async_trait]
    impl CatalogBackend for NullBackend {
        async fn reference_options(&self, _resource: &str) -> Result<OptionStream> {
            Err(Error::http("null backend"))
        }

        async fn create_entity(
            &self,
            _resource: &str,
            _payload: &NewEntityPayload,
        ) -> Result<CreatedEntity> {
            Err(Error::http("null backend"))
        }

        fn backend_name(&self) -> &'static str {
            "null"
        }
    }

    fn session() -> FormSession {
        let (session, _rx) = FormSession::new(
            Arc::new(NullBackend),
            ResourceConfig::default(),
            SessionConfig::default(),
        );
        session
    }

    #[test]
    fn name_changes_drive_slug() {
        let session = session();

        session.set_name("Kyiv");
        assert_eq!(session.draft().slug, "kyiv");

        session.set_name("Kyiv City");
        assert_eq!(session.draft().slug, "kyiv-city");
    }

    #[test]
    fn manual_slug_sticks_for_the_session() {
        let session = session();

        session.set_name("Kyiv");
        session.set_slug("custom-slug");
        session.set_name("Lviv");

        assert_eq!(session.draft().name, "Lviv");
        assert_eq!(session.draft().slug, "custom-slug");
    }

    #[test]
    fn empty_name_derives_empty_slug() {
        let session = session();

        session.set_name("Kyiv");
        session.set_name("");
        assert_eq!(session.draft().slug, "");
    }

    #[test]
    fn fresh_session_resets_override() {
        let first = session();
        first.set_slug("stuck");

        let second = session();
        second.set_name("Odesa");
        assert_eq!(second.draft().slug, "odesa");
    }

    #[test]
    fn validate_reflects_current_draft() {
        let session = session();
        assert_eq!(session.validate().len(), 4);

        session.set_name("Kyiv");
        session.set_reference("1");
        session.attach_image(ImageAttachment {
            file_name: "kyiv.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1],
        });
        assert!(session.validate().is_clean());
    }

    #[test]
    fn payload_takes_first_image_only() {
        let draft = CityDraft {
            name: "Kyiv".to_string(),
            slug: "kyiv".to_string(),
            reference_id: "1".to_string(),
            description: String::new(),
            images: vec![
                ImageAttachment {
                    file_name: "first.png".to_string(),
                    content_type: "image/png".to_string(),
                    bytes: vec![1],
                },
                ImageAttachment {
                    file_name: "second.png".to_string(),
                    content_type: "image/png".to_string(),
                    bytes: vec![2],
                },
            ],
        };

        let payload = build_payload(&draft, &ResourceConfig::default()).unwrap();
        assert_eq!(payload.image.file_name, "first.png");
        assert_eq!(payload.reference_field, "CountryId");
    }
}
