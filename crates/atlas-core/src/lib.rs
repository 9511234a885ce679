// # atlas-core
//
// Core library for the Atlas catalog form-session client.
//
// ## Architecture Overview
//
// This library provides the client-side flow for creating catalog entities
// against a REST backend:
// - **CatalogBackend / AccountBackend**: Traits for the remote API
// - **FormSession**: One creation flow — draft state, slug sync,
//   validation gating, single-flight submission, option cache
// - **AccountSession**: Registration, login, and signed-in user state
// - **BackendRegistry**: Plugin-based registry for backend implementations
// - **validate / slug**: Pure field rules and name → slug derivation
//
// ## Design Principles
//
// 1. **Typed state**: The draft is an explicit record, not a loose map
// 2. **Validation gates the network**: An invalid draft is never sent
// 3. **Per-session ownership**: Draft, override flag, option cache, and
//    in-flight guard live and die with one session instance
// 4. **Lenient where the UI is lenient**: Option-load failures degrade to
//    an empty list; submission failures preserve the draft for retry

pub mod account;
pub mod config;
pub mod error;
pub mod record;
pub mod registry;
pub mod session;
pub mod slug;
pub mod traits;
pub mod validate;

// Re-export core types for convenience
pub use account::{AccountSession, AccountUser, Credentials, RegisterForm};
pub use config::{BackendConfig, CatalogConfig, ResourceConfig, SessionConfig};
pub use error::{Error, Result};
pub use record::{
    CityDraft, CreatedEntity, ImageAttachment, NewEntityPayload, ReferenceOption,
    SubmissionOutcome, SubmissionReceipt,
};
pub use registry::BackendRegistry;
pub use session::{FormSession, SessionEvent};
pub use slug::derive_slug;
pub use traits::{AccountBackend, CatalogBackend, CatalogBackendFactory, OptionStream};
pub use validate::{FieldError, ValidationReport, validate_city, validate_registration};
