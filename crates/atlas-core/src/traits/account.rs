// # Account Backend Trait
//
// Defines the interface for user registration and login against the
// catalog backend's account endpoints.

use async_trait::async_trait;

use crate::account::{AccountUser, Credentials, RegisterForm};

/// Trait for account backend implementations
///
/// Implementations issue one request per method call and report the
/// result; stored credentials and signed-in state are owned by
/// [`crate::account::AccountSession`].
#[async_trait]
pub trait AccountBackend: Send + Sync {
    /// Register a new account
    ///
    /// The form is assumed to have passed
    /// [`crate::validate::validate_registration`]; only the fields the
    /// wire contract needs are transmitted (the confirmation password
    /// never leaves the client).
    async fn register(&self, form: &RegisterForm) -> Result<AccountUser, crate::Error>;

    /// Authenticate with existing credentials
    async fn login(&self, credentials: &Credentials) -> Result<AccountUser, crate::Error>;
}
