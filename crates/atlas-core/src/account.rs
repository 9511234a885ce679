//! Account session
//!
//! Registration, login, and signed-in user state. Like the form session,
//! an `AccountSession` owns its own state and validates before any request
//! leaves the client.

use std::sync::Arc;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::traits::AccountBackend;
use crate::validate::{FieldError, ValidationReport, field, validate_registration};

/// Fallback avatar shown when a user has no image
pub const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/150";

/// Registration form input
///
/// `confirm_password` exists for client-side cross-field validation only
/// and is never transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Login credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A user as the backend represents it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    #[serde(default)]
    pub roles: Vec<String>,

    /// Avatar image: an absolute URL or a bare file name on the backend
    #[serde(default)]
    pub image: Option<String>,
}

impl AccountUser {
    /// Resolve the user's avatar URL against an API base URL
    ///
    /// Absolute URLs pass through unchanged; bare file names resolve to
    /// `{base}/images/{name}`; a missing image falls back to
    /// [`PLACEHOLDER_AVATAR`].
    pub fn avatar_url(&self, base_url: &str) -> String {
        match self.image.as_deref() {
            None | Some("") => PLACEHOLDER_AVATAR.to_string(),
            Some(image) if image.starts_with("http") => image.to_string(),
            Some(image) => format!("{}/images/{}", base_url.trim_end_matches('/'), image),
        }
    }
}

/// Signed-in state held by an account session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub user: AccountUser,
    pub signed_in_at: DateTime<Utc>,
}

/// One client's account session
///
/// Owns the current signed-in user, if any. Registration validates the
/// form (including the cross-field password check) before the backend is
/// contacted.
pub struct AccountSession {
    backend: Arc<dyn AccountBackend>,
    current: Mutex<Option<SignedIn>>,
}

impl AccountSession {
    /// Create a signed-out session
    pub fn new(backend: Arc<dyn AccountBackend>) -> Self {
        Self {
            backend,
            current: Mutex::new(None),
        }
    }

    /// Register a new account and sign in as it
    ///
    /// # Returns
    ///
    /// - `Ok(AccountUser)`: Registered and signed in
    /// - `Err(Error::DraftInvalid)`: The form failed validation; nothing
    ///   was sent
    /// - `Err(Error)`: The backend rejected the registration
    pub async fn register(&self, form: &RegisterForm) -> Result<AccountUser> {
        let report = validate_registration(form);
        if !report.is_clean() {
            return Err(Error::draft_invalid(&report));
        }

        let user = self.backend.register(form).await?;
        info!("Registered account for {}", user.email);

        self.store(user.clone());
        Ok(user)
    }

    /// Sign in with existing credentials
    pub async fn login(&self, credentials: &Credentials) -> Result<AccountUser> {
        let mut report = ValidationReport::new();
        if credentials.email.trim().is_empty() {
            report.push(field::EMAIL, FieldError::Required);
        }
        if credentials.password.is_empty() {
            report.push(field::PASSWORD, FieldError::Required);
        }
        if !report.is_clean() {
            return Err(Error::draft_invalid(&report));
        }

        let user = self.backend.login(credentials).await?;
        debug!("Signed in as {}", user.email);

        self.store(user.clone());
        Ok(user)
    }

    /// Sign out
    ///
    /// Returns `true` if a user was signed in.
    pub fn logout(&self) -> bool {
        self.current.lock().unwrap().take().is_some()
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<AccountUser> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|signed_in| signed_in.user.clone())
    }

    /// Full signed-in state, including the sign-in timestamp
    pub fn signed_in(&self) -> Option<SignedIn> {
        self.current.lock().unwrap().clone()
    }

    /// Whether a user is signed in
    pub fn is_signed_in(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }

    fn store(&self, user: AccountUser) {
        *self.current.lock().unwrap() = Some(SignedIn {
            user,
            signed_in_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAccountBackend {
        calls: AtomicUsize,
    }

    impl CountingAccountBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn sample_user() -> AccountUser {
            AccountUser {
                first_name: "Olena".to_string(),
                last_name: "Shevchenko".to_string(),
                email: "olena@example.com".to_string(),
                roles: vec!["User".to_string()],
                image: None,
            }
        }
    }

    #[async_trait]
    impl AccountBackend for CountingAccountBackend {
        async fn register(&self, _form: &RegisterForm) -> Result<AccountUser> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::sample_user())
        }

        async fn login(&self, _credentials: &Credentials) -> Result<AccountUser> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::sample_user())
        }
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            first_name: "Olena".to_string(),
            last_name: "Shevchenko".to_string(),
            email: "olena@example.com".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
        }
    }

    #[tokio::test]
    async fn invalid_registration_never_reaches_backend() {
        let backend = CountingAccountBackend::new();
        let session = AccountSession::new(backend.clone());

        let form = RegisterForm {
            confirm_password: "different".to_string(),
            ..valid_form()
        };

        let result = session.register(&form).await;
        assert!(matches!(result, Err(Error::DraftInvalid(_))));
        assert_eq!(backend.call_count(), 0);
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn successful_registration_signs_in() {
        let backend = CountingAccountBackend::new();
        let session = AccountSession::new(backend.clone());

        let user = session.register(&valid_form()).await.unwrap();
        assert_eq!(user.email, "olena@example.com");
        assert_eq!(backend.call_count(), 1);
        assert!(session.is_signed_in());

        assert!(session.logout());
        assert!(!session.is_signed_in());
        assert!(!session.logout());
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let backend = CountingAccountBackend::new();
        let session = AccountSession::new(backend.clone());

        let result = session
            .login(&Credentials {
                email: "olena@example.com".to_string(),
                password: String::new(),
            })
            .await;

        assert!(matches!(result, Err(Error::DraftInvalid(_))));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn avatar_url_resolution() {
        let base = "http://localhost:5254";

        let mut user = CountingAccountBackend::sample_user();
        assert_eq!(user.avatar_url(base), PLACEHOLDER_AVATAR);

        user.image = Some("olena.jpg".to_string());
        assert_eq!(
            user.avatar_url(base),
            "http://localhost:5254/images/olena.jpg"
        );

        user.image = Some("https://cdn.example.com/olena.jpg".to_string());
        assert_eq!(user.avatar_url(base), "https://cdn.example.com/olena.jpg");

        user.image = Some(String::new());
        assert_eq!(user.avatar_url("http://localhost:5254/"), PLACEHOLDER_AVATAR);
    }
}
