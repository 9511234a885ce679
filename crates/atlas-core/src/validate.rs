//! Declarative field validation
//!
//! Rules are evaluated independently per field — a failure on one field
//! never short-circuits the others, so a report always covers the whole
//! record. Validation is pure: no side effects, no I/O.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::account::RegisterForm;
use crate::record::CityDraft;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field name constants used in validation reports
pub mod field {
    pub const NAME: &str = "name";
    pub const SLUG: &str = "slug";
    pub const REFERENCE_ID: &str = "reference_id";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGE: &str = "image";

    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const CONFIRM_PASSWORD: &str = "confirm_password";
}

/// A single field's validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field must be provided
    #[error("value is required")]
    Required,

    /// The value is shorter than the allowed minimum
    #[error("must be at least {min} characters")]
    TooShort {
        /// Minimum accepted length
        min: usize,
    },

    /// The value is not a plausible email address
    #[error("invalid email address")]
    InvalidEmail,

    /// The value does not match its counterpart field
    #[error("values do not match")]
    Mismatch,
}

/// Per-field validation outcome for one record
///
/// An empty report means the record is submittable. Fields are keyed by
/// the constants in [`field`] and iterate in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<&'static str, FieldError>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field
    pub fn push(&mut self, field: &'static str, error: FieldError) {
        self.errors.insert(field, error);
    }

    /// Whether the record passed every rule
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the report carries no errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error recorded for a field, if any
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    /// Iterate over failing fields in stable order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }

    /// One-line summary of the failing fields, for error messages
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|(field, error)| format!("{}: {}", field, error))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Validate a city draft
///
/// Rules:
/// - `name`: required, whitespace-only counts as empty
/// - `slug`: required
/// - `reference_id`: required
/// - `image`: at least one attachment required
/// - `description`: unconstrained
pub fn validate_city(draft: &CityDraft) -> ValidationReport {
    let mut report = ValidationReport::new();

    if draft.name.trim().is_empty() {
        report.push(field::NAME, FieldError::Required);
    }
    if draft.slug.is_empty() {
        report.push(field::SLUG, FieldError::Required);
    }
    if draft.reference_id.is_empty() {
        report.push(field::REFERENCE_ID, FieldError::Required);
    }
    if draft.images.is_empty() {
        report.push(field::IMAGE, FieldError::Required);
    }

    report
}

/// Validate a registration form
///
/// Rules:
/// - `first_name`, `last_name`: required
/// - `email`: required and plausibly formed
/// - `password`: required, at least [`MIN_PASSWORD_LEN`] characters
/// - `confirm_password`: required and equal to `password`
pub fn validate_registration(form: &RegisterForm) -> ValidationReport {
    let mut report = ValidationReport::new();

    if form.first_name.trim().is_empty() {
        report.push(field::FIRST_NAME, FieldError::Required);
    }
    if form.last_name.trim().is_empty() {
        report.push(field::LAST_NAME, FieldError::Required);
    }

    if form.email.trim().is_empty() {
        report.push(field::EMAIL, FieldError::Required);
    } else if !is_plausible_email(&form.email) {
        report.push(field::EMAIL, FieldError::InvalidEmail);
    }

    if form.password.is_empty() {
        report.push(field::PASSWORD, FieldError::Required);
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        report.push(
            field::PASSWORD,
            FieldError::TooShort {
                min: MIN_PASSWORD_LEN,
            },
        );
    }

    if form.confirm_password.is_empty() {
        report.push(field::CONFIRM_PASSWORD, FieldError::Required);
    } else if form.confirm_password != form.password {
        report.push(field::CONFIRM_PASSWORD, FieldError::Mismatch);
    }

    report
}

/// Basic email shape check: one '@', non-empty local part, dotted domain
///
/// Deliberately loose — the backend owns real address verification.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ImageAttachment;

    fn sample_image() -> ImageAttachment {
        ImageAttachment {
            file_name: "kyiv.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn valid_draft() -> CityDraft {
        CityDraft {
            name: "Kyiv".to_string(),
            slug: "kyiv".to_string(),
            reference_id: "1".to_string(),
            description: String::new(),
            images: vec![sample_image()],
        }
    }

    #[test]
    fn empty_draft_fails_four_fields() {
        let report = validate_city(&CityDraft::default());

        assert_eq!(report.len(), 4);
        assert_eq!(report.error_for(field::NAME), Some(&FieldError::Required));
        assert_eq!(report.error_for(field::SLUG), Some(&FieldError::Required));
        assert_eq!(
            report.error_for(field::REFERENCE_ID),
            Some(&FieldError::Required)
        );
        assert_eq!(report.error_for(field::IMAGE), Some(&FieldError::Required));
        assert!(report.error_for(field::DESCRIPTION).is_none());
    }

    #[test]
    fn complete_draft_is_clean() {
        assert!(validate_city(&valid_draft()).is_clean());
    }

    #[test]
    fn whitespace_name_counts_as_empty() {
        let draft = CityDraft {
            name: "   ".to_string(),
            ..valid_draft()
        };
        let report = validate_city(&draft);
        assert_eq!(report.error_for(field::NAME), Some(&FieldError::Required));
    }

    #[test]
    fn description_is_optional() {
        let draft = CityDraft {
            description: String::new(),
            ..valid_draft()
        };
        assert!(validate_city(&draft).is_clean());
    }

    fn valid_registration() -> RegisterForm {
        RegisterForm {
            first_name: "Olena".to_string(),
            last_name: "Shevchenko".to_string(),
            email: "olena@example.com".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
        }
    }

    #[test]
    fn registration_accepts_valid_form() {
        assert!(validate_registration(&valid_registration()).is_clean());
    }

    #[test]
    fn registration_rejects_password_mismatch() {
        let form = RegisterForm {
            confirm_password: "different".to_string(),
            ..valid_registration()
        };
        let report = validate_registration(&form);
        assert_eq!(
            report.error_for(field::CONFIRM_PASSWORD),
            Some(&FieldError::Mismatch)
        );
    }

    #[test]
    fn registration_rejects_short_password() {
        let form = RegisterForm {
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            ..valid_registration()
        };
        let report = validate_registration(&form);
        assert_eq!(
            report.error_for(field::PASSWORD),
            Some(&FieldError::TooShort { min: 6 })
        );
    }

    #[test]
    fn registration_rejects_malformed_email() {
        for email in ["plainaddress", "@no-local.com", "user@", "user@domain"] {
            let form = RegisterForm {
                email: email.to_string(),
                ..valid_registration()
            };
            let report = validate_registration(&form);
            assert_eq!(
                report.error_for(field::EMAIL),
                Some(&FieldError::InvalidEmail),
                "expected rejection for {:?}",
                email
            );
        }
    }

    #[test]
    fn summary_lists_fields_in_order() {
        let report = validate_city(&CityDraft::default());
        let summary = report.summary();
        assert!(summary.contains("name: value is required"));
        assert!(summary.contains("slug: value is required"));
    }
}
