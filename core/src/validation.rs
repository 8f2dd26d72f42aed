//! Client-side checks run before a draft is sent.
//!
//! These mirror the backend's own constraints so users get feedback without
//! a round-trip; the backend stays authoritative. Field rules live on the
//! draft types in `types.rs` as `validator` attributes.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ApiError;

/// A question accepts at most this many answer options.
pub const MAX_ANSWER_OPTIONS: usize = 4;

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Fails once a question already has `MAX_ANSWER_OPTIONS` options.
pub fn check_option_capacity(existing: usize) -> Result<(), ValidationErrors> {
    if existing < MAX_ANSWER_OPTIONS {
        return Ok(());
    }
    let mut errors = ValidationErrors::new();
    errors.add(
        "answer_options",
        ValidationError::new("max_options").with_message(Cow::Owned(format!(
            "A question can have at most {MAX_ANSWER_OPTIONS} answer options"
        ))),
    );
    Err(errors)
}

/// Validate `draft`, logging and converting failures to `ApiError::Invalid`.
pub fn ensure_valid<T: Validate>(draft: &T) -> Result<(), ApiError> {
    draft.validate().map_err(|errors| {
        log::debug!("Rejected draft before sending: {errors}");
        ApiError::Invalid(errors)
    })
}
