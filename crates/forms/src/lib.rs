//! Typed form input for the three engines.
//!
//! Each form has a wire type (what the server receives) with a `validate`
//! method, and the profile form additionally has a string-valued draft that
//! mirrors what a user types before it is parsed.

pub mod profile;
pub mod search;

pub use profile::{AreaType, INDIAN_STATES, Profile, ProfileDraft, RiskLevel};
pub use search::{ChannelSearch, FundingSearch, OUTREACH_DISTRICTS, OutreachProfile};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} has an invalid value: {value}")]
    Invalid { field: &'static str, value: String },
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        return Err(FormError::Missing(field));
    }
    Ok(())
}

pub(crate) fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), FormError> {
    if value.chars().count() > max {
        return Err(FormError::TooLong { field, max });
    }
    Ok(())
}
