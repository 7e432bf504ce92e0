//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Maximum length of a service request description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Validates a free-text request description.
/// - Must contain something other than whitespace
/// - Must not exceed `MAX_DESCRIPTION_LENGTH` characters
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let trimmed = description.trim();

    if trimmed.is_empty() {
        let mut err = ValidationError::new("description_required");
        err.message = Some("Description is required".into());
        return Err(err);
    }

    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        let mut err = ValidationError::new("description_length");
        err.message = Some(
            format!(
                "Description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that an optional creation-date window is ordered.
pub fn validate_date_range(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => {
            let mut err = ValidationError::new("date_range_order");
            err.message = Some("'from' must not be after 'to'".into());
            Err(err)
        }
        _ => Ok(()),
    }
}
