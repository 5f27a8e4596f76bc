//! Metric name rules.

use librato_error::{SpecError, SpecErrorKind};

/// Longest name the catalog accepts.
pub const MAX_NAME_LENGTH: usize = 255;

/// Check a metric name against the catalog's naming rules.
///
/// Names are 1 to 255 characters drawn from `A-Z a-z 0-9 . : - _`.
///
/// # Examples
///
/// ```
/// use librato_core::validate_name;
///
/// assert!(validate_name("tftest-metric-abc123").is_ok());
/// assert!(validate_name("librato.cpu.percent.user").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("has space").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), SpecError> {
    if name.is_empty() {
        return Err(SpecError::new(SpecErrorKind::EmptyName));
    }

    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(SpecError::new(SpecErrorKind::NameTooLong {
            length,
            limit: MAX_NAME_LENGTH,
        }));
    }

    if let Some(character) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(SpecError::new(SpecErrorKind::InvalidNameCharacter {
            name: name.to_string(),
            character,
        }));
    }

    Ok(())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '-' | '_')
}
