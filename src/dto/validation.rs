//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a join PIN is a fixed-width numeric string.
///
/// # Examples
///
/// ```ignore
/// validate_pin("482917", 6) // Ok
/// validate_pin("48291", 6)  // Err - too short
/// validate_pin("48a917", 6) // Err - not numeric
/// ```
pub fn validate_pin(pin: &str, expected_len: usize) -> Result<(), ValidationError> {
    if pin.len() != expected_len {
        let mut err = ValidationError::new("pin_length");
        err.message = Some(
            format!("PIN must be exactly {expected_len} digits (got {})", pin.len()).into(),
        );
        return Err(err);
    }

    if !pin.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("pin_format");
        err.message = Some("PIN must contain only digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a player name: non-empty once trimmed and within the length cap.
pub fn validate_player_name(name: &str, max_len: usize) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("name_empty");
        err.message = Some("player name must not be empty".into());
        return Err(err);
    }

    if trimmed.chars().count() > max_len {
        let mut err = ValidationError::new("name_length");
        err.message = Some(format!("player name must be at most {max_len} characters").into());
        return Err(err);
    }

    Ok(())
}
