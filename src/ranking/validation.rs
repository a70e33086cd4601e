use super::service::RecordMeasurement;

/// Validate a measurement before it is appended.
/// Returns all validation errors at once (not just the first).
pub fn validate_measurement(input: &RecordMeasurement) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // NaN and infinities would poison sum and mean
    if !input.value.is_finite() {
        errors.push(format!("value: must be a finite number, got {}", input.value));
    }

    if input.attempt_number == Some(0) {
        errors.push("attempt_number: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a display name for a child, group or discipline.
pub fn validate_name(field: &str, name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        Err(format!("{}: must not be empty", field))
    } else {
        Ok(())
    }
}
