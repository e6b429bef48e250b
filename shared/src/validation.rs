//! Validation utilities for Warehouse Manager
//!
//! Field formats follow Brazilian freight registration rules: vehicle plates,
//! ANTT carrier registration (RNTRC) and driver license (CNH) numbers.

use std::borrow::Cow;

use validator::ValidationError;

// ============================================================================
// Fleet Validations
// ============================================================================

/// Maximum length of a vehicle plate
pub const PLATE_MAX_LEN: usize = 7;

/// Validate a vehicle plate (1-7 uppercase alphanumeric characters)
///
/// Accepts both the old format (ABC1234) and Mercosul (ABC1D23).
pub fn validate_plate(plate: &str) -> Result<(), &'static str> {
    if plate.is_empty() {
        return Err("Plate cannot be empty");
    }
    if plate.len() > PLATE_MAX_LEN {
        return Err("Plate must be at most 7 characters");
    }
    if !plate.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Plate must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate an RNTRC carrier registration number (8 digits)
pub fn validate_rntrc(rntrc: &str) -> Result<(), &'static str> {
    if rntrc.len() != 8 || !rntrc.chars().all(|c| c.is_ascii_digit()) {
        return Err("RNTRC must be exactly 8 digits");
    }
    Ok(())
}

// ============================================================================
// Driver Validations
// ============================================================================

/// Validate a CNH driver license number (11 digits)
pub fn validate_cnh(cnh: &str) -> Result<(), &'static str> {
    let digits: String = cnh.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 || digits.len() != cnh.len() {
        return Err("CNH must be exactly 11 digits");
    }
    Ok(())
}

// ============================================================================
// Adapters for `validator` derive
// ============================================================================

fn rule(code: &'static str, check: Result<(), &'static str>) -> Result<(), ValidationError> {
    check.map_err(|msg| {
        let mut err = ValidationError::new(code);
        err.message = Some(Cow::Borrowed(msg));
        err
    })
}

pub fn plate_rule(value: &str) -> Result<(), ValidationError> {
    rule("plate", validate_plate(value))
}

pub fn rntrc_rule(value: &str) -> Result<(), ValidationError> {
    rule("rntrc", validate_rntrc(value))
}

pub fn cnh_rule(value: &str) -> Result<(), ValidationError> {
    rule("cnh", validate_cnh(value))
}
