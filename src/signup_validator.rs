//! Field-level validation of signup payloads, independent of any storage schema

use crate::waitlist_entry::{FarmSize, FarmType, Interest, NormalizedEmail};
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

/// Raw signup payload as submitted by a client. Every field is optional here
/// so that absence is reported as a validation failure rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub farm_type: Option<String>,
    pub farm_size: Option<String>,
    pub interests: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingField(&'static str),

    #[error("Invalid {field}: '{value}'")]
    InvalidEnum { field: &'static str, value: String },

    #[error("Malformed payload")]
    MalformedPayload,
}

/// A payload whose fields are all present, trimmed and members of their enumerations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub email: NormalizedEmail,
    pub name: String,
    pub farm_type: FarmType,
    pub farm_size: FarmSize,
    pub interests: Interest,
}

/// Validate a signup payload.
///
/// Required-field checks run for all five fields before any enumeration check,
/// so a payload missing `email` and carrying a bad `farmType` reports the
/// missing field.
pub fn validate_signup(request: &SignupRequest) -> Result<ValidSignup, ValidationError> {
    let email = required("email", &request.email)?;
    let name = required("name", &request.name)?;
    let farm_type = required("farmType", &request.farm_type)?;
    let farm_size = required("farmSize", &request.farm_size)?;
    let interests = required("interests", &request.interests)?;

    Ok(ValidSignup {
        email: NormalizedEmail::parse(email).ok_or(ValidationError::MissingField("email"))?,
        name: name.to_string(),
        farm_type: member("farmType", farm_type)?,
        farm_size: member("farmSize", farm_size)?,
        interests: member("interests", interests)?,
    })
}

fn required<'a>(
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn member<T: FromStr>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidEnum {
        field,
        value: value.to_string(),
    })
}
