use std::borrow::Cow;

use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::domain::common::entities::app_errors::CoreError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const OTP_LENGTH: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    !email.trim().is_empty() && email.trim().validate_email()
}

/// At least eight characters with one letter and one digit.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(char::is_alphabetic)
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn is_valid_otp(otp: &str) -> bool {
    otp.len() == OTP_LENGTH && otp.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if is_strong_password(password) {
        return Ok(());
    }
    Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(
        "Password must be at least 8 characters and contain a letter and a digit.",
    )))
}

pub fn validate_otp(otp: &str) -> Result<(), ValidationError> {
    if is_valid_otp(otp) {
        return Ok(());
    }
    Err(ValidationError::new("otp")
        .with_message(Cow::Borrowed("The code must be exactly 6 digits.")))
}

/// Runs derived validation and reports the first failing field, checking
/// fields in `field_order` first so the message matches the form layout.
pub fn validate_fields<T: Validate>(input: &T, field_order: &[&str]) -> Result<(), CoreError> {
    match input.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(CoreError::Validation(first_message(&errors, field_order))),
    }
}

fn first_message(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().map(|field| field.as_ref()).collect();
    fields.sort_by_key(|field| {
        (
            field_order
                .iter()
                .position(|known| known == field)
                .unwrap_or(usize::MAX),
            *field,
        )
    });

    fields
        .first()
        .and_then(|field| {
            let error = field_errors.get(*field)?.first()?;
            Some(
                error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid.")),
            )
        })
        .unwrap_or_else(|| "Invalid input.".to_string())
}
