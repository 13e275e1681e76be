use serde::Serialize;
use validator::Validate;

use super::validators::{validate_otp, validate_password_strength};

#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignInInput {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

impl SignInInput {
    pub const FIELDS: [&'static str; 2] = ["email", "password"];
}

#[derive(Debug, Clone, Validate)]
pub struct SignUpInput {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

impl SignUpInput {
    pub const FIELDS: [&'static str; 3] = ["email", "password", "confirm_password"];
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct VerifyOtpInput {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom(function = "validate_otp"))]
    pub otp: String,
}

impl VerifyOtpInput {
    pub const FIELDS: [&'static str; 2] = ["email", "otp"];
}

/// Target of OTP resend and password reset requests.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct EmailInput {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

#[derive(Debug, Clone, Validate)]
pub struct SetPasswordInput {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom(function = "validate_otp"))]
    pub otp: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

impl SetPasswordInput {
    pub const FIELDS: [&'static str; 4] = ["email", "otp", "password", "confirm_password"];
}

#[derive(Debug, Clone, Validate)]
pub struct ChangePasswordInput {
    #[validate(length(min = 1, message = "Current password is required."))]
    pub old_password: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

impl ChangePasswordInput {
    pub const FIELDS: [&'static str; 3] = ["old_password", "new_password", "confirm_password"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        authentication::validators::validate_fields, common::entities::app_errors::CoreError,
    };

    #[test]
    fn test_sign_up_reports_first_field_in_form_order() {
        let input = SignUpInput {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            confirm_password: "other".to_string(),
        };
        assert_eq!(
            validate_fields(&input, &SignUpInput::FIELDS),
            Err(CoreError::Validation("Enter a valid email address.".to_string()))
        );
    }

    #[test]
    fn test_sign_up_password_mismatch() {
        let input = SignUpInput {
            email: "ana@example.com".to_string(),
            password: "abcdefg1".to_string(),
            confirm_password: "abcdefg2".to_string(),
        };
        assert_eq!(
            validate_fields(&input, &SignUpInput::FIELDS),
            Err(CoreError::Validation("Passwords do not match.".to_string()))
        );
    }

    #[test]
    fn test_otp_must_be_six_digits() {
        let input = VerifyOtpInput {
            email: "ana@example.com".to_string(),
            otp: "12a456".to_string(),
        };
        assert_eq!(
            validate_fields(&input, &VerifyOtpInput::FIELDS),
            Err(CoreError::Validation(
                "The code must be exactly 6 digits.".to_string()
            ))
        );
    }

    #[test]
    fn test_valid_set_password_passes() {
        let input = SetPasswordInput {
            email: "ana@example.com".to_string(),
            otp: "123456".to_string(),
            password: "newpass99".to_string(),
            confirm_password: "newpass99".to_string(),
        };
        assert_eq!(validate_fields(&input, &SetPasswordInput::FIELDS), Ok(()));
    }
}
