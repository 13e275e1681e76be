use serde::Serialize;
use validator::Validate;

/// Partial profile update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
pub struct UpdateProfileInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters."))]
    pub full_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150."))]
    pub age: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Gender cannot be empty."))]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0, message = "Height must be greater than zero."))]
    pub height: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0, message = "Weight must be greater than zero."))]
    pub weight: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(
        exclusive_min = 0.0,
        message = "Daily calorie goal must be greater than zero."
    ))]
    pub daily_calorie_goal: Option<f64>,
}

impl UpdateProfileInput {
    pub const FIELDS: [&'static str; 6] = [
        "full_name",
        "age",
        "gender",
        "height",
        "weight",
        "daily_calorie_goal",
    ];

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        authentication::validators::validate_fields, common::entities::app_errors::CoreError,
    };

    #[test]
    fn test_only_set_fields_are_serialized() {
        let input = UpdateProfileInput {
            weight: Some(72.5),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            serde_json::json!({ "weight": 72.5 })
        );
    }

    #[test]
    fn test_ranges() {
        let valid = UpdateProfileInput {
            age: Some(150),
            height: Some(0.5),
            ..Default::default()
        };
        assert_eq!(validate_fields(&valid, &UpdateProfileInput::FIELDS), Ok(()));

        let zero_age = UpdateProfileInput {
            age: Some(0),
            ..Default::default()
        };
        assert_eq!(
            validate_fields(&zero_age, &UpdateProfileInput::FIELDS),
            Err(CoreError::Validation("Age must be between 1 and 150.".to_string()))
        );

        let zero_goal = UpdateProfileInput {
            daily_calorie_goal: Some(0.0),
            ..Default::default()
        };
        assert!(validate_fields(&zero_goal, &UpdateProfileInput::FIELDS).is_err());
    }
}
