use crate::domain::{
    common::entities::app_errors::CoreError, food_history::value_objects::UpdateFoodEntryInput,
};

pub const MAX_COMMENT_LENGTH: usize = 255;

/// Checks the inline edit form before anything is sent to the backend.
pub fn validate_edit(calories_input: &str, comment: &str) -> Result<UpdateFoodEntryInput, CoreError> {
    let calories: f64 = calories_input
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation("Calories must be a number.".to_string()))?;

    if !calories.is_finite() {
        return Err(CoreError::Validation("Calories must be a number.".to_string()));
    }

    if calories <= 0.0 {
        return Err(CoreError::Validation(
            "Calories must be greater than zero.".to_string(),
        ));
    }

    let comment = comment.trim();
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment must be at most {MAX_COMMENT_LENGTH} characters."
        )));
    }

    Ok(UpdateFoodEntryInput {
        calories,
        comment: comment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_positive_numbers() {
        let input = validate_edit(" 180.5 ", "  lunch  ").unwrap();
        assert_eq!(input.calories, 180.5);
        assert_eq!(input.comment, "lunch");
    }

    #[test]
    fn test_rejects_non_numeric_calories() {
        for bad in ["", "abc", "12kcal", "NaN", "inf"] {
            assert!(
                matches!(validate_edit(bad, ""), Err(CoreError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_zero_and_negative_calories() {
        assert!(validate_edit("0", "").is_err());
        assert!(validate_edit("-20", "").is_err());
    }

    #[test]
    fn test_comment_length_is_counted_in_characters() {
        let at_limit = "é".repeat(MAX_COMMENT_LENGTH);
        assert!(validate_edit("100", &at_limit).is_ok());

        let too_long = "a".repeat(MAX_COMMENT_LENGTH + 1);
        assert_eq!(
            validate_edit("100", &too_long),
            Err(CoreError::Validation(
                "Comment must be at most 255 characters.".to_string()
            ))
        );
    }
}
