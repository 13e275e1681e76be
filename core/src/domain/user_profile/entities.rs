use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    /// Centimetres.
    pub height: Option<f64>,
    /// Kilograms.
    pub weight: Option<f64>,
    pub daily_calorie_goal: Option<f64>,
}
