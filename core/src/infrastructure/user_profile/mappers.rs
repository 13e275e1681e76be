use serde::Deserialize;

use crate::{domain::user_profile::entities::UserProfile, infrastructure::http::Scalar};

/// Decimal fields may arrive as strings; camelCase names are accepted too.
#[derive(Debug, Deserialize)]
pub struct UserProfileDto {
    #[serde(default)]
    pub email: String,
    #[serde(alias = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub age: Option<Scalar>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub height: Option<Scalar>,
    #[serde(default)]
    pub weight: Option<Scalar>,
    #[serde(alias = "dailyCalorieGoal", default)]
    pub daily_calorie_goal: Option<Scalar>,
}

fn number(value: Option<Scalar>) -> Option<f64> {
    value.as_ref().and_then(Scalar::as_f64)
}

impl From<UserProfileDto> for UserProfile {
    fn from(dto: UserProfileDto) -> Self {
        Self {
            email: dto.email,
            full_name: dto.full_name,
            age: number(dto.age).map(|age| age as u32),
            gender: dto.gender,
            height: number(dto.height),
            weight: number(dto.weight),
            daily_calorie_goal: number(dto.daily_calorie_goal),
        }
    }
}
