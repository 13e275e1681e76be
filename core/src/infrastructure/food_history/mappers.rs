use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        food_history::{
            entities::{FoodEntry, FoodImages, HistoryPage},
            value_objects::UpdateFoodEntryInput,
        },
    },
    infrastructure::http::Scalar,
};

#[derive(Debug, Deserialize)]
pub struct FoodEntryDto {
    pub id: Scalar,
    #[serde(alias = "predictedName", default)]
    pub predicted_name: Option<String>,
    #[serde(alias = "calories")]
    pub calo: Scalar,
    #[serde(default)]
    pub confidence: Option<Scalar>,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(alias = "original_image", default)]
    pub image: Option<String>,
    #[serde(alias = "segmented_image", default)]
    pub segmentation_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryPageDto {
    #[serde(default)]
    pub results: Vec<FoodEntryDto>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(alias = "totalCalories", default)]
    pub total_calories: Option<Scalar>,
}

#[derive(Debug, Serialize)]
pub struct UpdateFoodEntryBody {
    pub calo: f64,
    pub comment: String,
}

impl From<UpdateFoodEntryInput> for UpdateFoodEntryBody {
    fn from(input: UpdateFoodEntryInput) -> Self {
        Self {
            calo: input.calories,
            comment: input.comment,
        }
    }
}

/// Renders model confidence for display: fractions become percentages,
/// strings are kept as sent.
pub fn format_confidence(confidence: Option<Scalar>) -> String {
    match confidence {
        None => String::new(),
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Number(n)) => match n.as_f64() {
            Some(value) if value <= 1.0 => format!("{:.0}%", value * 100.0),
            Some(value) => format!("{value:.0}%"),
            None => n.to_string(),
        },
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| CoreError::Decode(format!("invalid created_at {raw:?}: {e}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<FoodEntryDto> for FoodEntry {
    type Error = CoreError;

    fn try_from(dto: FoodEntryDto) -> Result<Self, Self::Error> {
        let calories = dto.calo.as_f64().ok_or_else(|| {
            CoreError::Decode(format!("invalid calorie value {:?}", dto.calo))
        })?;

        Ok(Self {
            id: dto.id.into_text(),
            predicted_name: dto.predicted_name.unwrap_or_default(),
            calories,
            confidence: format_confidence(dto.confidence),
            created_at: parse_timestamp(&dto.created_at)?,
            comment: non_empty(dto.comment),
            images: FoodImages::new(non_empty(dto.image), non_empty(dto.segmentation_image)),
            is_deleting: false,
        })
    }
}

impl TryFrom<HistoryPageDto> for HistoryPage {
    type Error = CoreError;

    fn try_from(dto: HistoryPageDto) -> Result<Self, Self::Error> {
        let items = dto
            .results
            .into_iter()
            .map(FoodEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let total_calories = match dto.total_calories {
            Some(total) => total.as_f64().ok_or_else(|| {
                CoreError::Decode(format!("invalid total calories {total:?}"))
            })?,
            None => 0.0,
        };

        Ok(Self {
            items,
            has_next: dto.next.is_some_and(|next| !next.is_empty()),
            total_calories,
        })
    }
}
