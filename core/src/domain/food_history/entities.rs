use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodImages {
    pub original: Option<String>,
    pub segmented: Option<String>,
}

impl FoodImages {
    pub fn new(original: Option<String>, segmented: Option<String>) -> Self {
        Self {
            original,
            segmented,
        }
    }

    /// Both the photo and its segmentation overlay are available.
    pub fn is_ready(&self) -> bool {
        self.original.is_some() && self.segmented.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: String,
    pub predicted_name: String,
    pub calories: f64,
    pub confidence: String,
    pub created_at: DateTime<Utc>,
    pub comment: Option<String>,
    pub images: FoodImages,
    /// Client-only marker for an entry whose deletion is in flight.
    #[serde(default)]
    pub is_deleting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<FoodEntry>,
    pub has_next: bool,
    /// Aggregate over the whole filtered result set, not only `items`.
    pub total_calories: f64,
}
