use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    food_history::{
        entities::{FoodEntry, HistoryPage},
        value_objects::{HistoryQuery, UpdateFoodEntryInput},
    },
};

/// Remote source of truth for food history
pub trait FoodHistoryRepository: Send + Sync {
    fn fetch_page(
        &self,
        query: HistoryQuery,
    ) -> impl Future<Output = Result<HistoryPage, CoreError>> + Send;

    fn update_entry(
        &self,
        id: String,
        input: UpdateFoodEntryInput,
    ) -> impl Future<Output = Result<FoodEntry, CoreError>> + Send;

    fn delete_entry(&self, id: String) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Asks the user whether an entry should really be deleted
#[cfg_attr(test, mockall::automock)]
pub trait DeleteConfirmation: Send + Sync {
    fn confirm_delete(&self, entry: &FoodEntry) -> bool;
}

/// A list view rendering a controller's items
#[cfg_attr(test, mockall::automock)]
pub trait HistoryView: Send + Sync {
    /// Scroll back to the first item before the list content is replaced.
    fn scroll_to_origin(&self);
}
