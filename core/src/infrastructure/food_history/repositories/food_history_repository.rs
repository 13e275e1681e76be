use reqwest::Method;
use tracing::instrument;

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        food_history::{
            entities::{FoodEntry, HistoryPage},
            ports::FoodHistoryRepository,
            value_objects::{HistoryQuery, UpdateFoodEntryInput},
        },
    },
    infrastructure::{
        food_history::mappers::{FoodEntryDto, HistoryPageDto, UpdateFoodEntryBody},
        http::{ApiClient, Auth},
    },
};

const FOOD_HISTORY_PATH: &str = "food-history";

#[derive(Clone)]
pub struct HttpFoodHistoryRepository {
    client: ApiClient,
}

impl HttpFoodHistoryRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

pub fn query_params(query: &HistoryQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("page", query.page.to_string())];
    if let Some(ordering) = query.sort.ordering_param() {
        params.push(("ordering", ordering.to_string()));
    }
    if let Some((key, value)) = query.scope.query_param() {
        params.push((key, value));
    }
    params
}

impl FoodHistoryRepository for HttpFoodHistoryRepository {
    #[instrument(skip(self), fields(page = query.page, sort = %query.sort))]
    async fn fetch_page(&self, query: HistoryQuery) -> Result<HistoryPage, CoreError> {
        let url = self.client.endpoint(FOOD_HISTORY_PATH, &[])?;
        let request = self
            .client
            .request(Method::GET, url)
            .query(&query_params(&query));

        let dto: HistoryPageDto = self.client.send_json(request, Auth::Bearer).await?;
        HistoryPage::try_from(dto)
    }

    #[instrument(skip(self, input))]
    async fn update_entry(
        &self,
        id: String,
        input: UpdateFoodEntryInput,
    ) -> Result<FoodEntry, CoreError> {
        let url = self.client.endpoint(FOOD_HISTORY_PATH, &[id.as_str()])?;
        let request = self
            .client
            .request(Method::PATCH, url)
            .json(&UpdateFoodEntryBody::from(input));

        let dto: FoodEntryDto = self.client.send_json(request, Auth::Bearer).await?;
        FoodEntry::try_from(dto)
    }

    #[instrument(skip(self))]
    async fn delete_entry(&self, id: String) -> Result<(), CoreError> {
        let url = self.client.endpoint(FOOD_HISTORY_PATH, &[id.as_str()])?;
        self.client
            .send_empty(self.client.request(Method::DELETE, url), Auth::Bearer)
            .await
    }
}
