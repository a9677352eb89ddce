//! Meal-plan endpoints of the backend

use async_trait::async_trait;
use auth::interceptor::with_bearer;
use common::http::{classify_status, read_ack, read_json};
use common::{BearerToken, ClientConfig, ClientError, ClientResult};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::models::{GroceryList, TodayPlan};

/// Backend calls the dashboard depends on
#[async_trait]
pub trait MealPlanApi: Send + Sync {
    /// `GET /meal-plans/today`
    async fn today(&self, token: &BearerToken) -> ClientResult<TodayPlan>;

    /// `PATCH /meal-plans/today/:mealId/complete`
    async fn set_completion(
        &self,
        token: &BearerToken,
        meal_id: &str,
        is_completed: bool,
    ) -> ClientResult<()>;

    /// `GET /meal-plans/today/grocery`
    async fn grocery_list(&self, token: &BearerToken) -> ClientResult<GroceryList>;

    /// `POST /meal-plans/insights`
    async fn insights(&self, token: &BearerToken, request: &Value) -> ClientResult<Value>;

    /// `POST /meal-plans/generate-from-agent`
    async fn generate_from_agent(&self, token: &BearerToken, request: &Value)
    -> ClientResult<Value>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    is_completed: bool,
}

/// HTTP implementation of [`MealPlanApi`]
#[derive(Clone)]
pub struct HttpMealPlanApi {
    client: Client,
    config: ClientConfig,
}

impl HttpMealPlanApi {
    pub fn new(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// `/meal-plans/today/:mealId/complete` with the id escaped as one segment
    fn completion_url(&self, meal_id: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&self.config.api_url("/meal-plans/today"))
            .map_err(|e| ClientError::Config(format!("Invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("API base URL cannot take a path".to_string()))?
            .push(meal_id)
            .push("complete");
        Ok(url)
    }
}

#[async_trait]
impl MealPlanApi for HttpMealPlanApi {
    async fn today(&self, token: &BearerToken) -> ClientResult<TodayPlan> {
        let url = self.config.api_url("/meal-plans/today");
        debug!("GET {}", url);
        let response = with_bearer(self.client.get(url), token).send().await?;
        read_json(response, classify_status).await
    }

    async fn set_completion(
        &self,
        token: &BearerToken,
        meal_id: &str,
        is_completed: bool,
    ) -> ClientResult<()> {
        let url = self.completion_url(meal_id)?;
        debug!("PATCH {} isCompleted={}", url, is_completed);
        let response = with_bearer(self.client.patch(url), token)
            .json(&CompletionRequest { is_completed })
            .send()
            .await?;
        read_ack(response, classify_status).await
    }

    async fn grocery_list(&self, token: &BearerToken) -> ClientResult<GroceryList> {
        let url = self.config.api_url("/meal-plans/today/grocery");
        debug!("GET {}", url);
        let response = with_bearer(self.client.get(url), token).send().await?;
        read_json(response, classify_status).await
    }

    async fn insights(&self, token: &BearerToken, request: &Value) -> ClientResult<Value> {
        let url = self.config.api_url("/meal-plans/insights");
        debug!("POST {}", url);
        let response = with_bearer(self.client.post(url), token)
            .json(request)
            .send()
            .await?;
        read_json(response, classify_status).await
    }

    async fn generate_from_agent(
        &self,
        token: &BearerToken,
        request: &Value,
    ) -> ClientResult<Value> {
        let url = self.config.api_url("/meal-plans/generate-from-agent");
        debug!("POST {}", url);
        let response = with_bearer(self.client.post(url), token)
            .json(request)
            .send()
            .await?;
        read_json(response, classify_status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_url_escapes_meal_id() {
        let api = HttpMealPlanApi::new(Client::new(), ClientConfig::default());

        let url = api.completion_url("665f1c").expect("url builds");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/meal-plans/today/665f1c/complete"
        );

        let url = api.completion_url("a/b c?").expect("url builds");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/meal-plans/today/a%2Fb%20c%3F/complete"
        );
    }
}
