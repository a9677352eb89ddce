//! Client for the restaurant recommendation service
//!
//! The service lives on its own origin and takes no credentials.

use common::http::classify_status;
use common::{ClientConfig, ClientError, ClientResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::models::{Restaurant, RestaurantQuery};

#[derive(Deserialize)]
#[serde(untagged)]
enum RestaurantsBody {
    Wrapped { restaurants: Vec<Restaurant> },
    Bare(Vec<Restaurant>),
}

impl From<RestaurantsBody> for Vec<Restaurant> {
    fn from(body: RestaurantsBody) -> Self {
        match body {
            RestaurantsBody::Wrapped { restaurants } => restaurants,
            RestaurantsBody::Bare(restaurants) => restaurants,
        }
    }
}

/// Restaurant finder client
#[derive(Clone)]
pub struct RestaurantClient {
    client: Client,
    base_url: String,
}

impl RestaurantClient {
    pub fn new(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.restaurant_base_url.clone(),
        }
    }

    /// `GET /restaurants` filtered by location, budget and cuisine
    pub async fn recommend(&self, query: &RestaurantQuery) -> ClientResult<Vec<Restaurant>> {
        if query.location.trim().is_empty() {
            return Err(ClientError::Validation("Location is required".to_string()));
        }

        let url = format!("{}/restaurants", self.base_url);
        debug!("GET {} for {}", url, query.location);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_status(status, message));
        }

        let body: RestaurantsBody = response.json().await?;
        let restaurants: Vec<Restaurant> = body.into();
        info!(
            "Found {} restaurants near {}",
            restaurants.len(),
            query.location
        );
        Ok(restaurants)
    }
}
