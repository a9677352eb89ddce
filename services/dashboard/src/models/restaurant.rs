//! Restaurant finder models

use serde::{Deserialize, Serialize};

/// Query sent to the restaurant recommendation service
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RestaurantQuery {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
}

/// A recommended restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub name: String,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "price")]
    pub price_level: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
}
