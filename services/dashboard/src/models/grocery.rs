//! Grocery list models

use serde::{Deserialize, Serialize};

/// One line of the grocery list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    #[serde(alias = "item")]
    pub name: String,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "checked")]
    pub is_checked: bool,
}

/// `GET /meal-plans/today/grocery` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    #[serde(default, alias = "items")]
    pub grocery_list: Vec<GroceryItem>,
}

impl GroceryList {
    /// Items grouped by category, in first-seen order; uncategorized last
    pub fn by_category(&self) -> Vec<(String, Vec<&GroceryItem>)> {
        let mut groups: Vec<(String, Vec<&GroceryItem>)> = Vec::new();
        let mut uncategorized = Vec::new();

        for item in &self.grocery_list {
            let Some(category) = item.category.as_deref() else {
                uncategorized.push(item);
                continue;
            };
            match groups.iter_mut().find(|(name, _)| name == category) {
                Some((_, items)) => items.push(item),
                None => groups.push((category.to_string(), vec![item])),
            }
        }

        if !uncategorized.is_empty() {
            groups.push(("other".to_string(), uncategorized));
        }
        groups
    }
}
