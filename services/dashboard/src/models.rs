//! Dashboard models for request and response payloads

pub mod grocery;
pub mod meal;
pub mod restaurant;

pub use grocery::{GroceryItem, GroceryList};
pub use meal::{MealCategory, MealEntry, MealPlan, Nutrition, TodayPlan, WeekInfo};
pub use restaurant::{Restaurant, RestaurantQuery};
