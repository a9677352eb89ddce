//! Dashboard for the meal planner client
//!
//! Today's meals, the consumed-nutrition aggregate and the optimistic
//! completion toggle, plus the ancillary clients the dashboard drives
//! (grocery list, insights, restaurant finder).

pub mod api;
pub mod coordinator;
pub mod models;
pub mod restaurants;
pub mod state;

pub use api::{HttpMealPlanApi, MealPlanApi};
pub use coordinator::{Dashboard, PendingToggle, ToggleOutcome};
pub use restaurants::RestaurantClient;
pub use state::{DashboardState, Notice};
