//! Dashboard state published to observers

use common::{ClientError, ErrorKind};

use crate::models::{MealEntry, Nutrition, TodayPlan, WeekInfo};

pub const RETRY_NOTICE: &str = "Failed to save your progress, try again";
pub const REAUTH_NOTICE: &str = "Your session has expired, please log in again";

/// Dismissible message shown after a failed background confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
}

impl Notice {
    pub fn for_error(err: &ClientError) -> Self {
        let message = if err.is_auth_failure() {
            REAUTH_NOTICE
        } else {
            RETRY_NOTICE
        };
        Notice {
            kind: err.kind(),
            message: message.to_string(),
        }
    }
}

/// Snapshot of what the dashboard shows
///
/// `consumed` is derived from `entries` and is only ever rewritten by
/// [`DashboardState::recompute`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    pub entries: Vec<MealEntry>,
    pub consumed: Nutrition,
    pub week_info: Option<WeekInfo>,
    pub notice: Option<Notice>,
    pub loaded: bool,
}

/// Sum of nutrition over completed entries
pub fn consumed_totals(entries: &[MealEntry]) -> Nutrition {
    entries
        .iter()
        .filter(|entry| entry.is_completed)
        .map(|entry| entry.nutrition)
        .sum()
}

impl DashboardState {
    pub fn from_plan(plan: TodayPlan) -> Self {
        let mut state = DashboardState {
            entries: plan.meal_plan.meals,
            consumed: Nutrition::default(),
            week_info: plan.week_info,
            notice: None,
            loaded: true,
        };
        state.recompute();
        state
    }

    pub fn recompute(&mut self) {
        self.consumed = consumed_totals(&self.entries);
    }

    pub fn entry(&self, id: &str) -> Option<&MealEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Sum of nutrition over every planned entry
    pub fn planned(&self) -> Nutrition {
        self.entries.iter().map(|entry| entry.nutrition).sum()
    }

    /// What is left of today's plan
    pub fn remaining(&self) -> Nutrition {
        self.planned().saturating_sub(self.consumed)
    }

    /// Number of completed entries
    pub fn completed_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealCategory, MealPlan};

    fn entry(id: &str, calories: f64, is_completed: bool) -> MealEntry {
        MealEntry {
            id: id.to_string(),
            title: format!("Meal {}", id),
            category: MealCategory::Lunch,
            nutrition: Nutrition::new(calories, 10.0, 20.0, 5.0),
            is_completed,
        }
    }

    #[test]
    fn test_from_plan_derives_consumed() {
        let state = DashboardState::from_plan(TodayPlan {
            meal_plan: MealPlan {
                meals: vec![entry("1", 300.0, true), entry("2", 500.0, false)],
            },
            week_info: None,
        });

        assert!(state.loaded);
        assert_eq!(state.consumed, Nutrition::new(300.0, 10.0, 20.0, 5.0));
        assert_eq!(state.remaining().calories, 500.0);
        assert_eq!(state.completed_count(), 1);
    }

    #[test]
    fn test_notice_for_error() {
        let notice = Notice::for_error(&ClientError::Network("reset".into()));
        assert_eq!(notice.message, RETRY_NOTICE);
        assert_eq!(notice.kind, ErrorKind::Network);

        let notice = Notice::for_error(&ClientError::MalformedToken("x".into()));
        assert_eq!(notice.message, REAUTH_NOTICE);
    }
}
