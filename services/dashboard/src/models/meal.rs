//! Meal models for today's plan

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Nutrition values of one meal, or a sum of meals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl Nutrition {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Field-wise difference, floored at zero
    pub fn saturating_sub(self, other: Nutrition) -> Nutrition {
        Nutrition {
            calories: (self.calories - other.calories).max(0.0),
            protein: (self.protein - other.protein).max(0.0),
            carbs: (self.carbs - other.carbs).max(0.0),
            fat: (self.fat - other.fat).max(0.0),
        }
    }
}

impl Add for Nutrition {
    type Output = Nutrition;

    fn add(self, rhs: Nutrition) -> Nutrition {
        Nutrition {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for Nutrition {
    fn add_assign(&mut self, rhs: Nutrition) {
        *self = *self + rhs;
    }
}

impl Sum for Nutrition {
    fn sum<I: Iterator<Item = Nutrition>>(iter: I) -> Nutrition {
        iter.fold(Nutrition::default(), Add::add)
    }
}

impl<'a> Sum<&'a Nutrition> for Nutrition {
    fn sum<I: Iterator<Item = &'a Nutrition>>(iter: I) -> Nutrition {
        iter.copied().sum()
    }
}

/// Meal slot in the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    #[serde(other)]
    Other,
}

/// A meal shown on the dashboard
///
/// The backend names some fields more than one way (`id`/`_id`,
/// `title`/`name`, `category`/`mealType`/`type`); the first spelling present
/// in that order wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawMealEntry")]
pub struct MealEntry {
    pub id: String,
    pub title: String,
    pub category: MealCategory,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    pub is_completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMealEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<MealCategory>,
    #[serde(default)]
    meal_type: Option<MealCategory>,
    #[serde(default, rename = "type")]
    kind: Option<MealCategory>,
    #[serde(flatten)]
    nutrition: Nutrition,
    #[serde(default)]
    is_completed: bool,
}

impl TryFrom<RawMealEntry> for MealEntry {
    type Error = String;

    fn try_from(raw: RawMealEntry) -> Result<Self, Self::Error> {
        Ok(MealEntry {
            id: raw
                .id
                .or(raw.object_id)
                .ok_or_else(|| "missing field `id`".to_string())?,
            title: raw
                .title
                .or(raw.name)
                .ok_or_else(|| "missing field `title`".to_string())?,
            category: raw
                .category
                .or(raw.meal_type)
                .or(raw.kind)
                .ok_or_else(|| "missing field `category`".to_string())?,
            nutrition: raw.nutrition,
            is_completed: raw.is_completed,
        })
    }
}

/// Today's plan as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MealPlan {
    #[serde(default)]
    pub meals: Vec<MealEntry>,
}

/// Where today sits in the user's planning week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeekInfo {
    #[serde(default)]
    pub week_number: Option<u32>,
    #[serde(default)]
    pub day_of_week: Option<String>,
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub week_end: Option<String>,
}

/// `GET /meal-plans/today` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TodayPlan {
    #[serde(default)]
    pub meal_plan: MealPlan,
    #[serde(default)]
    pub week_info: Option<WeekInfo>,
}
