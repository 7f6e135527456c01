use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Record;

/// Nutritional facts of a food for `quantity` grams. Shared by all users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
}

impl Record for Food {
    const TABLE: &'static str = "foods";
    const SCOPE: Option<&'static str> = None;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub meal_type: String, // "breakfast", "lunch", ... free text
    pub quantity: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub calories: f64,
    pub user_id: Uuid,
}

impl Record for Meal {
    const TABLE: &'static str = "meals";
    const SCOPE: Option<&'static str> = Some("user_id");

    fn id(&self) -> Uuid {
        self.id
    }
}

/// `quantity` of a food inside a meal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub id: Uuid,
    pub quantity: f64,
    pub food_id: Uuid,
    pub meal_id: Uuid,
}

impl Record for Composition {
    const TABLE: &'static str = "compositions";
    const SCOPE: Option<&'static str> = Some("meal_id");

    fn id(&self) -> Uuid {
        self.id
    }
}

/// A meal and the foods of its compositions. Built per request.
#[derive(Debug, Clone, Serialize)]
pub struct MealWithFoods {
    pub meal: Meal,
    pub foods: Vec<Food>,
}
