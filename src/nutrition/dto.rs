use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::patch::{Patch, Rfc3339};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFood {
    pub name: String,
    pub quantity: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FoodPatch {
    pub name: Patch<String>,
    pub quantity: Patch<f64>,
    pub proteins: Patch<f64>,
    pub carbs: Patch<f64>,
    pub fats: Patch<f64>,
    pub calories: Patch<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeal {
    pub name: String,
    pub meal_type: String,
    pub quantity: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub calories: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealPatch {
    pub name: Patch<String>,
    pub meal_type: Patch<String>,
    pub quantity: Patch<f64>,
    pub date: Patch<Rfc3339>,
    pub calories: Patch<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComposition {
    pub quantity: f64,
    pub food_id: Uuid,
    pub meal_id: Uuid,
}
