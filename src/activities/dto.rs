use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::patch::{Patch, Rfc3339};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhysicalActivity {
    pub duration: f64,
    pub calories_burned: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub type_activity_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicalActivityPatch {
    pub duration: Patch<f64>,
    pub calories_burned: Patch<f64>,
    pub date: Patch<Rfc3339>,
    pub type_activity_id: Patch<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalActivity {
    pub frequency: Option<i32>,
    pub calories_goal: Option<f64>,
    pub duration_goal: Option<f64>,
    pub type_activity_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalActivityPatch {
    pub frequency: Patch<i32>,
    pub calories_goal: Patch<f64>,
    pub duration_goal: Patch<f64>,
    pub type_activity_id: Patch<Uuid>,
}
