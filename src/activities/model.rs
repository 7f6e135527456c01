use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Record;

/// Category of physical activity ("Cardio", "Yoga", ...). Seeded by migration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TypeActivity {
    pub id: Uuid,
    pub name: String,
}

impl Record for TypeActivity {
    const TABLE: &'static str = "type_activities";
    const SCOPE: Option<&'static str> = None;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalActivity {
    pub id: Uuid,
    pub duration: f64, // minutes
    pub calories_burned: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub user_id: Uuid,
    pub type_activity_id: Uuid,
}

impl Record for PhysicalActivity {
    const TABLE: &'static str = "physical_activities";
    const SCOPE: Option<&'static str> = Some("user_id");

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Standing target, not an event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GoalActivity {
    pub id: Uuid,
    pub frequency: Option<i32>, // sessions per week
    pub calories_goal: Option<f64>,
    pub duration_goal: Option<f64>,
    pub user_id: Uuid,
    pub type_activity_id: Uuid,
}

impl Record for GoalActivity {
    const TABLE: &'static str = "goal_activities";
    const SCOPE: Option<&'static str> = Some("user_id");

    fn id(&self) -> Uuid {
        self.id
    }
}
