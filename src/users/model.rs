use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::Record;

/// Health objective, stored and sent as its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum HealthGoal {
    Loss = 0,
    Gain = 1,
    Maintain = 2,
}

impl TryFrom<i16> for HealthGoal {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(HealthGoal::Loss),
            1 => Ok(HealthGoal::Gain),
            2 => Ok(HealthGoal::Maintain),
            other => Err(format!("unknown health goal {other}")),
        }
    }
}

impl From<HealthGoal> for i16 {
    fn from(goal: HealthGoal) -> Self {
        goal as i16
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String, // argon2 PHC string
    pub height: Option<f64>,   // cm
    pub weight: Option<f64>,   // kg
    pub health_goal: Option<HealthGoal>,
    pub dietary_preferences: Option<Vec<i32>>,
}

impl Record for User {
    const TABLE: &'static str = "users";
    const SCOPE: Option<&'static str> = None;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub health_goal: Option<HealthGoal>,
    pub dietary_preferences: Option<Vec<i32>>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            surname: u.surname,
            email: u.email,
            height: u.height,
            weight: u.weight,
            health_goal: u.health_goal,
            dietary_preferences: u.dietary_preferences,
        }
    }
}
