use serde::{Deserialize, Serialize};

use super::model::{HealthGoal, UserProfile};
use crate::patch::Patch;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub health_goal: Option<HealthGoal>,
    pub dietary_preferences: Option<Vec<i32>>,
}

/// Merge-patch body for `PUT /users/:id`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Patch<String>,
    pub surname: Patch<String>,
    pub email: Patch<String>,
    pub password: Patch<String>,
    pub height: Patch<f64>,
    pub weight: Patch<f64>,
    pub health_goal: Patch<HealthGoal>,
    pub dietary_preferences: Patch<Vec<i32>>,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
