use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{normalize_email, LoginResponse, RegisterRequest, UserPatch},
    model::{User, UserProfile},
};
use crate::{
    auth::{
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
        AuthUser, BasicCredentials,
    },
    crud::PathId,
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".into())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = payload?;
    let email = normalize_email(&req.email);

    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password_blocking(req.password).await?;
    let user = User {
        id: Uuid::new_v4(),
        name: req.name,
        surname: req.surname,
        email,
        password_hash,
        height: req.height,
        weight: req.weight,
        health_goal: req.health_goal,
        dietary_preferences: req.dietary_preferences,
    };
    state.store.users().insert(&user).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(user))
}

#[instrument(skip(state, creds))]
pub async fn login(
    State(state): State<AppState>,
    creds: BasicCredentials,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(&creds.email);

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password_blocking(creds.password, user.password_hash.clone()).await? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip_all, fields(id = %id))]
pub async fn get_user(
    AuthUser(user): AuthUser,
    PathId(id): PathId,
) -> Result<Json<UserProfile>, ApiError> {
    if id != user.id {
        return Err(user_not_found());
    }
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(id = %id))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    PathId(id): PathId,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    if id != user.id {
        return Err(user_not_found());
    }
    let Json(patch) = payload?;

    patch.name.apply_required(&mut user.name, "name")?;
    patch.surname.apply_required(&mut user.surname, "surname")?;
    patch.height.apply(&mut user.height);
    patch.weight.apply(&mut user.weight);
    patch.health_goal.apply(&mut user.health_goal);
    patch.dietary_preferences.apply(&mut user.dietary_preferences);

    if let Some(email) = patch.email.into_required("email")? {
        let email = normalize_email(&email);
        if email != user.email {
            if state.store.find_user_by_email(&email).await?.is_some() {
                warn!(email = %email, "email already registered");
                return Err(ApiError::Conflict("Email already registered".into()));
            }
            user.email = email;
        }
    }
    if let Some(password) = patch.password.into_required("password")? {
        user.password_hash = hash_password_blocking(password).await?;
    }

    if !state.store.users().update(&user).await? {
        return Err(user_not_found());
    }
    info!(user_id = %user.id, "user updated");
    Ok(Json(user.into()))
}

/// Removes the account together with its meals, activities and goals.
#[instrument(skip_all, fields(id = %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    if id != user.id || !state.store.users().delete(id, None).await? {
        return Err(user_not_found());
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
