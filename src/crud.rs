//! Handlers shared by every resource: create, list, get, update, delete.
//!
//! Owner-scoped resources narrow every lookup to the caller, so a record that
//! belongs to somebody else is indistinguishable from a missing one.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    state::AppState,
    store::{Record, Repo, Store},
};

pub trait Resource: Record {
    /// Human name used in error reasons.
    const LABEL: &'static str;
    /// Whether rows belong to the user in their `user_id` column.
    const OWNED: bool;

    type Create: DeserializeOwned + Send + 'static;

    fn repo(store: &dyn Store) -> &dyn Repo<Self>;

    /// Fresh record with a new id, bound to `owner` when `OWNED`.
    fn build(input: Self::Create, owner: Uuid) -> Self;

    fn scope(user: &AuthUser) -> Option<Uuid> {
        Self::OWNED.then_some(user.0.id)
    }

    fn not_found() -> ApiError {
        ApiError::NotFound(format!("{} not found", Self::LABEL))
    }
}

/// Resources that accept a merge-patch body on PUT.
pub trait Patchable: Resource {
    type Patch: DeserializeOwned + Send + 'static;

    fn apply(&mut self, patch: Self::Patch) -> Result<(), ApiError>;
}

/// Record id from the single path parameter; malformed ids are a 400.
pub struct PathId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest("Missing id".into()))?;
        Uuid::parse_str(&raw)
            .map(PathId)
            .map_err(|_| ApiError::BadRequest(format!("Invalid id: {raw}")))
    }
}

#[instrument(skip_all, fields(table = T::TABLE))]
pub async fn create<T: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<T::Create>, JsonRejection>,
) -> Result<Json<T>, ApiError> {
    let Json(input) = payload?;
    let record = T::build(input, user.0.id);
    T::repo(state.store.as_ref()).insert(&record).await?;
    info!(id = %record.id(), user_id = %user.0.id, "created");
    Ok(Json(record))
}

#[instrument(skip_all, fields(table = T::TABLE))]
pub async fn list<T: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<T>>, ApiError> {
    let rows = T::repo(state.store.as_ref()).list(T::scope(&user)).await?;
    Ok(Json(rows))
}

#[instrument(skip_all, fields(table = T::TABLE, id = %id))]
pub async fn get<T: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    PathId(id): PathId,
) -> Result<Json<T>, ApiError> {
    T::repo(state.store.as_ref())
        .find(id, T::scope(&user))
        .await?
        .map(Json)
        .ok_or_else(T::not_found)
}

#[instrument(skip_all, fields(table = T::TABLE, id = %id))]
pub async fn update<T: Patchable>(
    State(state): State<AppState>,
    user: AuthUser,
    PathId(id): PathId,
    payload: Result<Json<T::Patch>, JsonRejection>,
) -> Result<Json<T>, ApiError> {
    let repo = T::repo(state.store.as_ref());
    let mut record = repo
        .find(id, T::scope(&user))
        .await?
        .ok_or_else(T::not_found)?;
    let Json(patch) = payload?;
    record.apply(patch)?;
    if !repo.update(&record).await? {
        return Err(T::not_found());
    }
    info!(user_id = %user.0.id, "updated");
    Ok(Json(record))
}

#[instrument(skip_all, fields(table = T::TABLE, id = %id))]
pub async fn delete<T: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    if !T::repo(state.store.as_ref()).delete(id, T::scope(&user)).await? {
        return Err(T::not_found());
    }
    info!(user_id = %user.0.id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}
