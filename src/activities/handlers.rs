use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateGoalActivity, CreatePhysicalActivity, GoalActivityPatch, PhysicalActivityPatch},
    model::{GoalActivity, PhysicalActivity, TypeActivity},
};
use crate::{
    crud::{self, Patchable, Resource},
    error::ApiError,
    patch::Rfc3339,
    state::AppState,
    store::{Repo, Store},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/type_activities", get(list_type_activities))
        .route(
            "/physical_activities",
            post(crud::create::<PhysicalActivity>).get(crud::list::<PhysicalActivity>),
        )
        .route(
            "/physical_activities/:id",
            get(crud::get::<PhysicalActivity>)
                .put(crud::update::<PhysicalActivity>)
                .delete(crud::delete::<PhysicalActivity>),
        )
        .route(
            "/goal_activities",
            post(crud::create::<GoalActivity>).get(crud::list::<GoalActivity>),
        )
        .route(
            "/goal_activities/:id",
            put(crud::update::<GoalActivity>).delete(crud::delete::<GoalActivity>),
        )
}

/// Activity categories, readable without a token.
#[instrument(skip_all)]
pub async fn list_type_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<TypeActivity>>, ApiError> {
    Ok(Json(state.store.type_activities().list(None).await?))
}

impl Resource for PhysicalActivity {
    const LABEL: &'static str = "Physical activity";
    const OWNED: bool = true;

    type Create = CreatePhysicalActivity;

    fn repo(store: &dyn Store) -> &dyn Repo<Self> {
        store.physical_activities()
    }

    fn build(input: CreatePhysicalActivity, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            duration: input.duration,
            calories_burned: input.calories_burned,
            date: input.date,
            user_id: owner,
            type_activity_id: input.type_activity_id,
        }
    }
}

impl Patchable for PhysicalActivity {
    type Patch = PhysicalActivityPatch;

    fn apply(&mut self, patch: PhysicalActivityPatch) -> Result<(), ApiError> {
        patch.duration.apply_required(&mut self.duration, "duration")?;
        patch.calories_burned.apply(&mut self.calories_burned);
        if let Some(Rfc3339(date)) = patch.date.into_required("date")? {
            self.date = date;
        }
        patch
            .type_activity_id
            .apply_required(&mut self.type_activity_id, "typeActivityId")
    }
}

impl Resource for GoalActivity {
    const LABEL: &'static str = "Goal activity";
    const OWNED: bool = true;

    type Create = CreateGoalActivity;

    fn repo(store: &dyn Store) -> &dyn Repo<Self> {
        store.goal_activities()
    }

    fn build(input: CreateGoalActivity, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            frequency: input.frequency,
            calories_goal: input.calories_goal,
            duration_goal: input.duration_goal,
            user_id: owner,
            type_activity_id: input.type_activity_id,
        }
    }
}

impl Patchable for GoalActivity {
    type Patch = GoalActivityPatch;

    fn apply(&mut self, patch: GoalActivityPatch) -> Result<(), ApiError> {
        patch.frequency.apply(&mut self.frequency);
        patch.calories_goal.apply(&mut self.calories_goal);
        patch.duration_goal.apply(&mut self.duration_goal);
        patch
            .type_activity_id
            .apply_required(&mut self.type_activity_id, "typeActivityId")
    }
}
