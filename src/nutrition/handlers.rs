use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateComposition, CreateFood, CreateMeal, FoodPatch, MealPatch},
    model::{Composition, Food, Meal, MealWithFoods},
};
use crate::{
    auth::AuthUser,
    crud::{self, PathId, Patchable, Resource},
    error::ApiError,
    patch::Rfc3339,
    state::AppState,
    store::{Repo, Store},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/foods", post(crud::create::<Food>).get(crud::list::<Food>))
        .route(
            "/foods/:id",
            get(crud::get::<Food>)
                .put(crud::update::<Food>)
                .delete(crud::delete::<Food>),
        )
        .route("/meals", post(crud::create::<Meal>).get(crud::list::<Meal>))
        .route("/meals/all_meals", get(all_meals))
        .route(
            "/meals/:id",
            get(crud::get::<Meal>)
                .put(crud::update::<Meal>)
                .delete(crud::delete::<Meal>),
        )
        .route("/compositions", post(crud::create::<Composition>))
        .route(
            "/compositions/:id",
            get(compositions_of_meal).delete(crud::delete::<Composition>),
        )
}

/// Caller's meals, each with the foods it is composed of.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn all_meals(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<MealWithFoods>>, ApiError> {
    Ok(Json(state.store.meals_with_foods(user.id).await?))
}

/// `:id` here is the meal id.
#[instrument(skip_all, fields(meal_id = %meal_id))]
pub async fn compositions_of_meal(
    State(state): State<AppState>,
    _user: AuthUser,
    PathId(meal_id): PathId,
) -> Result<Json<Vec<Composition>>, ApiError> {
    Ok(Json(state.store.compositions().list(Some(meal_id)).await?))
}

impl Resource for Food {
    const LABEL: &'static str = "Food";
    const OWNED: bool = false;

    type Create = CreateFood;

    fn repo(store: &dyn Store) -> &dyn Repo<Self> {
        store.foods()
    }

    fn build(input: CreateFood, _owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            quantity: input.quantity,
            proteins: input.proteins,
            carbs: input.carbs,
            fats: input.fats,
            calories: input.calories,
        }
    }
}

impl Patchable for Food {
    type Patch = FoodPatch;

    fn apply(&mut self, patch: FoodPatch) -> Result<(), ApiError> {
        patch.name.apply_required(&mut self.name, "name")?;
        patch.quantity.apply_required(&mut self.quantity, "quantity")?;
        patch.proteins.apply_required(&mut self.proteins, "proteins")?;
        patch.carbs.apply_required(&mut self.carbs, "carbs")?;
        patch.fats.apply_required(&mut self.fats, "fats")?;
        patch.calories.apply_required(&mut self.calories, "calories")
    }
}

impl Resource for Meal {
    const LABEL: &'static str = "Meal";
    const OWNED: bool = true;

    type Create = CreateMeal;

    fn repo(store: &dyn Store) -> &dyn Repo<Self> {
        store.meals()
    }

    fn build(input: CreateMeal, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            meal_type: input.meal_type,
            quantity: input.quantity,
            date: input.date,
            calories: input.calories,
            user_id: owner,
        }
    }
}

impl Patchable for Meal {
    type Patch = MealPatch;

    fn apply(&mut self, patch: MealPatch) -> Result<(), ApiError> {
        patch.name.apply_required(&mut self.name, "name")?;
        patch.meal_type.apply_required(&mut self.meal_type, "mealType")?;
        patch.quantity.apply_required(&mut self.quantity, "quantity")?;
        if let Some(Rfc3339(date)) = patch.date.into_required("date")? {
            self.date = date;
        }
        patch.calories.apply_required(&mut self.calories, "calories")
    }
}

// Compositions are not owner-scoped: any caller may link foods to a meal id.
impl Resource for Composition {
    const LABEL: &'static str = "Composition";
    const OWNED: bool = false;

    type Create = CreateComposition;

    fn repo(store: &dyn Store) -> &dyn Repo<Self> {
        store.compositions()
    }

    fn build(input: CreateComposition, _owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            quantity: input.quantity,
            food_id: input.food_id,
            meal_id: input.meal_id,
        }
    }
}
