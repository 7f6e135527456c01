use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::activities::model::{GoalActivity, PhysicalActivity, TypeActivity};
use crate::nutrition::model::{Composition, Food, Meal, MealWithFoods};
use crate::users::model::User;

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Failures a caller can act on. Everything else travels as a plain `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("missing reference: {0}")]
    MissingReference(String),
    #[error("duplicate: {0}")]
    Duplicate(String),
}

/// A row of one table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Column that list/find/delete can be narrowed by (owner or parent id).
    const SCOPE: Option<&'static str>;

    fn id(&self) -> Uuid;
}

/// Table access shared by every record type.
///
/// `scope` narrows the operation to rows whose `Record::SCOPE` column equals
/// the given id; a row outside the scope is reported exactly like a missing one.
#[async_trait]
pub trait Repo<T: Record>: Send + Sync {
    async fn insert(&self, record: &T) -> anyhow::Result<()>;
    /// Rows in insertion order.
    async fn list(&self, scope: Option<Uuid>) -> anyhow::Result<Vec<T>>;
    async fn find(&self, id: Uuid, scope: Option<Uuid>) -> anyhow::Result<Option<T>>;
    /// Overwrites every column of the row with `record.id()`. `false` if it is gone.
    async fn update(&self, record: &T) -> anyhow::Result<bool>;
    /// Removes the row and every row that references it.
    async fn delete(&self, id: Uuid, scope: Option<Uuid>) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait Store: Send + Sync {
    fn users(&self) -> &dyn Repo<User>;
    fn type_activities(&self) -> &dyn Repo<TypeActivity>;
    fn physical_activities(&self) -> &dyn Repo<PhysicalActivity>;
    fn goal_activities(&self) -> &dyn Repo<GoalActivity>;
    fn foods(&self) -> &dyn Repo<Food>;
    fn meals(&self) -> &dyn Repo<Meal>;
    fn compositions(&self) -> &dyn Repo<Composition>;

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Meals of `user_id` with the foods of their compositions, in one read.
    async fn meals_with_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<MealWithFoods>>;
}

/// Folds `(meal, food)` pairs, ordered by meal, into one entry per meal.
/// A meal without compositions arrives once with `None`.
pub fn group_meal_foods<I>(rows: I) -> Vec<MealWithFoods>
where
    I: IntoIterator<Item = (Meal, Option<Food>)>,
{
    let mut out: Vec<MealWithFoods> = Vec::new();
    for (meal, food) in rows {
        match out.last_mut() {
            Some(last) if last.meal.id == meal.id => last.foods.extend(food),
            _ => out.push(MealWithFoods {
                meal,
                foods: food.into_iter().collect(),
            }),
        }
    }
    out
}
