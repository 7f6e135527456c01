use std::{collections::HashMap, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{group_meal_foods, Record, Repo, Store, StoreError};
use crate::activities::model::{GoalActivity, PhysicalActivity, TypeActivity};
use crate::nutrition::model::{Composition, Food, Meal, MealWithFoods};
use crate::users::model::User;

struct Row {
    id: Uuid,
    scope: Option<Uuid>,
    refs: Vec<(&'static str, Uuid)>,
    data: Value,
}

type Tables = HashMap<&'static str, Vec<Row>>;

/// What Postgres knows from the schema: the scope column value and the
/// foreign keys of a row.
pub trait Linked: Record {
    fn scope_id(&self) -> Option<Uuid> {
        None
    }

    /// Parent rows as `(table, id)`.
    fn references(&self) -> Vec<(&'static str, Uuid)> {
        Vec::new()
    }
}

impl Linked for User {}
impl Linked for TypeActivity {}
impl Linked for Food {}

impl Linked for PhysicalActivity {
    fn scope_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }

    fn references(&self) -> Vec<(&'static str, Uuid)> {
        vec![("users", self.user_id), ("type_activities", self.type_activity_id)]
    }
}

impl Linked for GoalActivity {
    fn scope_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }

    fn references(&self) -> Vec<(&'static str, Uuid)> {
        vec![("users", self.user_id), ("type_activities", self.type_activity_id)]
    }
}

impl Linked for Meal {
    fn scope_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }

    fn references(&self) -> Vec<(&'static str, Uuid)> {
        vec![("users", self.user_id)]
    }
}

impl Linked for Composition {
    fn scope_id(&self) -> Option<Uuid> {
        Some(self.meal_id)
    }

    fn references(&self) -> Vec<(&'static str, Uuid)> {
        vec![("foods", self.food_id), ("meals", self.meal_id)]
    }
}

fn to_row<T: Linked>(record: &T) -> anyhow::Result<Row> {
    Ok(Row {
        id: record.id(),
        scope: record.scope_id(),
        refs: record.references(),
        data: serde_json::to_value(record)?,
    })
}

fn rows<'a>(tables: &'a Tables, table: &str) -> &'a [Row] {
    tables.get(table).map(Vec::as_slice).unwrap_or_default()
}

fn missing_reference(tables: &Tables, refs: &[(&'static str, Uuid)]) -> Option<&'static str> {
    refs.iter()
        .find(|(table, id)| !rows(tables, table).iter().any(|r| r.id == *id))
        .map(|(table, _)| *table)
}

fn check_scope<T: Record>(scope: Option<Uuid>) -> anyhow::Result<()> {
    if scope.is_some() && T::SCOPE.is_none() {
        anyhow::bail!("{} cannot be scoped", T::TABLE);
    }
    Ok(())
}

fn in_scope(row: &Row, scope: Option<Uuid>) -> bool {
    scope.map_or(true, |s| row.scope == Some(s))
}

// Same effect as the ON DELETE CASCADE foreign keys of the schema.
fn cascade(tables: &mut Tables, table: &'static str, id: Uuid) {
    let mut pending = vec![(table, id)];
    while let Some(parent) = pending.pop() {
        for (name, table) in tables.iter_mut() {
            table.retain(|r| {
                let orphan = r.refs.contains(&parent);
                if orphan {
                    pending.push((*name, r.id));
                }
                !orphan
            });
        }
    }
}

pub struct MemoryRepo<T> {
    tables: Arc<RwLock<Tables>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> MemoryRepo<T> {
    fn new(tables: Arc<RwLock<Tables>>) -> Self {
        Self {
            tables,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Linked> Repo<T> for MemoryRepo<T> {
    async fn insert(&self, record: &T) -> anyhow::Result<()> {
        let row = to_row(record)?;
        let mut tables = self.tables.write().await;
        if let Some(table) = missing_reference(&tables, &row.refs) {
            return Err(StoreError::MissingReference(table.to_string()).into());
        }
        let table = tables.entry(T::TABLE).or_default();
        if table.iter().any(|r| r.id == row.id) {
            return Err(StoreError::Duplicate(format!("{}_pkey", T::TABLE)).into());
        }
        table.push(row);
        Ok(())
    }

    async fn list(&self, scope: Option<Uuid>) -> anyhow::Result<Vec<T>> {
        check_scope::<T>(scope)?;
        let tables = self.tables.read().await;
        rows(&tables, T::TABLE)
            .iter()
            .filter(|r| in_scope(r, scope))
            .map(|r| serde_json::from_value::<T>(r.data.clone()).map_err(anyhow::Error::from))
            .collect()
    }

    async fn find(&self, id: Uuid, scope: Option<Uuid>) -> anyhow::Result<Option<T>> {
        check_scope::<T>(scope)?;
        let tables = self.tables.read().await;
        rows(&tables, T::TABLE)
            .iter()
            .find(|r| r.id == id && in_scope(r, scope))
            .map(|r| serde_json::from_value::<T>(r.data.clone()))
            .transpose()
            .map_err(anyhow::Error::from)
    }

    async fn update(&self, record: &T) -> anyhow::Result<bool> {
        let row = to_row(record)?;
        let mut tables = self.tables.write().await;
        if let Some(table) = missing_reference(&tables, &row.refs) {
            return Err(StoreError::MissingReference(table.to_string()).into());
        }
        let slot = tables
            .get_mut(T::TABLE)
            .and_then(|table| table.iter_mut().find(|r| r.id == row.id));
        match slot {
            Some(slot) => {
                *slot = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid, scope: Option<Uuid>) -> anyhow::Result<bool> {
        check_scope::<T>(scope)?;
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(T::TABLE) else {
            return Ok(false);
        };
        let Some(pos) = table.iter().position(|r| r.id == id && in_scope(r, scope)) else {
            return Ok(false);
        };
        table.remove(pos);
        cascade(&mut tables, T::TABLE, id);
        Ok(true)
    }
}

/// Process-local store for tests. Rows are kept as JSON, in insertion order.
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    users: MemoryRepo<User>,
    type_activities: MemoryRepo<TypeActivity>,
    physical_activities: MemoryRepo<PhysicalActivity>,
    goal_activities: MemoryRepo<GoalActivity>,
    foods: MemoryRepo<Food>,
    meals: MemoryRepo<Meal>,
    compositions: MemoryRepo<Composition>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let tables = Arc::new(RwLock::new(Tables::new()));
        Self {
            users: MemoryRepo::new(tables.clone()),
            type_activities: MemoryRepo::new(tables.clone()),
            physical_activities: MemoryRepo::new(tables.clone()),
            goal_activities: MemoryRepo::new(tables.clone()),
            foods: MemoryRepo::new(tables.clone()),
            meals: MemoryRepo::new(tables.clone()),
            compositions: MemoryRepo::new(tables.clone()),
            tables,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn users(&self) -> &dyn Repo<User> {
        &self.users
    }
    fn type_activities(&self) -> &dyn Repo<TypeActivity> {
        &self.type_activities
    }
    fn physical_activities(&self) -> &dyn Repo<PhysicalActivity> {
        &self.physical_activities
    }
    fn goal_activities(&self) -> &dyn Repo<GoalActivity> {
        &self.goal_activities
    }
    fn foods(&self) -> &dyn Repo<Food> {
        &self.foods
    }
    fn meals(&self) -> &dyn Repo<Meal> {
        &self.meals
    }
    fn compositions(&self) -> &dyn Repo<Composition> {
        &self.compositions
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        rows(&tables, User::TABLE)
            .iter()
            .find(|r| r.data.get("email").and_then(Value::as_str) == Some(email))
            .map(|r| serde_json::from_value::<User>(r.data.clone()))
            .transpose()
            .map_err(anyhow::Error::from)
    }

    async fn meals_with_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<MealWithFoods>> {
        let tables = self.tables.read().await;
        let mut pairs = Vec::new();
        for meal_row in rows(&tables, Meal::TABLE).iter().filter(|r| r.scope == Some(user_id)) {
            let meal: Meal = serde_json::from_value(meal_row.data.clone())?;
            let parts: Vec<&Row> = rows(&tables, Composition::TABLE)
                .iter()
                .filter(|c| c.scope == Some(meal.id))
                .collect();
            if parts.is_empty() {
                pairs.push((meal, None));
                continue;
            }
            for part in parts {
                let composition: Composition = serde_json::from_value(part.data.clone())?;
                let food = rows(&tables, Food::TABLE)
                    .iter()
                    .find(|f| f.id == composition.food_id)
                    .map(|f| serde_json::from_value::<Food>(f.data.clone()))
                    .transpose()?;
                pairs.push((meal.clone(), food));
            }
        }
        Ok(group_meal_foods(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            surname: "User".into(),
            email: email.into(),
            password_hash: "hash".into(),
            height: None,
            weight: None,
            health_goal: None,
            dietary_preferences: None,
        }
    }

    fn meal(user_id: Uuid) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            name: "Lunch".into(),
            meal_type: "lunch".into(),
            quantity: 1.0,
            date: datetime!(2025-01-05 12:00 UTC),
            calories: 650.0,
            user_id,
        }
    }

    #[tokio::test]
    async fn insert_rejects_dangling_reference() {
        let store = MemoryStore::new();
        let err = store.meals().insert(&meal(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::MissingReference(t)) if t == "users"
        ));
    }

    #[tokio::test]
    async fn scope_hides_foreign_rows() {
        let store = MemoryStore::new();
        let owner = user("owner@example.com");
        let other = user("other@example.com");
        store.users().insert(&owner).await.unwrap();
        store.users().insert(&other).await.unwrap();
        let m = meal(owner.id);
        store.meals().insert(&m).await.unwrap();

        assert!(store.meals().find(m.id, Some(owner.id)).await.unwrap().is_some());
        assert!(store.meals().find(m.id, Some(other.id)).await.unwrap().is_none());
        assert!(!store.meals().delete(m.id, Some(other.id)).await.unwrap());
        assert_eq!(store.meals().list(Some(owner.id)).await.unwrap().len(), 1);
        assert!(store.meals().list(Some(other.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unscoped_table_refuses_scope() {
        let store = MemoryStore::new();
        assert!(store.foods().list(Some(Uuid::new_v4())).await.is_err());
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_children() {
        let store = MemoryStore::new();
        let owner = user("owner@example.com");
        store.users().insert(&owner).await.unwrap();
        let food = Food {
            id: Uuid::new_v4(),
            name: "Rice".into(),
            quantity: 100.0,
            proteins: 2.7,
            carbs: 28.0,
            fats: 0.3,
            calories: 130.0,
        };
        store.foods().insert(&food).await.unwrap();
        let m = meal(owner.id);
        store.meals().insert(&m).await.unwrap();
        let part = Composition {
            id: Uuid::new_v4(),
            quantity: 150.0,
            food_id: food.id,
            meal_id: m.id,
        };
        store.compositions().insert(&part).await.unwrap();

        assert!(store.users().delete(owner.id, None).await.unwrap());
        assert!(store.meals().find(m.id, None).await.unwrap().is_none());
        assert!(store.compositions().find(part.id, None).await.unwrap().is_none());
        // foods are global and survive
        assert!(store.foods().find(food.id, None).await.unwrap().is_some());
    }
}
