use std::marker::PhantomData;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    FromRow, PgPool, Postgres,
};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{group_meal_foods, Record, Repo, Store, StoreError};
use crate::activities::model::{GoalActivity, PhysicalActivity, TypeActivity};
use crate::nutrition::model::{Composition, Food, Meal, MealWithFoods};
use crate::users::model::User;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Column layout of a record. `COLUMNS[0]` is always `id` and `bind` must
/// push values in `COLUMNS` order.
pub trait PgRecord: Record + for<'r> FromRow<'r, PgRow> {
    const COLUMNS: &'static [&'static str];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;
}

/// Maps constraint violations to `StoreError`, leaves the rest untyped.
fn classify(err: sqlx::Error) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().unwrap_or("constraint").to_string();
        match db.code().as_deref() {
            Some("23503") => return StoreError::MissingReference(constraint).into(),
            Some("23505") => return StoreError::Duplicate(constraint).into(),
            _ => {}
        }
    }
    anyhow::Error::new(err)
}

fn scope_column<T: Record>(scope: Option<Uuid>) -> anyhow::Result<Option<&'static str>> {
    match (T::SCOPE, scope) {
        (_, None) => Ok(None),
        (Some(col), Some(_)) => Ok(Some(col)),
        (None, Some(_)) => anyhow::bail!("{} cannot be scoped", T::TABLE),
    }
}

fn insert_sql<T: PgRecord>() -> String {
    let placeholders = (1..=T::COLUMNS.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE,
        T::COLUMNS.join(", "),
        placeholders
    )
}

/// `$1` is the id; the scope column, when given, is `$2`.
fn select_sql<T: PgRecord>(by_id: bool, scope: Option<&str>) -> String {
    let mut filters = Vec::new();
    if by_id {
        filters.push("id = $1".to_string());
    }
    if let Some(col) = scope {
        filters.push(format!("{col} = ${}", filters.len() + 1));
    }
    let mut sql = format!("SELECT {} FROM {}", T::COLUMNS.join(", "), T::TABLE);
    if !filters.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filters.join(" AND "));
    }
    if !by_id {
        sql.push_str(" ORDER BY created_at");
    }
    sql
}

/// Binds in `COLUMNS` order, so `id` is `$1` and the rest follow.
fn update_sql<T: PgRecord>() -> String {
    let assignments = T::COLUMNS
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, col)| format!("{col} = ${}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {assignments} WHERE id = $1", T::TABLE)
}

fn delete_sql<T: PgRecord>(scope: Option<&str>) -> String {
    match scope {
        Some(col) => format!("DELETE FROM {} WHERE id = $1 AND {col} = $2", T::TABLE),
        None => format!("DELETE FROM {} WHERE id = $1", T::TABLE),
    }
}

pub struct PgRepo<T> {
    db: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T> PgRepo<T> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T: PgRecord> Repo<T> for PgRepo<T> {
    async fn insert(&self, record: &T) -> anyhow::Result<()> {
        let sql = insert_sql::<T>();
        record
            .bind(sqlx::query(&sql))
            .execute(&self.db)
            .await
            .map_err(classify)?;
        debug!(table = T::TABLE, id = %record.id(), "row inserted");
        Ok(())
    }

    async fn list(&self, scope: Option<Uuid>) -> anyhow::Result<Vec<T>> {
        let sql = select_sql::<T>(false, scope_column::<T>(scope)?);
        let mut query = sqlx::query_as::<_, T>(&sql);
        if let Some(scope) = scope {
            query = query.bind(scope);
        }
        let rows = query
            .fetch_all(&self.db)
            .await
            .with_context(|| format!("list {}", T::TABLE))?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid, scope: Option<Uuid>) -> anyhow::Result<Option<T>> {
        let sql = select_sql::<T>(true, scope_column::<T>(scope)?);
        let mut query = sqlx::query_as::<_, T>(&sql).bind(id);
        if let Some(scope) = scope {
            query = query.bind(scope);
        }
        let row = query
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("find {}", T::TABLE))?;
        Ok(row)
    }

    async fn update(&self, record: &T) -> anyhow::Result<bool> {
        let sql = update_sql::<T>();
        let done = record
            .bind(sqlx::query(&sql))
            .execute(&self.db)
            .await
            .map_err(classify)?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid, scope: Option<Uuid>) -> anyhow::Result<bool> {
        let sql = delete_sql::<T>(scope_column::<T>(scope)?);
        let mut query = sqlx::query(&sql).bind(id);
        if let Some(scope) = scope {
            query = query.bind(scope);
        }
        // children go with ON DELETE CASCADE
        let done = query.execute(&self.db).await.map_err(classify)?;
        Ok(done.rows_affected() > 0)
    }
}

impl PgRecord for User {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "surname",
        "email",
        "password_hash",
        "height",
        "weight",
        "health_goal",
        "dietary_preferences",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.name)
            .bind(&self.surname)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(self.height)
            .bind(self.weight)
            .bind(self.health_goal)
            .bind(&self.dietary_preferences)
    }
}

impl PgRecord for TypeActivity {
    const COLUMNS: &'static [&'static str] = &["id", "name"];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.id).bind(&self.name)
    }
}

impl PgRecord for PhysicalActivity {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "duration",
        "calories_burned",
        "date",
        "user_id",
        "type_activity_id",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(self.duration)
            .bind(self.calories_burned)
            .bind(self.date)
            .bind(self.user_id)
            .bind(self.type_activity_id)
    }
}

impl PgRecord for GoalActivity {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "frequency",
        "calories_goal",
        "duration_goal",
        "user_id",
        "type_activity_id",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(self.frequency)
            .bind(self.calories_goal)
            .bind(self.duration_goal)
            .bind(self.user_id)
            .bind(self.type_activity_id)
    }
}

impl PgRecord for Food {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "quantity", "proteins", "carbs", "fats", "calories"];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.name)
            .bind(self.quantity)
            .bind(self.proteins)
            .bind(self.carbs)
            .bind(self.fats)
            .bind(self.calories)
    }
}

impl PgRecord for Meal {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "meal_type",
        "quantity",
        "date",
        "calories",
        "user_id",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.name)
            .bind(&self.meal_type)
            .bind(self.quantity)
            .bind(self.date)
            .bind(self.calories)
            .bind(self.user_id)
    }
}

impl PgRecord for Composition {
    const COLUMNS: &'static [&'static str] = &["id", "quantity", "food_id", "meal_id"];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(self.quantity)
            .bind(self.food_id)
            .bind(self.meal_id)
    }
}

/// One meal joined with at most one of its foods.
#[derive(FromRow)]
struct MealFoodRow {
    id: Uuid,
    name: String,
    meal_type: String,
    quantity: f64,
    date: OffsetDateTime,
    calories: f64,
    user_id: Uuid,
    food_id: Option<Uuid>,
    food_name: Option<String>,
    food_quantity: Option<f64>,
    food_proteins: Option<f64>,
    food_carbs: Option<f64>,
    food_fats: Option<f64>,
    food_calories: Option<f64>,
}

impl MealFoodRow {
    // all food columns are NULL when the meal has no composition
    fn food(&self) -> Option<Food> {
        Some(Food {
            id: self.food_id?,
            name: self.food_name.clone()?,
            quantity: self.food_quantity?,
            proteins: self.food_proteins?,
            carbs: self.food_carbs?,
            fats: self.food_fats?,
            calories: self.food_calories?,
        })
    }

    fn split(self) -> (Meal, Option<Food>) {
        let food = self.food();
        let meal = Meal {
            id: self.id,
            name: self.name,
            meal_type: self.meal_type,
            quantity: self.quantity,
            date: self.date,
            calories: self.calories,
            user_id: self.user_id,
        };
        (meal, food)
    }
}

pub struct PgStore {
    db: PgPool,
    users: PgRepo<User>,
    type_activities: PgRepo<TypeActivity>,
    physical_activities: PgRepo<PhysicalActivity>,
    goal_activities: PgRepo<GoalActivity>,
    foods: PgRepo<Food>,
    meals: PgRepo<Meal>,
    compositions: PgRepo<Composition>,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self {
            users: PgRepo::new(db.clone()),
            type_activities: PgRepo::new(db.clone()),
            physical_activities: PgRepo::new(db.clone()),
            goal_activities: PgRepo::new(db.clone()),
            foods: PgRepo::new(db.clone()),
            meals: PgRepo::new(db.clone()),
            compositions: PgRepo::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl Store for PgStore {
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
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1",
            User::COLUMNS.join(", ")
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("find user by email")?;
        Ok(user)
    }

    async fn meals_with_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<MealWithFoods>> {
        let rows = sqlx::query_as::<_, MealFoodRow>(
            r#"
            SELECT m.id, m.name, m.meal_type, m.quantity, m.date, m.calories, m.user_id,
                   f.id AS food_id, f.name AS food_name, f.quantity AS food_quantity,
                   f.proteins AS food_proteins, f.carbs AS food_carbs, f.fats AS food_fats,
                   f.calories AS food_calories
              FROM meals m
              LEFT JOIN compositions c ON c.meal_id = m.id
              LEFT JOIN foods f ON f.id = c.food_id
             WHERE m.user_id = $1
             ORDER BY m.created_at, m.id, c.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list meals with foods")?;

        Ok(group_meal_foods(rows.into_iter().map(MealFoodRow::split)))
    }
}
