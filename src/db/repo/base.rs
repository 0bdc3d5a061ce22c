//! Generic CRUD over a single entity type.
//!
//! Reads go straight to the pool. Writes are only staged on the shared
//! [`RepositoryContext`] and reach the database when the context is saved.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use super::{Mutation, MutationKind, RepositoryContext};

/// Row-level persistence for one entity value.
///
/// Object safe so that mutations of different entity types can share one
/// change set.
#[async_trait]
pub trait Persist: Send + Sync + std::fmt::Debug {
    /// Table the row lives in.
    fn table(&self) -> &'static str;

    /// Primary key of the row, as stored.
    fn key(&self) -> String;

    /// Returns the number of rows affected.
    async fn insert(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error>;

    /// Overwrite every column of the row. Returns the number of rows affected.
    async fn update(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error>;

    /// Returns the number of rows affected.
    async fn delete(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table());
        let result = sqlx::query(&sql)
            .bind(self.key())
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}

/// An entity the generic repository can read and stage.
pub trait Entity: Persist + Sized + 'static {
    const TABLE: &'static str;
    /// Select list used by generic reads.
    const COLUMNS: &'static str;

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

/// Value bound to a `?` placeholder of a [`Condition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
}

/// Filter evaluated by SQLite.
///
/// Clauses are fixed SQL fragments owned by the entity repositories; only the
/// bound values come from callers. All clauses are joined with `AND`.
#[derive(Debug, Clone, Default)]
pub struct Condition {
    clauses: Vec<&'static str>,
    binds: Vec<BindValue>,
    order_by: Option<&'static str>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause with exactly one `?` placeholder.
    pub fn and(mut self, clause: &'static str, value: BindValue) -> Self {
        self.clauses.push(clause);
        self.binds.push(value);
        self
    }

    pub fn order_by(mut self, order_by: &'static str) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub(crate) fn to_sql(&self, table: &str, columns: &str) -> String {
        let mut sql = format!("SELECT {} FROM {}", columns, table);
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        if let Some(order_by) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        sql
    }
}

/// CRUD operations shared by every entity repository.
pub struct RepositoryBase<T> {
    context: Arc<RepositoryContext>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RepositoryBase<T> {
    pub(crate) fn new(context: Arc<RepositoryContext>) -> Self {
        Self {
            context,
            _entity: PhantomData,
        }
    }

    pub(crate) fn pool(&self) -> &sqlx::SqlitePool {
        self.context.pool()
    }

    /// All rows of the table, in no particular order.
    pub async fn find_all(&self) -> Result<Vec<T>, sqlx::Error> {
        self.find_by_condition(&Condition::new()).await
    }

    /// Rows matching `condition`, filtered by the database.
    pub async fn find_by_condition(&self, condition: &Condition) -> Result<Vec<T>, sqlx::Error> {
        let sql = condition.to_sql(T::TABLE, T::COLUMNS);
        let mut query = sqlx::query(&sql);
        for value in &condition.binds {
            query = match value {
                BindValue::Text(text) => query.bind(text.clone()),
                BindValue::Integer(int) => query.bind(*int),
            };
        }

        let rows = query.fetch_all(self.context.pool()).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Stage an insert.
    pub fn create(&self, entity: T) {
        self.context
            .stage(Mutation::new(MutationKind::Create, Box::new(entity)));
    }

    /// Stage a full-row update.
    pub fn update(&self, entity: T) {
        self.context
            .stage(Mutation::new(MutationKind::Update, Box::new(entity)));
    }

    /// Stage a removal.
    pub fn delete(&self, entity: T) {
        self.context
            .stage(Mutation::new(MutationKind::Delete, Box::new(entity)));
    }
}

/// Decode a TEXT column through `FromStr`.
pub(crate) fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Decode an INTEGER column holding epoch milliseconds.
pub(crate) fn millis_column(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let ms: i64 = row.try_get(column)?;
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("timestamp {} out of range", ms).into(),
    })
}
