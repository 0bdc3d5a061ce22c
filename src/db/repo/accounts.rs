//! Account queries and row mapping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use std::sync::Arc;

use super::base::{millis_column, parse_column, BindValue, Condition, Entity, Persist, RepositoryBase};
use super::RepositoryContext;
use crate::domain::{Account, AccountId, OwnerId};

#[async_trait]
impl Persist for Account {
    fn table(&self) -> &'static str {
        Self::TABLE
    }

    fn key(&self) -> String {
        self.id.to_string()
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO account (id, account_type, date_created, owner_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(self.id.to_string())
        .bind(self.account_type.as_str())
        .bind(self.date_created.timestamp_millis())
        .bind(self.owner_id.to_string())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE account
            SET account_type = ?, date_created = ?, owner_id = ?
            WHERE id = ?
            "#,
        )
        .bind(self.account_type.as_str())
        .bind(self.date_created.timestamp_millis())
        .bind(self.owner_id.to_string())
        .bind(self.id.to_string())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}

impl Entity for Account {
    const TABLE: &'static str = "account";
    const COLUMNS: &'static str = "id, account_type, date_created, owner_id";

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Account {
            id: parse_column(row, "id")?,
            account_type: row.try_get("account_type")?,
            date_created: millis_column(row, "date_created")?,
            owner_id: parse_column(row, "owner_id")?,
        })
    }
}

/// Supported account filters. Unset fields do not constrain the result; set
/// fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub owner_id: Option<OwnerId>,
    pub account_type: Option<String>,
    /// Inclusive lower bound on `date_created`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `date_created`.
    pub created_to: Option<DateTime<Utc>>,
}

impl AccountFilter {
    fn to_condition(&self) -> Condition {
        let mut condition = Condition::new().order_by("date_created ASC, id ASC");
        if let Some(owner_id) = self.owner_id {
            condition = condition.and("owner_id = ?", BindValue::Text(owner_id.to_string()));
        }
        if let Some(account_type) = &self.account_type {
            condition = condition.and("account_type = ?", BindValue::Text(account_type.clone()));
        }
        if let Some(from) = self.created_from {
            condition = condition.and(
                "date_created >= ?",
                BindValue::Integer(from.timestamp_millis()),
            );
        }
        if let Some(to) = self.created_to {
            condition = condition.and("date_created <= ?", BindValue::Integer(to.timestamp_millis()));
        }
        condition
    }
}

/// Repository for `account` rows.
pub struct AccountRepository {
    base: RepositoryBase<Account>,
}

impl AccountRepository {
    pub(crate) fn new(context: Arc<RepositoryContext>) -> Self {
        Self {
            base: RepositoryBase::new(context),
        }
    }

    /// All accounts, in no particular order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_all(&self) -> Result<Vec<Account>, sqlx::Error> {
        self.base.find_all().await
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, sqlx::Error> {
        let condition = Condition::new().and("id = ?", BindValue::Text(id.to_string()));
        Ok(self.base.find_by_condition(&condition).await?.into_iter().next())
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Account>, sqlx::Error> {
        self.find_filtered(&AccountFilter {
            owner_id: Some(owner_id),
            ..AccountFilter::default()
        })
        .await
    }

    /// Accounts of one category, e.g. `"Domestic"`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_type(&self, account_type: &str) -> Result<Vec<Account>, sqlx::Error> {
        self.find_filtered(&AccountFilter {
            account_type: Some(account_type.to_string()),
            ..AccountFilter::default()
        })
        .await
    }

    /// Accounts created within `[from, to]`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Account>, sqlx::Error> {
        self.find_filtered(&AccountFilter {
            created_from: Some(from),
            created_to: Some(to),
            ..AccountFilter::default()
        })
        .await
    }

    /// Accounts matching every set field of `filter`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_filtered(&self, filter: &AccountFilter) -> Result<Vec<Account>, sqlx::Error> {
        self.base.find_by_condition(&filter.to_condition()).await
    }

    /// Stage an insert of a new account.
    pub fn create(&self, account: Account) {
        self.base.create(account);
    }

    /// Stage a full-row update.
    pub fn update(&self, account: Account) {
        self.base.update(account);
    }

    /// Stage a removal.
    pub fn delete(&self, account: Account) {
        self.base.delete(account);
    }
}
