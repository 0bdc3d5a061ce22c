//! Owner queries and row mapping.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use std::sync::Arc;

use super::base::{millis_column, parse_column, BindValue, Condition, Entity, Persist, RepositoryBase};
use super::RepositoryContext;
use crate::domain::{Account, Owner, OwnerExtended, OwnerFields, OwnerId};

#[async_trait]
impl Persist for Owner {
    fn table(&self) -> &'static str {
        Self::TABLE
    }

    fn key(&self) -> String {
        self.id.to_string()
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO owner (id, name, date_of_birth, address)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(self.id.to_string())
        .bind(self.name.as_str())
        .bind(self.date_of_birth.to_string())
        .bind(self.address.as_str())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE owner
            SET name = ?, date_of_birth = ?, address = ?
            WHERE id = ?
            "#,
        )
        .bind(self.name.as_str())
        .bind(self.date_of_birth.to_string())
        .bind(self.address.as_str())
        .bind(self.id.to_string())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}

impl Entity for Owner {
    const TABLE: &'static str = "owner";
    const COLUMNS: &'static str = "id, name, date_of_birth, address";

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Owner {
            id: parse_column(row, "id")?,
            name: row.try_get("name")?,
            date_of_birth: parse_column(row, "date_of_birth")?,
            address: row.try_get("address")?,
        })
    }
}

/// Repository for `owner` rows.
pub struct OwnerRepository {
    base: RepositoryBase<Owner>,
}

impl OwnerRepository {
    pub(crate) fn new(context: Arc<RepositoryContext>) -> Self {
        Self {
            base: RepositoryBase::new(context),
        }
    }

    /// All owners, ordered by name.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_all(&self) -> Result<Vec<Owner>, sqlx::Error> {
        self.base
            .find_by_condition(&Condition::new().order_by("name ASC, id ASC"))
            .await
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: OwnerId) -> Result<Option<Owner>, sqlx::Error> {
        let condition = Condition::new().and("id = ?", BindValue::Text(id.to_string()));
        Ok(self.base.find_by_condition(&condition).await?.into_iter().next())
    }

    /// Owner with all of its accounts, loaded with a single join.
    ///
    /// Accounts are ordered by creation time.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_with_details(&self, id: OwnerId) -> Result<Option<OwnerExtended>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT o.id, o.name, o.date_of_birth, o.address,
                   a.id AS account_id, a.account_type, a.date_created
            FROM owner o
            LEFT JOIN account a ON a.owner_id = o.id
            WHERE o.id = ?
            ORDER BY a.date_created ASC, a.id ASC
            "#,
        )
        .bind(id.to_string())
        .fetch_all(self.base.pool())
        .await?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let owner = Owner::from_row(first)?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in &rows {
            // LEFT JOIN yields one all-NULL account row for owners without accounts
            if row.try_get::<Option<String>, _>("account_id")?.is_none() {
                continue;
            }
            accounts.push(Account {
                id: parse_column(row, "account_id")?,
                account_type: row.try_get("account_type")?,
                date_created: millis_column(row, "date_created")?,
                owner_id: owner.id,
            });
        }

        Ok(Some(OwnerExtended { owner, accounts }))
    }

    /// Stage an insert of a new owner.
    pub fn create(&self, owner: Owner) {
        self.base.create(owner);
    }

    /// Copy `fields` onto the loaded record and stage the update. Returns the
    /// record as it will be written.
    pub fn update(&self, mut db_owner: Owner, fields: OwnerFields) -> Owner {
        db_owner.apply(fields);
        self.base.update(db_owner.clone());
        db_owner
    }

    /// Stage a removal.
    pub fn delete(&self, owner: Owner) {
        self.base.delete(owner);
    }
}
