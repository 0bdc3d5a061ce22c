//! Repository layer and unit of work.
//!
//! A [`RepositoryWrapper`] is created per request. It owns one
//! [`RepositoryContext`] (connection pool plus pending change set) shared by
//! the owner and account repositories, so a single `save()` commits every
//! mutation staged through either of them in one transaction.
//!
//! - `base.rs` - generic CRUD and the `Entity`/`Persist` traits
//! - `owners.rs` - owner queries and row mapping
//! - `accounts.rs` - account queries and row mapping

mod accounts;
mod base;
mod owners;

pub use accounts::{AccountFilter, AccountRepository};
pub use base::{BindValue, Condition, Entity, Persist, RepositoryBase};
pub use owners::OwnerRepository;

use sqlx::sqlite::SqlitePool;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{table} row {id} was not found while saving")]
    StaleRecord { table: &'static str, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// A create/update/delete recorded but not yet committed.
#[derive(Debug)]
pub struct Mutation {
    kind: MutationKind,
    entity: Box<dyn Persist>,
}

impl Mutation {
    pub fn new(kind: MutationKind, entity: Box<dyn Persist>) -> Self {
        Self { kind, entity }
    }
}

/// Pool plus the change set shared by all repositories of one unit of work.
pub struct RepositoryContext {
    pool: SqlitePool,
    pending: Mutex<Vec<Mutation>>,
}

impl RepositoryContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn stage(&self, mutation: Mutation) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mutation);
    }

    /// Number of staged, uncommitted mutations.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn take_pending(&self) -> Vec<Mutation> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Apply every staged mutation, in staging order, inside one transaction.
    ///
    /// The change set is drained whether or not the commit succeeds. On error
    /// nothing from the batch is persisted.
    ///
    /// # Errors
    /// Returns an error if any statement fails (including constraint
    /// violations) or if an update/delete matches no row.
    pub async fn save(&self) -> Result<usize, RepositoryError> {
        let pending = self.take_pending();
        if pending.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for mutation in &pending {
            let entity = mutation.entity.as_ref();
            let affected = match mutation.kind {
                MutationKind::Create => entity.insert(&mut *tx).await?,
                MutationKind::Update => entity.update(&mut *tx).await?,
                MutationKind::Delete => entity.delete(&mut *tx).await?,
            };

            if affected == 0 {
                warn!(
                    table = entity.table(),
                    id = %entity.key(),
                    kind = ?mutation.kind,
                    "Staged mutation matched no row, rolling back"
                );
                return Err(RepositoryError::StaleRecord {
                    table: entity.table(),
                    id: entity.key(),
                });
            }
        }
        tx.commit().await?;

        debug!(count = pending.len(), "Committed staged mutations");
        Ok(pending.len())
    }
}

/// Unit of work: one shared context and the repositories built on it.
pub struct RepositoryWrapper {
    context: Arc<RepositoryContext>,
    owner: OwnerRepository,
    account: AccountRepository,
}

impl RepositoryWrapper {
    pub fn new(pool: SqlitePool) -> Self {
        let context = Arc::new(RepositoryContext::new(pool));
        Self {
            owner: OwnerRepository::new(context.clone()),
            account: AccountRepository::new(context.clone()),
            context,
        }
    }

    pub fn owner(&self) -> &OwnerRepository {
        &self.owner
    }

    pub fn account(&self) -> &AccountRepository {
        &self.account
    }

    pub fn pending_count(&self) -> usize {
        self.context.pending_count()
    }

    /// Commit all mutations staged through either repository.
    pub async fn save(&self) -> Result<usize, RepositoryError> {
        self.context.save().await
    }
}
