pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;

pub use config::Config;
pub use db::{init_db, RepositoryWrapper};
pub use domain::{Account, AccountId, Owner, OwnerExtended, OwnerId, OwnerPayload};
pub use error::AppError;
