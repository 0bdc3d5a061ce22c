//! Domain types for the account/owner API.
//!
//! This module provides:
//! - Typed identities: OwnerId, AccountId
//! - The Owner and Account entities and the OwnerExtended detail view
//! - Client payload validation

pub mod account;
pub mod owner;
pub mod primitives;
pub mod validation;

pub use account::{Account, ACCOUNT_TYPE_DOMESTIC, ACCOUNT_TYPE_INTERNATIONAL};
pub use owner::{
    Owner, OwnerExtended, OwnerFields, OwnerPayload, OWNER_ADDRESS_MAX_LEN, OWNER_NAME_MAX_LEN,
};
pub use primitives::{AccountId, OwnerId};
pub use validation::ValidationError;
