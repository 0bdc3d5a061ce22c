//! Owner entity, its detail view, and the client payload used to create or
//! update it.

use crate::domain::validation::{required_text, ValidationError};
use crate::domain::{Account, OwnerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum length of `Owner::name`, in characters.
pub const OWNER_NAME_MAX_LEN: usize = 60;
/// Maximum length of `Owner::address`, in characters.
pub const OWNER_ADDRESS_MAX_LEN: usize = 100;

/// A persisted owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
}

impl Owner {
    /// Build a new owner with a freshly generated id.
    pub fn new(fields: OwnerFields) -> Self {
        Self {
            id: OwnerId::new_v4(),
            name: fields.name,
            date_of_birth: fields.date_of_birth,
            address: fields.address,
        }
    }

    /// Copy every mutable field from `fields` onto this record. The id is
    /// left untouched.
    pub fn apply(&mut self, fields: OwnerFields) {
        self.name = fields.name;
        self.date_of_birth = fields.date_of_birth;
        self.address = fields.address;
    }
}

/// Owner together with all of its accounts.
///
/// Only produced by detail lookups; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerExtended {
    #[serde(flatten)]
    pub owner: Owner,
    pub accounts: Vec<Account>,
}

/// Owner body as sent by clients. Every field is optional so that a missing
/// field surfaces as a validation error rather than a parse failure; an `id`
/// in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerPayload {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

/// Validated owner fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerFields {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
}

impl OwnerPayload {
    pub fn validate(self) -> Result<OwnerFields, ValidationError> {
        let name = required_text("name", self.name, Some(OWNER_NAME_MAX_LEN))?;
        let date_of_birth = self
            .date_of_birth
            .ok_or(ValidationError::Missing("dateOfBirth"))?;
        let address = required_text("address", self.address, Some(OWNER_ADDRESS_MAX_LEN))?;

        Ok(OwnerFields {
            name,
            date_of_birth,
            address,
        })
    }
}
