//! Account entity.

use crate::domain::validation::{required_text, ValidationError};
use crate::domain::{AccountId, OwnerId};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub const ACCOUNT_TYPE_DOMESTIC: &str = "Domestic";
pub const ACCOUNT_TYPE_INTERNATIONAL: &str = "International";

/// An account belonging to exactly one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub account_type: String,
    /// Creation time, millisecond precision.
    pub date_created: DateTime<Utc>,
    pub owner_id: OwnerId,
}

impl Account {
    /// Create a new account for `owner_id`, stamped with the current time.
    pub fn new(owner_id: OwnerId, account_type: impl Into<String>) -> Result<Self, ValidationError> {
        Self::created_at(owner_id, account_type, Utc::now())
    }

    /// Create a new account with an explicit creation time. Sub-millisecond
    /// precision is dropped to match what the store keeps.
    pub fn created_at(
        owner_id: OwnerId,
        account_type: impl Into<String>,
        date_created: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let account_type = required_text("accountType", Some(account_type.into()), None)?;
        Ok(Self {
            id: AccountId::new_v4(),
            account_type,
            date_created: date_created.trunc_subsecs(3),
            owner_id,
        })
    }
}
