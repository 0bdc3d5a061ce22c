use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::db::{AccountFilter, RepositoryWrapper};
use crate::domain::{Account, OwnerId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsQuery {
    pub account_type: Option<String>,
    pub owner_id: Option<OwnerId>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
}

fn to_datetime(name: &str, ms: Option<i64>) -> Result<Option<DateTime<Utc>>, AppError> {
    ms.map(|ms| {
        DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| AppError::BadRequest(format!("{} is out of range", name)))
    })
    .transpose()
}

pub async fn get_accounts(
    query: Result<Query<AccountsQuery>, QueryRejection>,
    repo: RepositoryWrapper,
) -> Result<Json<Vec<Account>>, AppError> {
    let Query(params) = query?;
    if let (Some(from_ms), Some(to_ms)) = (params.from_ms, params.to_ms) {
        if from_ms > to_ms {
            return Err(AppError::BadRequest("fromMs must be <= toMs".into()));
        }
    }

    let filter = AccountFilter {
        owner_id: params.owner_id,
        account_type: params.account_type.filter(|t| !t.is_empty()),
        created_from: to_datetime("fromMs", params.from_ms)?,
        created_to: to_datetime("toMs", params.to_ms)?,
    };

    let accounts = repo.account().find_filtered(&filter).await?;
    info!(count = accounts.len(), ?filter, "Returned accounts");
    Ok(Json(accounts))
}
