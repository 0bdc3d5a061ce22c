use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};

use crate::db::RepositoryWrapper;
use crate::domain::{Owner, OwnerExtended, OwnerFields, OwnerId, OwnerPayload};
use crate::error::AppError;

type OwnerBody = Result<Bytes, BytesRejection>;
type OwnerPath = Result<Path<OwnerId>, PathRejection>;

/// Turn the raw request body into validated owner fields. An empty body is
/// treated the same as a JSON `null`.
fn read_owner_body(body: OwnerBody) -> Result<OwnerFields, AppError> {
    let bytes = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Failed to read owner body");
        AppError::BadRequest("Invalid model object".into())
    })?;

    let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<Option<OwnerPayload>>(&bytes).map_err(|e| {
            warn!(error = %e, "Invalid owner object sent from client");
            AppError::BadRequest("Invalid model object".into())
        })?
    };

    let Some(payload) = parsed else {
        warn!("Owner object sent from client is null");
        return Err(AppError::BadRequest("Owner object is null".into()));
    };

    payload.validate().map_err(|e| {
        warn!(error = %e, "Invalid owner object sent from client");
        AppError::BadRequest(format!("Invalid model object: {}", e))
    })
}

fn owner_not_found(id: OwnerId) -> AppError {
    warn!(owner_id = %id, "Owner hasn't been found in db");
    AppError::NotFound
}

pub async fn get_all_owners(repo: RepositoryWrapper) -> Result<Json<Vec<Owner>>, AppError> {
    let owners = repo.owner().find_all().await?;
    info!(count = owners.len(), "Returned all owners from database");
    Ok(Json(owners))
}

pub async fn get_owner_by_id(
    path: OwnerPath,
    repo: RepositoryWrapper,
) -> Result<Json<Owner>, AppError> {
    let Path(id) = path?;
    let owner = repo
        .owner()
        .find_by_id(id)
        .await?
        .ok_or_else(|| owner_not_found(id))?;

    info!(owner_id = %id, "Returned owner");
    Ok(Json(owner))
}

pub async fn get_owner_with_details(
    path: OwnerPath,
    repo: RepositoryWrapper,
) -> Result<Json<OwnerExtended>, AppError> {
    let Path(id) = path?;
    let owner = repo
        .owner()
        .find_with_details(id)
        .await?
        .ok_or_else(|| owner_not_found(id))?;

    info!(owner_id = %id, accounts = owner.accounts.len(), "Returned owner with details");
    Ok(Json(owner))
}

pub async fn create_owner(repo: RepositoryWrapper, body: OwnerBody) -> Result<Response, AppError> {
    let fields = read_owner_body(body)?;

    let owner = Owner::new(fields);
    repo.owner().create(owner.clone());
    repo.save().await?;

    info!(owner_id = %owner.id, "Created owner");
    let location = format!("/owners/{}", owner.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(owner)).into_response())
}

pub async fn update_owner(
    path: OwnerPath,
    repo: RepositoryWrapper,
    body: OwnerBody,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    let fields = read_owner_body(body)?;

    // Last writer wins: no version check between load and save.
    let db_owner = repo
        .owner()
        .find_by_id(id)
        .await?
        .ok_or_else(|| owner_not_found(id))?;
    repo.owner().update(db_owner, fields);
    repo.save().await?;

    info!(owner_id = %id, "Updated owner");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_owner(
    path: OwnerPath,
    repo: RepositoryWrapper,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    let owner = repo
        .owner()
        .find_by_id(id)
        .await?
        .ok_or_else(|| owner_not_found(id))?;
    repo.owner().delete(owner);
    repo.save().await?;

    info!(owner_id = %id, "Deleted owner");
    Ok(StatusCode::NO_CONTENT)
}
