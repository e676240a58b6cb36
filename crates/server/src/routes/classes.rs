use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::{Class, ClassInput, User};

use crate::errors::JsonApiError;
use crate::identity::require_teacher;
use crate::state::AppState;

#[utoipa::path(get, path = "/api/classes", tag = "classes", responses((status = 200, description = "All classes")))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<Class>> {
    Json(state.services.classes.list().await)
}

#[utoipa::path(get, path = "/api/classes/{id}", tag = "classes", params(("id" = u64, Path, description = "Class id")), responses((status = 200, description = "Class"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Class>, JsonApiError> {
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid class ID"))?;
    state
        .services
        .classes
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("Class not found"))
}

#[utoipa::path(post, path = "/api/classes", tag = "classes", request_body = crate::openapi::ClassInputDoc, responses((status = 201, description = "Created"), (status = 409, description = "Duplicate name")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<ClassInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Class>), JsonApiError> {
    require_teacher(&user)?;
    let Json(input) = payload?;
    let class = state.services.classes.create(input).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(put, path = "/api/classes/{id}", tag = "classes", params(("id" = u64, Path, description = "Class id")), request_body = crate::openapi::ClassInputDoc, responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Duplicate name")))]
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ClassInput>, JsonRejection>,
) -> Result<Json<Class>, JsonApiError> {
    require_teacher(&user)?;
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid class ID"))?;
    let Json(input) = payload?;
    Ok(Json(state.services.classes.update(id, input).await?))
}

#[utoipa::path(delete, path = "/api/classes/{id}", tag = "classes", params(("id" = u64, Path, description = "Class id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"), (status = 409, description = "Class still has students")))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    require_teacher(&user)?;
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid class ID"))?;
    state.services.classes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
