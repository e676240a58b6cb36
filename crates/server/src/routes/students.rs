use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::{Student, StudentInput, User};
use serde::Deserialize;
use service::students::StudentFilter;

use crate::errors::JsonApiError;
use crate::identity::{ensure_can_view, require_teacher};
use crate::routes::non_blank;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListQuery {
    pub class_name: Option<String>,
    pub active: Option<bool>,
}

/// Teacher only. Optional `className` and `active` filters.
#[utoipa::path(get, path = "/api/students", tag = "students", responses((status = 200, description = "All students"), (status = 403, description = "Teacher access required")))]
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    query: Result<Query<StudentListQuery>, QueryRejection>,
) -> Result<Json<Vec<Student>>, JsonApiError> {
    require_teacher(&user)?;
    let Query(q) = query?;
    let filter = StudentFilter { class_name: non_blank(q.class_name), active: q.active };
    Ok(Json(state.services.students.list(&filter).await))
}

#[utoipa::path(get, path = "/api/students/{id}", tag = "students", params(("id" = u64, Path, description = "Student id")), responses((status = 200, description = "Student"), (status = 403, description = "Access denied"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Student>, JsonApiError> {
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid student ID"))?;
    let student = state
        .services
        .students
        .get(id)
        .await
        .ok_or_else(|| JsonApiError::not_found("Student not found"))?;
    ensure_can_view(&user, &student)?;
    Ok(Json(student))
}

#[utoipa::path(post, path = "/api/students", tag = "students", request_body = crate::openapi::StudentInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Duplicate student ID")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), JsonApiError> {
    require_teacher(&user)?;
    let Json(input) = payload?;
    let student = state.services.students.create(input).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(put, path = "/api/students/{id}", tag = "students", params(("id" = u64, Path, description = "Student id")), request_body = crate::openapi::StudentInputDoc, responses((status = 200, description = "Updated"), (status = 404, description = "Not found"), (status = 409, description = "Duplicate student ID")))]
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> Result<Json<Student>, JsonApiError> {
    require_teacher(&user)?;
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid student ID"))?;
    let Json(input) = payload?;
    Ok(Json(state.services.students.update(id, input).await?))
}

#[utoipa::path(delete, path = "/api/students/{id}", tag = "students", params(("id" = u64, Path, description = "Student id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    require_teacher(&user)?;
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid student ID"))?;
    state.services.students.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
