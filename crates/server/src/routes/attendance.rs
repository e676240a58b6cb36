use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::attendance::parse_date;
use models::{AttendanceInput, AttendancePatch, AttendanceRecord, User};
use serde::Deserialize;
use service::attendance::{AttendanceFilter, AttendanceWithStudent};

use crate::errors::JsonApiError;
use crate::identity::{ensure_can_view, own_student, require_teacher};
use crate::observability::ATTENDANCE_MARKED_TOTAL;
use crate::routes::non_blank;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub date: Option<String>,
    pub student_id: Option<String>,
    pub class_name: Option<String>,
}

impl AttendanceQuery {
    fn into_filter(self) -> Result<AttendanceFilter, JsonApiError> {
        let date = non_blank(self.date)
            .map(|d| parse_date(&d))
            .transpose()
            .map_err(|e| JsonApiError::bad_request(e.to_string()))?;
        let student_id = non_blank(self.student_id)
            .map(|s| s.parse::<u64>())
            .transpose()
            .map_err(|_| JsonApiError::bad_request("Invalid student ID"))?;
        Ok(AttendanceFilter { date, student_id, class_name: non_blank(self.class_name) })
    }
}

/// Teachers see every record; a student's query is pinned to their own record.
#[utoipa::path(get, path = "/api/attendance", tag = "attendance", responses((status = 200, description = "Attendance joined with students"), (status = 400, description = "Bad filter")))]
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> Result<Json<Vec<AttendanceWithStudent>>, JsonApiError> {
    let Query(q) = query?;
    let mut filter = q.into_filter()?;
    if !user.is_teacher() {
        let me = own_student(&state, &user).await?;
        filter.student_id = Some(me.id);
    }
    Ok(Json(state.services.attendance.list(&filter).await))
}

#[utoipa::path(get, path = "/api/attendance/{id}", tag = "attendance", params(("id" = u64, Path, description = "Attendance record id")), responses((status = 200, description = "Attendance record"), (status = 403, description = "Access denied"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<AttendanceRecord>, JsonApiError> {
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid attendance ID"))?;
    let record = state
        .services
        .attendance
        .get(id)
        .await
        .ok_or_else(|| JsonApiError::not_found("Attendance record not found"))?;
    if !user.is_teacher() {
        let student = state
            .services
            .students
            .get(record.student_id)
            .await
            .ok_or_else(|| JsonApiError::not_found("Attendance record not found"))?;
        ensure_can_view(&user, &student)?;
    }
    Ok(Json(record))
}

#[utoipa::path(post, path = "/api/attendance", tag = "attendance", request_body = crate::openapi::AttendanceInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Already marked for that day")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<AttendanceInput>, JsonRejection>,
) -> Result<(StatusCode, Json<AttendanceRecord>), JsonApiError> {
    require_teacher(&user)?;
    let Json(input) = payload?;
    let record = state.services.attendance.create(input).await?;
    ATTENDANCE_MARKED_TOTAL.with_label_values(&[record.status.as_str()]).inc();
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(put, path = "/api/attendance/{id}", tag = "attendance", params(("id" = u64, Path, description = "Attendance record id")), request_body = crate::openapi::AttendancePatchDoc, responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<AttendancePatch>, JsonRejection>,
) -> Result<Json<AttendanceRecord>, JsonApiError> {
    require_teacher(&user)?;
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid attendance ID"))?;
    let Json(patch) = payload?;
    Ok(Json(state.services.attendance.update(id, patch).await?))
}

#[utoipa::path(delete, path = "/api/attendance/{id}", tag = "attendance", params(("id" = u64, Path, description = "Attendance record id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    require_teacher(&user)?;
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid attendance ID"))?;
    state.services.attendance.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
