//! Endpoints scoped to the caller.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use models::{Student, User};
use serde::Serialize;
use service::attendance::AttendanceFilter;

use crate::errors::JsonApiError;
use crate::identity::own_student;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}

/// Students get their own records; teachers get everything joined with students.
#[utoipa::path(get, path = "/api/my-attendance", tag = "me", responses((status = 200, description = "Caller's attendance"), (status = 404, description = "Student record not found")))]
pub async fn my_attendance(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Response, JsonApiError> {
    if user.is_teacher() {
        let all = state.services.attendance.list(&AttendanceFilter::default()).await;
        return Ok(Json(all).into_response());
    }
    let me = own_student(&state, &user).await?;
    Ok(Json(state.services.attendance.for_student(me.id).await).into_response())
}

#[utoipa::path(get, path = "/api/my-profile", tag = "me", responses((status = 200, description = "Caller and linked student"), (status = 404, description = "Student record not found")))]
pub async fn my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Profile>, JsonApiError> {
    let student = if user.is_teacher() { None } else { Some(own_student(&state, &user).await?) };
    Ok(Json(Profile { user, student }))
}
