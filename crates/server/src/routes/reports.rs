use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;
use models::attendance::parse_date;
use models::User;
use serde::Deserialize;
use service::reports::{DailyAttendance, DashboardStats, DateRange, StudentSummary};

use crate::errors::JsonApiError;
use crate::identity::{ensure_can_view, require_teacher};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub class_name: Option<String>,
}

impl RangeQuery {
    fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Both ends or neither; a half-open range is rejected.
    fn range(&self) -> Result<Option<DateRange>, JsonApiError> {
        let start = self.start_date.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let end = self.end_date.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (start, end) {
            (None, None) => Ok(None),
            (Some(s), Some(e)) => {
                let s = parse_date(s).map_err(|e| JsonApiError::bad_request(e.to_string()))?;
                let e = parse_date(e).map_err(|e| JsonApiError::bad_request(e.to_string()))?;
                Ok(Some(DateRange::new(s, e)?))
            }
            _ => Err(JsonApiError::bad_request("Start date and end date are required")),
        }
    }
}

#[utoipa::path(get, path = "/api/dashboard/stats", tag = "reports", responses((status = 200, description = "Counters for today (UTC)")))]
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardStats> {
    let today = Utc::now().date_naive();
    Json(state.services.reports.dashboard_stats(today).await)
}

/// Per-day counts over `startDate..=endDate`, optionally for one class.
#[utoipa::path(get, path = "/api/reports/attendance", tag = "reports", params(("startDate" = String, Query, description = "YYYY-MM-DD"), ("endDate" = String, Query, description = "YYYY-MM-DD"), ("className" = Option<String>, Query, description = "Only students of this class")), responses((status = 200, description = "One entry per day"), (status = 400, description = "Missing or invalid range"), (status = 403, description = "Teacher access required")))]
pub async fn attendance(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<DailyAttendance>>, JsonApiError> {
    require_teacher(&user)?;
    let Query(q) = query?;
    let range = q
        .range()?
        .ok_or_else(|| JsonApiError::bad_request("Start date and end date are required"))?;
    let stats = state.services.reports.attendance_stats(range, q.class_name()).await?;
    Ok(Json(stats))
}

#[utoipa::path(get, path = "/api/reports/students", tag = "reports", responses((status = 200, description = "Summary per student"), (status = 403, description = "Teacher access required")))]
pub async fn students(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<StudentSummary>>, JsonApiError> {
    require_teacher(&user)?;
    let Query(q) = query?;
    let range = q.range()?;
    Ok(Json(state.services.reports.class_summary(q.class_name(), range).await))
}

#[utoipa::path(get, path = "/api/students/{id}/summary", tag = "reports", params(("id" = u64, Path, description = "Student id")), responses((status = 200, description = "Attendance summary"), (status = 403, description = "Access denied"), (status = 404, description = "Not found")))]
pub async fn student_summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<u64>, PathRejection>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<StudentSummary>, JsonApiError> {
    let Path(id) = path.map_err(|_| JsonApiError::bad_request("Invalid student ID"))?;
    let Query(q) = query?;
    let student = state
        .services
        .students
        .get(id)
        .await
        .ok_or_else(|| JsonApiError::not_found("Student not found"))?;
    ensure_can_view(&user, &student)?;
    let summary = state.services.reports.student_summary(student.id, q.range()?).await?;
    Ok(Json(summary))
}
