//! Request identity: API key → [`User`], plus the role checks handlers use.

use std::collections::HashMap;

use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use models::{Student, User};
use tracing::{debug, warn};

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

fn api_key_from_request(req: &Request) -> Option<String> {
    let from_header = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());
    if let Some(k) = from_header {
        return Some(k.to_string());
    }
    // fallback to query param, percent-decoded
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(req.uri()).ok()?;
    params
        .get("api_key")
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// Middleware: resolve `X-API-Key` (or query `api_key`) to a user and stash
/// it in the request extensions. Missing or unknown keys get a 401.
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let Some(key) = api_key_from_request(&req) else {
        return Err(JsonApiError::unauthorized("Authentication required"));
    };

    let Some(user) = state.identity.resolve(&key).await else {
        warn!(path = %req.uri().path(), "unknown api key");
        return Err(JsonApiError::unauthorized("Authentication required"));
    };
    debug!(user = %user.username, role = %user.role, "request identified");
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub fn require_teacher(user: &User) -> Result<(), JsonApiError> {
    if user.is_teacher() {
        Ok(())
    } else {
        Err(JsonApiError::forbidden("Teacher access required"))
    }
}

/// The student record linked to a student user.
pub async fn own_student(state: &AppState, user: &User) -> Result<Student, JsonApiError> {
    let code = user
        .student_code
        .as_deref()
        .ok_or_else(|| JsonApiError::not_found("Student record not found"))?;
    state
        .services
        .students
        .get_by_code(code)
        .await
        .ok_or_else(|| JsonApiError::not_found("Student record not found"))
}

/// Teachers may look at any student; students only at themselves.
pub fn ensure_can_view(user: &User, student: &Student) -> Result<(), JsonApiError> {
    if user.is_teacher() || user.student_code.as_deref() == Some(student.student_id.as_str()) {
        Ok(())
    } else {
        Err(JsonApiError::forbidden("Access denied"))
    }
}
