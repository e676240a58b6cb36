use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use models::Activity;
use serde::Deserialize;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivitiesQuery {
    pub limit: Option<usize>,
}

#[utoipa::path(get, path = "/api/activities", tag = "activities", responses((status = 200, description = "Recent activity, newest first")))]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ActivitiesQuery>, QueryRejection>,
) -> Result<Json<Vec<Activity>>, JsonApiError> {
    let Query(q) = query?;
    Ok(Json(state.services.activities.list(q.limit).await))
}
