// Skill summaries. Writes are scoped to the caller's own summaries;
// reads by id are open to any signed-in client so job owners can review
// the profiles behind incoming requests.
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::{with_deadline, PageParams};
use crate::database::models::{NewSummary, Summary, SummaryUpdate};
use crate::error::ApiResult;
use crate::middleware::AuthClient;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryBody {
    pub skills: String,
    pub bio: String,
    pub languages: String,
}

/// POST /summaries
pub async fn create_summary(
    State(state): State<AppState>,
    auth: AuthClient,
    Json(body): Json<SummaryBody>,
) -> ApiResult<(StatusCode, Json<Summary>)> {
    let new = NewSummary {
        owner_id: auth.client_id,
        skills: body.skills,
        bio: body.bio,
        languages: body.languages,
    };
    let directory = state.directory.clone();
    let summary = with_deadline(&state, "create_summary", async move {
        Ok(directory.create_summary(new).await?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /summaries, always filtered to the caller's own rows.
pub async fn list_my_summaries(
    State(state): State<AppState>,
    auth: AuthClient,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<Summary>>> {
    let query = params
        .into_query(&state.config)?
        .with_filter("owner_id", auth.client_id.to_string());
    let directory = state.directory.clone();
    let summaries = with_deadline(&state, "list_my_summaries", async move {
        Ok(directory.list_summaries(&query).await?)
    })
    .await?;
    Ok(Json(summaries))
}

/// GET /summaries/:id
pub async fn get_summary(
    State(state): State<AppState>,
    _auth: AuthClient,
    Path(id): Path<i64>,
) -> ApiResult<Json<Summary>> {
    let directory = state.directory.clone();
    let summary = with_deadline(&state, "get_summary", async move {
        Ok(directory.summary_by_id(id).await?)
    })
    .await?;
    Ok(Json(summary))
}

/// PUT /summaries/:id. A summary owned by someone else is a 404, not a
/// 403: the row simply is not addressable for this caller.
pub async fn update_summary(
    State(state): State<AppState>,
    auth: AuthClient,
    Path(id): Path<i64>,
    Json(body): Json<SummaryBody>,
) -> ApiResult<Json<Summary>> {
    let update = SummaryUpdate {
        skills: body.skills,
        bio: body.bio,
        languages: body.languages,
    };
    let directory = state.directory.clone();
    let summary = with_deadline(&state, "update_summary", async move {
        Ok(directory.update_summary(auth.client_id, id, update).await?)
    })
    .await?;
    Ok(Json(summary))
}

/// DELETE /summaries/:id
pub async fn delete_summary(
    State(state): State<AppState>,
    auth: AuthClient,
    Path(id): Path<i64>,
) -> ApiResult<Json<bool>> {
    let directory = state.directory.clone();
    let deleted = with_deadline(&state, "delete_summary", async move {
        Ok(directory.delete_summary(auth.client_id, id).await?)
    })
    .await?;
    Ok(Json(deleted))
}
