// Job postings. Any signed-in client can browse; mutating a posting is
// reserved for its owner or an admin.
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{with_deadline, DeleteParams, ListParams, PageParams, VisibilityParams};
use crate::database::models::{Job, JobUpdate, NewJob, Role};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthClient;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobBody {
    pub title: String,
    pub description: String,
}

impl JobBody {
    fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::validation("title is required"));
        }
        Ok(())
    }
}

fn ensure_owner(auth: AuthClient, owner_id: Uuid) -> Result<(), ApiError> {
    if auth.role != Role::Admin && auth.client_id != owner_id {
        return Err(ApiError::forbidden("not the owner of this job"));
    }
    Ok(())
}

/// POST /jobs. The posting starts with a zero `responses` counter; only
/// filed requests ever move it.
pub async fn create_job(
    State(state): State<AppState>,
    auth: AuthClient,
    Json(body): Json<JobBody>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    body.validate()?;
    let new = NewJob {
        id: Uuid::new_v4(),
        owner_id: auth.client_id,
        title: body.title,
        description: body.description,
    };
    let ledger = state.ledger.clone();
    let job = with_deadline(&state, "create_job", async move {
        Ok(ledger.create_job(new).await?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    _auth: AuthClient,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Job>>> {
    let query = params.into_query(&state.config)?;
    let ledger = state.ledger.clone();
    let jobs = with_deadline(&state, "list_jobs", async move {
        Ok(ledger.list_jobs(&query).await?)
    })
    .await?;
    Ok(Json(jobs))
}

/// GET /jobs/mine, the caller's own postings.
pub async fn list_my_jobs(
    State(state): State<AppState>,
    auth: AuthClient,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<Job>>> {
    let query = params
        .into_query(&state.config)?
        .with_filter("owner_id", auth.client_id.to_string());
    let ledger = state.ledger.clone();
    let jobs = with_deadline(&state, "list_my_jobs", async move {
        Ok(ledger.list_jobs(&query).await?)
    })
    .await?;
    Ok(Json(jobs))
}

/// GET /jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    _auth: AuthClient,
    Path(id): Path<Uuid>,
    Query(params): Query<VisibilityParams>,
) -> ApiResult<Json<Job>> {
    let ledger = state.ledger.clone();
    let job = with_deadline(&state, "get_job", async move {
        Ok(ledger.job_by_id(id, params.include_deleted).await?)
    })
    .await?;
    Ok(Json(job))
}

/// PUT /jobs/:id. Title and description only; the `responses` counter is
/// not writable through the API.
pub async fn update_job(
    State(state): State<AppState>,
    auth: AuthClient,
    Path(id): Path<Uuid>,
    Json(body): Json<JobBody>,
) -> ApiResult<Json<Job>> {
    body.validate()?;
    let update = JobUpdate {
        title: body.title,
        description: body.description,
    };
    let ledger = state.ledger.clone();
    let job = with_deadline(&state, "update_job", async move {
        let current = ledger.job_by_id(id, false).await?;
        ensure_owner(auth, current.owner_id)?;
        Ok(ledger.update_job(id, update).await?)
    })
    .await?;
    Ok(Json(job))
}

/// DELETE /jobs/:id. The ownership check reads with the caller's
/// `include_deleted` flag so an already soft-deleted posting can still be
/// purged.
pub async fn delete_job(
    State(state): State<AppState>,
    auth: AuthClient,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<bool>> {
    let ledger = state.ledger.clone();
    let deleted = with_deadline(&state, "delete_job", async move {
        let current = ledger.job_by_id(id, params.include_deleted).await?;
        ensure_owner(auth, current.owner_id)?;
        Ok(ledger.delete_job(id, params.options()).await?)
    })
    .await?;
    Ok(Json(deleted))
}
