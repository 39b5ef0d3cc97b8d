// Request endpoints. Submission and amendment go through the workflow so
// the summary-ownership gate and the counter transaction always apply;
// raw deletion is admin tooling.
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{with_deadline, ListParams, PageParams};
use crate::database::models::{JobRequest, RequestStatus, RequestUpdate};
use crate::database::store::RequestKey;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AdminClient, AuthClient};
use crate::state::AppState;
use crate::workflow::RequestTicket;

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub job_id: Uuid,
    pub summary_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequestBody {
    pub job_id: Uuid,
    pub status_resp: String,
    pub description_resp: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequestParams {
    pub job_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// POST /requests. Files the caller's application for a job using one of
/// their own summaries.
pub async fn create_request(
    State(state): State<AppState>,
    auth: AuthClient,
    Json(body): Json<CreateRequestBody>,
) -> ApiResult<(StatusCode, Json<RequestTicket>)> {
    let workflow = state.workflow.clone();
    let ticket = with_deadline(&state, "create_request", async move {
        Ok(workflow
            .submit_request(auth.client_id, body.job_id, body.summary_id)
            .await?)
    })
    .await?;
    tracing::info!(
        job_id = %ticket.job_id,
        client_id = %ticket.client_id,
        "request filed"
    );
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /requests, the caller's own filed requests.
pub async fn list_my_requests(
    State(state): State<AppState>,
    auth: AuthClient,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<JobRequest>>> {
    let query = params
        .into_query(&state.config)?
        .with_filter("client_id", auth.client_id.to_string());
    let ledger = state.ledger.clone();
    let requests = with_deadline(&state, "list_my_requests", async move {
        Ok(ledger.list_requests(&query).await?)
    })
    .await?;
    Ok(Json(requests))
}

/// GET /requests/all (admin). Listing across every client and job, with
/// the standard page/limit/field/value parameters.
pub async fn list_all_requests(
    State(state): State<AppState>,
    _admin: AdminClient,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<JobRequest>>> {
    let query = params.into_query(&state.config)?;
    let ledger = state.ledger.clone();
    let requests = with_deadline(&state, "list_requests", async move {
        Ok(ledger.list_requests(&query).await?)
    })
    .await?;
    Ok(Json(requests))
}

/// PUT /requests. Amends the caller's request for the given job; the
/// status value must be one of the known response states.
pub async fn update_request(
    State(state): State<AppState>,
    auth: AuthClient,
    Json(body): Json<UpdateRequestBody>,
) -> ApiResult<Json<JobRequest>> {
    let status: RequestStatus = body
        .status_resp
        .parse()
        .map_err(|_| ApiError::validation("status_resp must be pending, accepted or rejected"))?;
    let update = RequestUpdate {
        status_resp: status,
        description_resp: body.description_resp,
    };

    let workflow = state.workflow.clone();
    let request = with_deadline(&state, "update_request", async move {
        Ok(workflow
            .amend_request(auth.client_id, body.job_id, update)
            .await?)
    })
    .await?;
    Ok(Json(request))
}

/// DELETE /requests (admin). Deletes by key precedence: `job_id` wins
/// when both are given, and deleting by `client_id` removes every request
/// that client has filed. Responds with whether anything was removed.
pub async fn delete_request(
    State(state): State<AppState>,
    _admin: AdminClient,
    Query(params): Query<DeleteRequestParams>,
) -> ApiResult<Json<bool>> {
    let key = RequestKey {
        job_id: params.job_id,
        client_id: params.client_id,
    };
    let ledger = state.ledger.clone();
    let deleted = with_deadline(&state, "delete_request", async move {
        Ok(ledger.delete_request(key).await?)
    })
    .await?;
    Ok(Json(deleted))
}
