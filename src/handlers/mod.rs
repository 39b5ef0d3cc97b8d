// HTTP surface of the gateway. Route groups mirror the resource split:
// public (banner, health, auth), self-service (me, summaries, jobs,
// requests) and admin-only client management.
use std::future::Future;

use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::database::filter::ListQuery;
use crate::database::store::DeleteOptions;
use crate::error::{ApiError, ApiResult, ServiceError};
use crate::state::AppState;

pub mod auth;
pub mod clients;
pub mod jobs;
pub mod requests;
pub mod summaries;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(client_routes())
        .merge(summary_routes())
        .merge(job_routes())
        .merge(request_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

fn client_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/clients/me",
            get(clients::get_me)
                .put(clients::update_me)
                .delete(clients::delete_me),
        )
        .route(
            "/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/clients/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
}

fn summary_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/summaries",
            get(summaries::list_my_summaries).post(summaries::create_summary),
        )
        .route(
            "/summaries/:id",
            get(summaries::get_summary)
                .put(summaries::update_summary)
                .delete(summaries::delete_summary),
        )
}

fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/jobs/mine", get(jobs::list_my_jobs))
        .route(
            "/jobs/:id",
            get(jobs::get_job)
                .put(jobs::update_job)
                .delete(jobs::delete_job),
        )
}

fn request_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/requests",
            post(requests::create_request)
                .get(requests::list_my_requests)
                .put(requests::update_request)
                .delete(requests::delete_request),
        )
        .route("/requests/all", get(requests::list_all_requests))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "gigboard",
        "description": "Freelance marketplace gateway: client directory, jobs and requests",
        "endpoints": {
            "health": "GET /health",
            "auth": "POST /auth/register, POST /auth/login, POST /auth/refresh",
            "clients": "GET|PUT|DELETE /clients/me, admin CRUD under /clients",
            "summaries": "CRUD under /summaries",
            "jobs": "CRUD under /jobs, GET /jobs/mine",
            "requests": "POST|GET|PUT|DELETE /requests, admin GET /requests/all"
        }
    }))
}

async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state
        .directory
        .ping()
        .await
        .map_err(|_| ApiError::service_unavailable("storage unreachable"))?;
    Ok(Json(json!({ "status": "healthy" })))
}

/// Runs a handler's downstream call chain under the gateway's flat
/// per-request deadline. Elapsing the deadline surfaces as a dependency
/// failure, not a partial result.
pub(crate) async fn with_deadline<F, T>(
    state: &AppState,
    operation: &'static str,
    fut: F,
) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    match tokio::time::timeout(state.config.request_timeout(), fut).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::dependency(operation, "deadline exceeded").into()),
    }
}

/// Common `?page=&limit=&field=&value=` listing parameters.
#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub field: Option<String>,
    pub value: Option<String>,
}

impl ListParams {
    pub(crate) fn into_query(self, config: &AppConfig) -> Result<ListQuery, ApiError> {
        let mut query = ListQuery::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(config.gateway.default_page_size),
        );
        query.field = self.field;
        query.value = self.value;
        query.validate()?;
        Ok(query)
    }
}

/// Bare `?page=&limit=` pagination for endpoints whose filter is fixed
/// by the caller's identity.
#[derive(Debug, Deserialize)]
pub(crate) struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub(crate) fn into_query(self, config: &AppConfig) -> Result<ListQuery, ApiError> {
        let query = ListQuery::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(config.gateway.default_page_size),
        );
        query.validate()?;
        Ok(query)
    }
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct VisibilityParams {
    #[serde(default)]
    pub include_deleted: bool,
}

/// Delete switches: `hard` only takes effect together with
/// `include_deleted`.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct DeleteParams {
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub hard: bool,
}

impl DeleteParams {
    pub(crate) fn options(&self) -> DeleteOptions {
        DeleteOptions {
            include_deleted: self.include_deleted,
            hard: self.hard,
        }
    }
}
