// Client profiles: self-service under /clients/me, admin management
// under /clients. Responses always carry the credential-free profile
// shape, never the stored row.
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::{validate_email, validate_names, validate_password};
use super::{with_deadline, DeleteParams, ListParams, VisibilityParams};
use crate::auth::password;
use crate::database::models::{ClientProfile, ClientUpdate, NewClient, Role};
use crate::database::store::DeleteOptions;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AdminClient, AuthClient};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
}

impl UpdateClientRequest {
    /// Validates the fields and hashes the password when one was sent.
    fn into_update(self) -> ApiResult<ClientUpdate> {
        validate_names(&self.first_name, &self.last_name)?;
        validate_email(&self.email)?;
        let password_hash = match self.password {
            Some(password) => {
                validate_password(&password)?;
                Some(password::hash_password(&password)?)
            }
            None => None,
        };
        Ok(ClientUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// GET /clients/me
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthClient,
) -> ApiResult<Json<ClientProfile>> {
    let directory = state.directory.clone();
    let client = with_deadline(&state, "get_me", async move {
        Ok(directory.client_by_id(auth.client_id, false).await?)
    })
    .await?;
    Ok(Json(client.into()))
}

/// PUT /clients/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthClient,
    Json(body): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientProfile>> {
    let update = body.into_update()?;
    let directory = state.directory.clone();
    let client = with_deadline(&state, "update_me", async move {
        Ok(directory.update_client(auth.client_id, update).await?)
    })
    .await?;
    Ok(Json(client.into()))
}

/// DELETE /clients/me. Always a soft delete; revokes the stored refresh
/// token so the account cannot be signed back in with an old one.
pub async fn delete_me(State(state): State<AppState>, auth: AuthClient) -> ApiResult<Json<bool>> {
    let directory = state.directory.clone();
    let deleted = with_deadline(&state, "delete_me", async move {
        let deleted = directory
            .delete_client(auth.client_id, DeleteOptions::default())
            .await?;
        directory.store_refresh_token(auth.client_id, None).await?;
        Ok(deleted)
    })
    .await?;
    tracing::info!(client_id = %auth.client_id, "client deactivated own account");
    Ok(Json(deleted))
}

/// POST /clients (admin). Creates an account with an arbitrary role; no
/// tokens are minted for it.
pub async fn create_client(
    State(state): State<AppState>,
    _admin: AdminClient,
    Json(body): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientProfile>)> {
    validate_names(&body.first_name, &body.last_name)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    let new = NewClient {
        id: Uuid::new_v4(),
        role: body.role,
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        password_hash: password::hash_password(&body.password)?,
        refresh_token_hash: None,
    };

    let directory = state.directory.clone();
    let client = with_deadline(&state, "create_client", async move {
        if directory.is_field_taken("email", &new.email).await? {
            return Err(ApiError::conflict("email already registered"));
        }
        Ok(directory.create_client(new).await?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

/// GET /clients (admin)
pub async fn list_clients(
    State(state): State<AppState>,
    _admin: AdminClient,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<ClientProfile>>> {
    let query = params.into_query(&state.config)?;
    let directory = state.directory.clone();
    let clients = with_deadline(&state, "list_clients", async move {
        Ok(directory.list_clients(&query).await?)
    })
    .await?;
    Ok(Json(clients.into_iter().map(ClientProfile::from).collect()))
}

/// GET /clients/:id (admin)
pub async fn get_client(
    State(state): State<AppState>,
    _admin: AdminClient,
    Path(id): Path<Uuid>,
    Query(params): Query<VisibilityParams>,
) -> ApiResult<Json<ClientProfile>> {
    let directory = state.directory.clone();
    let client = with_deadline(&state, "get_client", async move {
        Ok(directory.client_by_id(id, params.include_deleted).await?)
    })
    .await?;
    Ok(Json(client.into()))
}

/// PUT /clients/:id (admin)
pub async fn update_client(
    State(state): State<AppState>,
    _admin: AdminClient,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientProfile>> {
    let update = body.into_update()?;
    let directory = state.directory.clone();
    let client = with_deadline(&state, "update_client", async move {
        Ok(directory.update_client(id, update).await?)
    })
    .await?;
    Ok(Json(client.into()))
}

/// DELETE /clients/:id (admin). Soft by default; physical removal only
/// when both `include_deleted` and `hard` are set.
pub async fn delete_client(
    State(state): State<AppState>,
    _admin: AdminClient,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<bool>> {
    let directory = state.directory.clone();
    let deleted = with_deadline(&state, "delete_client", async move {
        Ok(directory.delete_client(id, params.options()).await?)
    })
    .await?;
    Ok(Json(deleted))
}
