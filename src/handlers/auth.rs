// Registration, login and refresh: the only endpoints that mint tokens.
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::with_deadline;
use crate::auth::{self, password, TokenPair};
use crate::database::models::{ClientProfile, NewClient, Role};
use crate::error::{ApiError, ApiResult, ServiceError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub client: ClientProfile,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub(crate) fn validate_names(first_name: &str, last_name: &str) -> Result<(), ApiError> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(ApiError::validation("first_name and last_name are required"));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    if !email.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(ApiError::validation("email is not a valid address"));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}

/// POST /auth/register. Creates a client account and signs it in, in one
/// step. The refresh token is stored hashed alongside the new row.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    validate_names(&body.first_name, &body.last_name)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    let password_hash = password::hash_password(&body.password)?;
    let client_id = Uuid::new_v4();
    let pair = state.tokens.issue_pair(client_id, Role::Client)?;
    let new = NewClient {
        id: client_id,
        role: Role::Client,
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        password_hash,
        refresh_token_hash: Some(auth::hash_token(&pair.refresh_token)),
    };

    let directory = state.directory.clone();
    let client = with_deadline(&state, "register", async move {
        if directory.is_field_taken("email", &new.email).await? {
            return Err(ApiError::conflict("email already registered"));
        }
        Ok(directory.create_client(new).await?)
    })
    .await?;

    tracing::info!(client_id = %client.id, "client registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            client: client.into(),
        }),
    ))
}

/// POST /auth/login. A wrong password is 401; an unknown or deleted
/// account is 400 with the same message for both, so the response does not
/// reveal which one it was.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let directory = state.directory.clone();
    let tokens = state.tokens.clone();
    let pair = with_deadline(&state, "login", async move {
        let client = match directory.client_by_email(&body.email).await {
            Ok(client) => client,
            Err(ServiceError::NotFound(_)) => {
                return Err(ApiError::validation("no account for this email"))
            }
            Err(err) => return Err(err.into()),
        };
        if client.deleted_at.is_some() {
            return Err(ApiError::validation("no account for this email"));
        }
        if !password::verify_password(&body.password, &client.password_hash) {
            return Err(ApiError::unauthorized("invalid credentials"));
        }

        let pair = tokens.issue_pair(client.id, client.role)?;
        directory
            .store_refresh_token(client.id, Some(auth::hash_token(&pair.refresh_token)))
            .await?;
        tracing::info!(client_id = %client.id, "client logged in");
        Ok(pair)
    })
    .await?;

    Ok(Json(pair))
}

/// POST /auth/refresh. Verifies the refresh token's signature, audience
/// and stored hash, then rotates it: the presented token is invalid after
/// a successful exchange.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = state.tokens.verify_refresh(&body.refresh_token)?;
    let presented_hash = auth::hash_token(&body.refresh_token);

    let directory = state.directory.clone();
    let tokens = state.tokens.clone();
    let pair = with_deadline(&state, "refresh", async move {
        let client = match directory.client_by_id(claims.sub, false).await {
            Ok(client) => client,
            Err(ServiceError::NotFound(_)) => {
                return Err(ApiError::unauthorized("invalid or expired token"))
            }
            Err(err) => return Err(err.into()),
        };
        if client.refresh_token_hash.as_deref() != Some(presented_hash.as_str()) {
            return Err(ApiError::unauthorized("invalid or expired token"));
        }

        let pair = tokens.issue_pair(client.id, client.role)?;
        directory
            .store_refresh_token(client.id, Some(auth::hash_token(&pair.refresh_token)))
            .await?;
        Ok(pair)
    })
    .await?;

    Ok(Json(pair))
}
