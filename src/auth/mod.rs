pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::database::models::Role;
use crate::error::ApiError;

const ISSUER: &str = "gigboard";
const ACCESS_AUDIENCE: &str = "gigboard-api";
const REFRESH_AUDIENCE: &str = "gigboard-refresh";

/// Claims carried by both token kinds; the audience tells them apart, so a
/// refresh token can never pass as an access token. The fresh `jti` makes
/// every issued token distinct even within one clock second; refresh
/// rotation relies on that to supersede the previous token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    pub jti: Uuid,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token rejected")]
    InvalidToken,
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => ApiError::unauthorized("invalid or expired token"),
            AuthError::Signing(source) => {
                tracing::error!(error = %source, "token signing failed");
                ApiError::dependency("a dependency failed while processing the request")
            }
        }
    }
}

/// Issues and verifies the access/refresh pair. Holds the prepared keys so
/// nothing about token state is shared mutably between requests.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_expiry: Duration,
    refresh_expiry: Duration,
}

impl TokenService {
    pub fn from_config(config: &TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_expiry: Duration::minutes(config.access_ttl_minutes),
            refresh_expiry: Duration::days(config.refresh_ttl_days),
        }
    }

    pub fn issue_pair(&self, client_id: Uuid, role: Role) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(client_id, role, ACCESS_AUDIENCE, self.access_expiry)?,
            refresh_token: self.issue(client_id, role, REFRESH_AUDIENCE, self.refresh_expiry)?,
        })
    }

    fn issue(
        &self,
        client_id: Uuid,
        role: Role,
        audience: &str,
        expiry: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: client_id,
            role,
            iss: ISSUER.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4(),
            iat: now.timestamp() as usize,
            exp: (now + expiry).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, ACCESS_AUDIENCE)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, REFRESH_AUDIENCE)
    }

    fn verify(&self, token: &str, audience: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_audience(&[audience]);
        validation.set_issuer(&[ISSUER]);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// SHA-256 hex of a refresh token, the only form stored at rest. Comparing
/// hashes on refresh ties the presented token to the most recently issued
/// one, so rotation invalidates its predecessor.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
