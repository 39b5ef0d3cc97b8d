use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    /// Count of requests filed against this job. Incremented exactly once
    /// per successful request creation, in the same transaction as the
    /// insert; never decremented when a request is deleted.
    pub responses: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
}

/// Title and description only; `responses` is owned by the request-creation
/// path and cannot be set through an update.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    pub title: String,
    pub description: String,
}
