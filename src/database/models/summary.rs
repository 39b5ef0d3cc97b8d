use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Skill profile. A client can keep several and attaches one to each job
/// request it files.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Summary {
    pub id: i64,
    pub owner_id: Uuid,
    pub skills: String,
    pub bio: String,
    pub languages: String,
}

#[derive(Debug, Clone)]
pub struct NewSummary {
    pub owner_id: Uuid,
    pub skills: String,
    pub bio: String,
    pub languages: String,
}

#[derive(Debug, Clone)]
pub struct SummaryUpdate {
    pub skills: String,
    pub bio: String,
    pub languages: String,
}
