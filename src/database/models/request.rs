use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Request lifecycle state. New requests start `Pending`; a review may set
/// any value, there is no enforced transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(()),
        }
    }
}

/// A client's application for a job. Identity is the (job_id, client_id)
/// pair, unique at the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRequest {
    pub job_id: Uuid,
    pub client_id: Uuid,
    pub summary_id: i64,
    pub status_resp: RequestStatus,
    pub description_resp: String,
}

#[derive(Debug, Clone)]
pub struct NewRequest {
    pub job_id: Uuid,
    pub client_id: Uuid,
    pub summary_id: i64,
}

#[derive(Debug, Clone)]
pub struct RequestUpdate {
    pub status_resp: RequestStatus,
    pub description_resp: String,
}
