// Orchestration of the request lifecycle across directory and ledger
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{JobRequest, NewRequest, RequestUpdate};
use crate::database::{ClientDirectory, JobLedger};
use crate::error::ServiceError;

/// Identity triple confirming a filed request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestTicket {
    pub job_id: Uuid,
    pub client_id: Uuid,
    pub summary_id: i64,
}

/// Coordinates submissions and amendments. Holds no state of its own beyond
/// the two store handles; every call is a fresh read-then-write pass.
pub struct RequestWorkflow {
    directory: Arc<dyn ClientDirectory>,
    ledger: Arc<dyn JobLedger>,
}

impl RequestWorkflow {
    pub fn new(directory: Arc<dyn ClientDirectory>, ledger: Arc<dyn JobLedger>) -> Self {
        Self { directory, ledger }
    }

    /// Files `requester`'s application for a job.
    ///
    /// The attached summary must belong to the requester; the gate is one
    /// indexed directory lookup and nothing is written when it fails. The
    /// insert and the job's `responses` bump then happen in one ledger
    /// transaction, so the counter moves exactly when a request appears.
    pub async fn submit_request(
        &self,
        requester: Uuid,
        job_id: Uuid,
        summary_id: i64,
    ) -> Result<RequestTicket, ServiceError> {
        let summary = self
            .directory
            .summary_for_owner(requester, summary_id)
            .await?
            .ok_or_else(|| ServiceError::validation("summary not found for requester"))?;

        let request = self
            .ledger
            .create_request(NewRequest {
                job_id,
                client_id: requester,
                summary_id: summary.id,
            })
            .await?;

        Ok(RequestTicket {
            job_id: request.job_id,
            client_id: request.client_id,
            summary_id: request.summary_id,
        })
    }

    /// Rewrites the response fields on the requester's own request for
    /// `job_id`. A pair with no existing request is rejected as a
    /// validation failure before any write is attempted.
    pub async fn amend_request(
        &self,
        requester: Uuid,
        job_id: Uuid,
        update: RequestUpdate,
    ) -> Result<JobRequest, ServiceError> {
        let existing = self
            .ledger
            .request_for_client(job_id, requester)
            .await?
            .ok_or_else(|| ServiceError::validation("request not found"))?;

        self.ledger
            .update_request(existing.job_id, existing.client_id, update)
            .await
    }
}
