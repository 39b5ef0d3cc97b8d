// Storage contracts for the directory and ledger components
use async_trait::async_trait;
use uuid::Uuid;

use crate::database::filter::ListQuery;
use crate::database::models::{
    Client, ClientUpdate, Job, JobRequest, JobUpdate, NewClient, NewJob, NewRequest, NewSummary,
    RequestUpdate, Summary, SummaryUpdate,
};
use crate::error::ServiceError;

/// Delete switches shared by clients and jobs.
///
/// A physical delete happens only when `hard` AND `include_deleted` are both
/// set; `hard` alone still soft-deletes. Callers depend on the combined
/// gate, so it is preserved as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    pub include_deleted: bool,
    pub hard: bool,
}

impl DeleteOptions {
    pub fn is_physical(&self) -> bool {
        self.hard && self.include_deleted
    }
}

/// Lookup key for request fetch/delete. When both halves are present,
/// `job_id` takes precedence and `client_id` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestKey {
    pub job_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

impl RequestKey {
    pub fn by_job(job_id: Uuid) -> Self {
        RequestKey {
            job_id: Some(job_id),
            client_id: None,
        }
    }

    pub fn by_client(client_id: Uuid) -> Self {
        RequestKey {
            job_id: None,
            client_id: Some(client_id),
        }
    }

    /// Resolves to the single column the key filters on.
    pub fn column_and_value(&self) -> Result<(&'static str, Uuid), ServiceError> {
        if let Some(job_id) = self.job_id {
            Ok(("job_id", job_id))
        } else if let Some(client_id) = self.client_id {
            Ok(("client_id", client_id))
        } else {
            Err(ServiceError::validation(
                "either job_id or client_id is required",
            ))
        }
    }
}

/// Clients and their summaries: accounts, credentials at rest, skill
/// profiles. Absent rows surface as `ServiceError::NotFound`, never as an
/// empty success.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<(), ServiceError>;

    async fn create_client(&self, new: NewClient) -> Result<Client, ServiceError>;

    /// Soft-deleted rows are invisible unless `include_deleted` is set.
    async fn client_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Client, ServiceError>;

    async fn client_by_email(&self, email: &str) -> Result<Client, ServiceError>;

    async fn list_clients(&self, query: &ListQuery) -> Result<Vec<Client>, ServiceError>;

    async fn update_client(&self, id: Uuid, update: ClientUpdate) -> Result<Client, ServiceError>;

    async fn delete_client(&self, id: Uuid, opts: DeleteOptions) -> Result<bool, ServiceError>;

    /// True when a row already holds `value` in the whitelisted `field`.
    async fn is_field_taken(&self, field: &str, value: &str) -> Result<bool, ServiceError>;

    /// Replaces the refresh-token hash at rest; `None` revokes it.
    async fn store_refresh_token(
        &self,
        id: Uuid,
        token_hash: Option<String>,
    ) -> Result<(), ServiceError>;

    async fn create_summary(&self, new: NewSummary) -> Result<Summary, ServiceError>;

    async fn summary_by_id(&self, id: i64) -> Result<Summary, ServiceError>;

    /// Point lookup scoped to the owner; `Ok(None)` when the summary does
    /// not exist or belongs to someone else.
    async fn summary_for_owner(
        &self,
        owner_id: Uuid,
        id: i64,
    ) -> Result<Option<Summary>, ServiceError>;

    async fn list_summaries(&self, query: &ListQuery) -> Result<Vec<Summary>, ServiceError>;

    async fn update_summary(
        &self,
        owner_id: Uuid,
        id: i64,
        update: SummaryUpdate,
    ) -> Result<Summary, ServiceError>;

    async fn delete_summary(&self, owner_id: Uuid, id: i64) -> Result<bool, ServiceError>;
}

/// Jobs and the requests filed against them.
#[async_trait]
pub trait JobLedger: Send + Sync {
    async fn create_job(&self, new: NewJob) -> Result<Job, ServiceError>;

    async fn job_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Job, ServiceError>;

    async fn list_jobs(&self, query: &ListQuery) -> Result<Vec<Job>, ServiceError>;

    async fn update_job(&self, id: Uuid, update: JobUpdate) -> Result<Job, ServiceError>;

    async fn delete_job(&self, id: Uuid, opts: DeleteOptions) -> Result<bool, ServiceError>;

    /// Inserts the request and increments the job's `responses` counter in
    /// one transaction, so either both happen or neither does. A duplicate
    /// (job_id, client_id) pair is a `Conflict`; a missing or soft-deleted
    /// job is `NotFound` and rolls the insert back.
    async fn create_request(&self, new: NewRequest) -> Result<JobRequest, ServiceError>;

    /// Key-precedence lookup (see [`RequestKey`]).
    async fn request_by_key(&self, key: RequestKey) -> Result<JobRequest, ServiceError>;

    /// Indexed existence lookup for one client's request on one job.
    async fn request_for_client(
        &self,
        job_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<JobRequest>, ServiceError>;

    async fn list_requests(&self, query: &ListQuery) -> Result<Vec<JobRequest>, ServiceError>;

    /// Targets exactly the (job_id, client_id) row.
    async fn update_request(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        update: RequestUpdate,
    ) -> Result<JobRequest, ServiceError>;

    /// Deletes by key precedence. Does not touch any job's `responses`
    /// counter.
    async fn delete_request(&self, key: RequestKey) -> Result<bool, ServiceError>;
}
