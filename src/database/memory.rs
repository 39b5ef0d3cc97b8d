// In-memory implementations of the storage contracts.
//
// Behaviorally a twin of the Postgres backend (same visibility rules, same
// error kinds, same ordering), held behind the same traits so the gateway
// and the test suites can run without a database.
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::filter::{
    self, FieldMatch, ListQuery, CLIENT_FIELDS, CLIENT_UNIQUE_FIELDS, JOB_FIELDS, REQUEST_FIELDS,
    SUMMARY_FIELDS,
};
use crate::database::models::{
    Client, ClientUpdate, Job, JobRequest, JobUpdate, NewClient, NewJob, NewRequest, NewSummary,
    RequestStatus, RequestUpdate, Summary, SummaryUpdate,
};
use crate::database::store::{ClientDirectory, DeleteOptions, JobLedger, RequestKey};
use crate::error::ServiceError;

fn paginate<T>(rows: Vec<T>, query: &ListQuery) -> Vec<T> {
    if query.is_unbounded() {
        return rows;
    }
    let offset = query.offset().max(0) as usize;
    let limit = query.limit.max(0) as usize;
    rows.into_iter().skip(offset).take(limit).collect()
}

#[derive(Default)]
struct DirectoryInner {
    clients: Vec<Client>,
    summaries: Vec<Summary>,
    next_summary_id: i64,
}

#[derive(Default)]
pub struct MemoryDirectory {
    inner: RwLock<DirectoryInner>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn client_matches(client: &Client, matcher: &FieldMatch) -> bool {
    match matcher {
        FieldMatch::Uuid { column, value } => match *column {
            "id" => client.id == *value,
            _ => false,
        },
        FieldMatch::Prefix { column, value } => {
            let field = match *column {
                "email" => client.email.as_str(),
                "first_name" => client.first_name.as_str(),
                "last_name" => client.last_name.as_str(),
                "role" => client.role.as_str(),
                _ => return false,
            };
            filter::starts_with_ci(field, value)
        }
        FieldMatch::Int { .. } => false,
    }
}

fn summary_matches(summary: &Summary, matcher: &FieldMatch) -> bool {
    match matcher {
        FieldMatch::Uuid { column, value } => match *column {
            "owner_id" => summary.owner_id == *value,
            _ => false,
        },
        FieldMatch::Int { column, value } => match *column {
            "id" => summary.id == *value,
            _ => false,
        },
        FieldMatch::Prefix { column, value } => {
            let field = match *column {
                "skills" => summary.skills.as_str(),
                "bio" => summary.bio.as_str(),
                "languages" => summary.languages.as_str(),
                _ => return false,
            };
            filter::starts_with_ci(field, value)
        }
    }
}

#[async_trait]
impl ClientDirectory for MemoryDirectory {
    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn create_client(&self, new: NewClient) -> Result<Client, ServiceError> {
        let mut inner = self.inner.write().await;
        if inner
            .clients
            .iter()
            .any(|c| c.email == new.email || c.id == new.id)
        {
            return Err(ServiceError::conflict("email already registered"));
        }
        let now = Utc::now();
        let client = Client {
            id: new.id,
            role: new.role,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            refresh_token_hash: new.refresh_token_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.clients.push(client.clone());
        Ok(client)
    }

    async fn client_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Client, ServiceError> {
        let inner = self.inner.read().await;
        inner
            .clients
            .iter()
            .find(|c| c.id == id && (include_deleted || c.deleted_at.is_none()))
            .cloned()
            .ok_or_else(|| ServiceError::not_found("client not found"))
    }

    async fn client_by_email(&self, email: &str) -> Result<Client, ServiceError> {
        let inner = self.inner.read().await;
        inner
            .clients
            .iter()
            .find(|c| c.email == email)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("client not found"))
    }

    async fn list_clients(&self, query: &ListQuery) -> Result<Vec<Client>, ServiceError> {
        query.validate()?;
        let matcher = filter::resolve_filter(CLIENT_FIELDS, query)?;
        let inner = self.inner.read().await;
        let mut rows: Vec<Client> = inner
            .clients
            .iter()
            .filter(|c| matcher.as_ref().map_or(true, |m| client_matches(c, m)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(rows, query))
    }

    async fn update_client(&self, id: Uuid, update: ClientUpdate) -> Result<Client, ServiceError> {
        let mut inner = self.inner.write().await;
        if inner
            .clients
            .iter()
            .any(|c| c.id != id && c.email == update.email)
        {
            return Err(ServiceError::conflict("email already registered"));
        }
        let client = inner
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ServiceError::not_found("client not found"))?;
        client.first_name = update.first_name;
        client.last_name = update.last_name;
        client.email = update.email;
        if let Some(hash) = update.password_hash {
            client.password_hash = hash;
        }
        client.updated_at = Utc::now();
        Ok(client.clone())
    }

    async fn delete_client(&self, id: Uuid, opts: DeleteOptions) -> Result<bool, ServiceError> {
        let mut inner = self.inner.write().await;
        if opts.is_physical() {
            let before = inner.clients.len();
            inner.clients.retain(|c| c.id != id);
            if inner.clients.len() == before {
                return Err(ServiceError::not_found("client not found"));
            }
        } else {
            let client = inner
                .clients
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| ServiceError::not_found("client not found"))?;
            client.deleted_at = Some(Utc::now());
        }
        Ok(true)
    }

    async fn is_field_taken(&self, field: &str, value: &str) -> Result<bool, ServiceError> {
        if !CLIENT_UNIQUE_FIELDS.contains(&field) {
            return Err(ServiceError::validation(format!(
                "unknown unique field: {field}"
            )));
        }
        let inner = self.inner.read().await;
        let taken = inner.clients.iter().any(|c| match field {
            "id" => c.id.to_string() == value,
            "email" => c.email == value,
            _ => false,
        });
        Ok(taken)
    }

    async fn store_refresh_token(
        &self,
        id: Uuid,
        token_hash: Option<String>,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.write().await;
        let client = inner
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ServiceError::not_found("client not found"))?;
        client.refresh_token_hash = token_hash;
        client.updated_at = Utc::now();
        Ok(())
    }

    async fn create_summary(&self, new: NewSummary) -> Result<Summary, ServiceError> {
        let mut inner = self.inner.write().await;
        inner.next_summary_id += 1;
        let summary = Summary {
            id: inner.next_summary_id,
            owner_id: new.owner_id,
            skills: new.skills,
            bio: new.bio,
            languages: new.languages,
        };
        inner.summaries.push(summary.clone());
        Ok(summary)
    }

    async fn summary_by_id(&self, id: i64) -> Result<Summary, ServiceError> {
        let inner = self.inner.read().await;
        inner
            .summaries
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("summary not found"))
    }

    async fn summary_for_owner(
        &self,
        owner_id: Uuid,
        id: i64,
    ) -> Result<Option<Summary>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(inner
            .summaries
            .iter()
            .find(|s| s.owner_id == owner_id && s.id == id)
            .cloned())
    }

    async fn list_summaries(&self, query: &ListQuery) -> Result<Vec<Summary>, ServiceError> {
        query.validate()?;
        let matcher = filter::resolve_filter(SUMMARY_FIELDS, query)?;
        let inner = self.inner.read().await;
        let mut rows: Vec<Summary> = inner
            .summaries
            .iter()
            .filter(|s| matcher.as_ref().map_or(true, |m| summary_matches(s, m)))
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.id);
        Ok(paginate(rows, query))
    }

    async fn update_summary(
        &self,
        owner_id: Uuid,
        id: i64,
        update: SummaryUpdate,
    ) -> Result<Summary, ServiceError> {
        let mut inner = self.inner.write().await;
        let summary = inner
            .summaries
            .iter_mut()
            .find(|s| s.owner_id == owner_id && s.id == id)
            .ok_or_else(|| ServiceError::not_found("summary not found"))?;
        summary.skills = update.skills;
        summary.bio = update.bio;
        summary.languages = update.languages;
        Ok(summary.clone())
    }

    async fn delete_summary(&self, owner_id: Uuid, id: i64) -> Result<bool, ServiceError> {
        let mut inner = self.inner.write().await;
        let before = inner.summaries.len();
        inner
            .summaries
            .retain(|s| !(s.owner_id == owner_id && s.id == id));
        if inner.summaries.len() == before {
            return Err(ServiceError::not_found("summary not found"));
        }
        Ok(true)
    }
}

#[derive(Default)]
struct LedgerInner {
    jobs: Vec<Job>,
    requests: Vec<JobRequest>,
}

#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<LedgerInner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn job_matches(job: &Job, matcher: &FieldMatch) -> bool {
    match matcher {
        FieldMatch::Uuid { column, value } => match *column {
            "id" => job.id == *value,
            "owner_id" => job.owner_id == *value,
            _ => false,
        },
        FieldMatch::Prefix { column, value } => {
            let field = match *column {
                "title" => job.title.as_str(),
                "description" => job.description.as_str(),
                _ => return false,
            };
            filter::starts_with_ci(field, value)
        }
        FieldMatch::Int { .. } => false,
    }
}

fn request_matches(request: &JobRequest, matcher: &FieldMatch) -> bool {
    match matcher {
        FieldMatch::Uuid { column, value } => match *column {
            "job_id" => request.job_id == *value,
            "client_id" => request.client_id == *value,
            _ => false,
        },
        FieldMatch::Prefix { column, value } => {
            let field = match *column {
                "status_resp" => request.status_resp.as_str(),
                "description_resp" => request.description_resp.as_str(),
                _ => return false,
            };
            filter::starts_with_ci(field, value)
        }
        FieldMatch::Int { .. } => false,
    }
}

#[async_trait]
impl JobLedger for MemoryLedger {
    async fn create_job(&self, new: NewJob) -> Result<Job, ServiceError> {
        let mut inner = self.inner.write().await;
        if inner.jobs.iter().any(|j| j.id == new.id) {
            return Err(ServiceError::conflict("job already exists"));
        }
        let now = Utc::now();
        let job = Job {
            id: new.id,
            owner_id: new.owner_id,
            title: new.title,
            description: new.description,
            responses: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.jobs.push(job.clone());
        Ok(job)
    }

    async fn job_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Job, ServiceError> {
        let inner = self.inner.read().await;
        inner
            .jobs
            .iter()
            .find(|j| j.id == id && (include_deleted || j.deleted_at.is_none()))
            .cloned()
            .ok_or_else(|| ServiceError::not_found("job not found"))
    }

    async fn list_jobs(&self, query: &ListQuery) -> Result<Vec<Job>, ServiceError> {
        query.validate()?;
        let matcher = filter::resolve_filter(JOB_FIELDS, query)?;
        let inner = self.inner.read().await;
        let mut rows: Vec<Job> = inner
            .jobs
            .iter()
            .filter(|j| matcher.as_ref().map_or(true, |m| job_matches(j, m)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(rows, query))
    }

    async fn update_job(&self, id: Uuid, update: JobUpdate) -> Result<Job, ServiceError> {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| ServiceError::not_found("job not found"))?;
        job.title = update.title;
        job.description = update.description;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn delete_job(&self, id: Uuid, opts: DeleteOptions) -> Result<bool, ServiceError> {
        let mut inner = self.inner.write().await;
        if opts.is_physical() {
            let before = inner.jobs.len();
            inner.jobs.retain(|j| j.id != id);
            if inner.jobs.len() == before {
                return Err(ServiceError::not_found("job not found"));
            }
        } else {
            let job = inner
                .jobs
                .iter_mut()
                .find(|j| j.id == id)
                .ok_or_else(|| ServiceError::not_found("job not found"))?;
            job.deleted_at = Some(Utc::now());
        }
        Ok(true)
    }

    async fn create_request(&self, new: NewRequest) -> Result<JobRequest, ServiceError> {
        // One write lock covers the duplicate check, the insert and the
        // counter bump, mirroring the single storage transaction.
        let mut inner = self.inner.write().await;
        if inner
            .requests
            .iter()
            .any(|r| r.job_id == new.job_id && r.client_id == new.client_id)
        {
            return Err(ServiceError::conflict("request already filed for this job"));
        }
        let job = inner
            .jobs
            .iter_mut()
            .find(|j| j.id == new.job_id && j.deleted_at.is_none())
            .ok_or_else(|| ServiceError::not_found("job not found"))?;
        job.responses += 1;

        let request = JobRequest {
            job_id: new.job_id,
            client_id: new.client_id,
            summary_id: new.summary_id,
            status_resp: RequestStatus::Pending,
            description_resp: String::new(),
        };
        inner.requests.push(request.clone());
        Ok(request)
    }

    async fn request_by_key(&self, key: RequestKey) -> Result<JobRequest, ServiceError> {
        let (column, value) = key.column_and_value()?;
        let inner = self.inner.read().await;
        let mut rows: Vec<&JobRequest> = inner
            .requests
            .iter()
            .filter(|r| match column {
                "job_id" => r.job_id == value,
                _ => r.client_id == value,
            })
            .collect();
        rows.sort_by(|a, b| a.job_id.cmp(&b.job_id).then(a.client_id.cmp(&b.client_id)));
        rows.first()
            .map(|r| (*r).clone())
            .ok_or_else(|| ServiceError::not_found("request not found"))
    }

    async fn request_for_client(
        &self,
        job_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<JobRequest>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(inner
            .requests
            .iter()
            .find(|r| r.job_id == job_id && r.client_id == client_id)
            .cloned())
    }

    async fn list_requests(&self, query: &ListQuery) -> Result<Vec<JobRequest>, ServiceError> {
        query.validate()?;
        let matcher = filter::resolve_filter(REQUEST_FIELDS, query)?;
        let inner = self.inner.read().await;
        let mut rows: Vec<JobRequest> = inner
            .requests
            .iter()
            .filter(|r| matcher.as_ref().map_or(true, |m| request_matches(r, m)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.job_id.cmp(&b.job_id).then(a.client_id.cmp(&b.client_id)));
        Ok(paginate(rows, query))
    }

    async fn update_request(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        update: RequestUpdate,
    ) -> Result<JobRequest, ServiceError> {
        let mut inner = self.inner.write().await;
        let request = inner
            .requests
            .iter_mut()
            .find(|r| r.job_id == job_id && r.client_id == client_id)
            .ok_or_else(|| ServiceError::not_found("request not found"))?;
        request.status_resp = update.status_resp;
        request.description_resp = update.description_resp;
        Ok(request.clone())
    }

    async fn delete_request(&self, key: RequestKey) -> Result<bool, ServiceError> {
        let (column, value) = key.column_and_value()?;
        let mut inner = self.inner.write().await;
        let before = inner.requests.len();
        inner.requests.retain(|r| match column {
            "job_id" => r.job_id != value,
            _ => r.client_id != value,
        });
        Ok(inner.requests.len() < before)
    }
}
