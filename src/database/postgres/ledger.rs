use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{exec_err, fetch_err, insert_err, query_list};
use crate::database::filter::{ListQuery, JOB_FIELDS, REQUEST_FIELDS};
use crate::database::models::{
    Job, JobRequest, JobUpdate, NewJob, NewRequest, RequestStatus, RequestUpdate,
};
use crate::database::store::{DeleteOptions, JobLedger, RequestKey};
use crate::error::ServiceError;

const JOB_COLUMNS: &str =
    "id, owner_id, title, description, responses, created_at, updated_at, deleted_at";
const REQUEST_COLUMNS: &str = "job_id, client_id, summary_id, status_resp, description_resp";

/// Ledger backed by the `jobs` and `job_requests` tables.
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobLedger for PgLedger {
    async fn create_job(&self, new: NewJob) -> Result<Job, ServiceError> {
        let sql = format!(
            "INSERT INTO jobs \
                 (id, owner_id, title, description, responses, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, 0, now(), now()) \
             RETURNING {JOB_COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&sql)
            .bind(new.id)
            .bind(new.owner_id)
            .bind(&new.title)
            .bind(&new.description)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_err("create_job", "job already exists"))
    }

    async fn job_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Job, ServiceError> {
        let mut sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        if !include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(fetch_err("job_by_id", "job not found"))
    }

    async fn list_jobs(&self, query: &ListQuery) -> Result<Vec<Job>, ServiceError> {
        let select = format!("SELECT {JOB_COLUMNS} FROM jobs");
        query_list(
            &self.pool,
            &select,
            "created_at, id",
            JOB_FIELDS,
            query,
            "list_jobs",
        )
        .await
    }

    async fn update_job(&self, id: Uuid, update: JobUpdate) -> Result<Job, ServiceError> {
        let sql = format!(
            "UPDATE jobs SET title = $2, description = $3, updated_at = now() \
             WHERE id = $1 RETURNING {JOB_COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(&update.title)
            .bind(&update.description)
            .fetch_one(&self.pool)
            .await
            .map_err(fetch_err("update_job", "job not found"))
    }

    async fn delete_job(&self, id: Uuid, opts: DeleteOptions) -> Result<bool, ServiceError> {
        let result = if opts.is_physical() {
            sqlx::query("DELETE FROM jobs WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
        } else {
            sqlx::query("UPDATE jobs SET deleted_at = now() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
        }
        .map_err(exec_err("delete_job"))?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("job not found"));
        }
        Ok(true)
    }

    async fn create_request(&self, new: NewRequest) -> Result<JobRequest, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(exec_err("create_request"))?;

        let sql = format!(
            "INSERT INTO job_requests \
                 (job_id, client_id, summary_id, status_resp, description_resp) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, JobRequest>(&sql)
            .bind(new.job_id)
            .bind(new.client_id)
            .bind(new.summary_id)
            .bind(RequestStatus::Pending)
            .bind("")
            .fetch_one(&mut *tx)
            .await
            .map_err(insert_err(
                "create_request",
                "request already filed for this job",
            ))?;

        let incremented =
            sqlx::query("UPDATE jobs SET responses = responses + 1 WHERE id = $1 AND deleted_at IS NULL")
                .bind(new.job_id)
                .execute(&mut *tx)
                .await
                .map_err(exec_err("create_request"))?;
        if incremented.rows_affected() == 0 {
            // Dropping the transaction rolls the insert back with it.
            return Err(ServiceError::not_found("job not found"));
        }

        tx.commit().await.map_err(exec_err("create_request"))?;
        Ok(request)
    }

    async fn request_by_key(&self, key: RequestKey) -> Result<JobRequest, ServiceError> {
        let (column, value) = key.column_and_value()?;
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM job_requests WHERE {column} = $1 \
             ORDER BY job_id, client_id LIMIT 1"
        );
        sqlx::query_as::<_, JobRequest>(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(fetch_err("request_by_key", "request not found"))
    }

    async fn request_for_client(
        &self,
        job_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<JobRequest>, ServiceError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM job_requests WHERE job_id = $1 AND client_id = $2"
        );
        sqlx::query_as::<_, JobRequest>(&sql)
            .bind(job_id)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(exec_err("request_for_client"))
    }

    async fn list_requests(&self, query: &ListQuery) -> Result<Vec<JobRequest>, ServiceError> {
        let select = format!("SELECT {REQUEST_COLUMNS} FROM job_requests");
        query_list(
            &self.pool,
            &select,
            "job_id, client_id",
            REQUEST_FIELDS,
            query,
            "list_requests",
        )
        .await
    }

    async fn update_request(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        update: RequestUpdate,
    ) -> Result<JobRequest, ServiceError> {
        let sql = format!(
            "UPDATE job_requests SET status_resp = $3, description_resp = $4 \
             WHERE job_id = $1 AND client_id = $2 \
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, JobRequest>(&sql)
            .bind(job_id)
            .bind(client_id)
            .bind(update.status_resp)
            .bind(&update.description_resp)
            .fetch_one(&self.pool)
            .await
            .map_err(fetch_err("update_request", "request not found"))
    }

    async fn delete_request(&self, key: RequestKey) -> Result<bool, ServiceError> {
        let (column, value) = key.column_and_value()?;
        let sql = format!("DELETE FROM job_requests WHERE {column} = $1");
        let result = sqlx::query(&sql)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(exec_err("delete_request"))?;
        // The key may address several rows (all of one client's requests);
        // the bool reports whether anything was removed.
        Ok(result.rows_affected() > 0)
    }
}
