use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{exec_err, fetch_err, insert_err, query_list, write_err};
use crate::database::filter::{ListQuery, CLIENT_FIELDS, CLIENT_UNIQUE_FIELDS, SUMMARY_FIELDS};
use crate::database::models::{
    Client, ClientUpdate, NewClient, NewSummary, Summary, SummaryUpdate,
};
use crate::database::store::{ClientDirectory, DeleteOptions};
use crate::error::ServiceError;

const CLIENT_COLUMNS: &str = "id, role, first_name, last_name, email, password_hash, \
     refresh_token_hash, created_at, updated_at, deleted_at";
const SUMMARY_COLUMNS: &str = "id, owner_id, skills, bio, languages";

/// Directory backed by the `clients` and `summaries` tables.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientDirectory for PgDirectory {
    async fn ping(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(exec_err("ping"))?;
        Ok(())
    }

    async fn create_client(&self, new: NewClient) -> Result<Client, ServiceError> {
        let sql = format!(
            "INSERT INTO clients \
                 (id, role, first_name, last_name, email, password_hash, \
                  refresh_token_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now()) \
             RETURNING {CLIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&sql)
            .bind(new.id)
            .bind(new.role)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.refresh_token_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_err("create_client", "email already registered"))
    }

    async fn client_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Client, ServiceError> {
        let mut sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        if !include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }
        sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(fetch_err("client_by_id", "client not found"))
    }

    async fn client_by_email(&self, email: &str) -> Result<Client, ServiceError> {
        // Deliberately no deleted_at guard: login inspects the marker itself
        // to report deleted accounts the same way as unknown ones.
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE email = $1");
        sqlx::query_as::<_, Client>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(fetch_err("client_by_email", "client not found"))
    }

    async fn list_clients(&self, query: &ListQuery) -> Result<Vec<Client>, ServiceError> {
        let select = format!("SELECT {CLIENT_COLUMNS} FROM clients");
        query_list(
            &self.pool,
            &select,
            "created_at, id",
            CLIENT_FIELDS,
            query,
            "list_clients",
        )
        .await
    }

    async fn update_client(&self, id: Uuid, update: ClientUpdate) -> Result<Client, ServiceError> {
        let sql = if update.password_hash.is_some() {
            format!(
                "UPDATE clients SET first_name = $2, last_name = $3, email = $4, \
                     password_hash = $5, updated_at = now() \
                 WHERE id = $1 RETURNING {CLIENT_COLUMNS}"
            )
        } else {
            format!(
                "UPDATE clients SET first_name = $2, last_name = $3, email = $4, \
                     updated_at = now() \
                 WHERE id = $1 RETURNING {CLIENT_COLUMNS}"
            )
        };
        let stmt = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.email);
        let stmt = match &update.password_hash {
            Some(hash) => stmt.bind(hash),
            None => stmt,
        };
        stmt.fetch_one(&self.pool)
            .await
            .map_err(write_err(
                "update_client",
                "client not found",
                "email already registered",
            ))
    }

    async fn delete_client(&self, id: Uuid, opts: DeleteOptions) -> Result<bool, ServiceError> {
        let result = if opts.is_physical() {
            sqlx::query("DELETE FROM clients WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
        } else {
            sqlx::query("UPDATE clients SET deleted_at = now() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
        }
        .map_err(exec_err("delete_client"))?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("client not found"));
        }
        Ok(true)
    }

    async fn is_field_taken(&self, field: &str, value: &str) -> Result<bool, ServiceError> {
        if !CLIENT_UNIQUE_FIELDS.contains(&field) {
            return Err(ServiceError::validation(format!(
                "unknown unique field: {field}"
            )));
        }
        // The text cast keeps one statement shape for uuid and text columns.
        let sql = format!("SELECT count(1) FROM clients WHERE {field}::text = $1");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(exec_err("is_field_taken"))?;
        Ok(count != 0)
    }

    async fn store_refresh_token(
        &self,
        id: Uuid,
        token_hash: Option<String>,
    ) -> Result<(), ServiceError> {
        let result =
            sqlx::query("UPDATE clients SET refresh_token_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(&token_hash)
                .execute(&self.pool)
                .await
                .map_err(exec_err("store_refresh_token"))?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("client not found"));
        }
        Ok(())
    }

    async fn create_summary(&self, new: NewSummary) -> Result<Summary, ServiceError> {
        let sql = format!(
            "INSERT INTO summaries (owner_id, skills, bio, languages) \
             VALUES ($1, $2, $3, $4) RETURNING {SUMMARY_COLUMNS}"
        );
        sqlx::query_as::<_, Summary>(&sql)
            .bind(new.owner_id)
            .bind(&new.skills)
            .bind(&new.bio)
            .bind(&new.languages)
            .fetch_one(&self.pool)
            .await
            .map_err(exec_err("create_summary"))
    }

    async fn summary_by_id(&self, id: i64) -> Result<Summary, ServiceError> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM summaries WHERE id = $1");
        sqlx::query_as::<_, Summary>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(fetch_err("summary_by_id", "summary not found"))
    }

    async fn summary_for_owner(
        &self,
        owner_id: Uuid,
        id: i64,
    ) -> Result<Option<Summary>, ServiceError> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM summaries WHERE owner_id = $1 AND id = $2");
        sqlx::query_as::<_, Summary>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(exec_err("summary_for_owner"))
    }

    async fn list_summaries(&self, query: &ListQuery) -> Result<Vec<Summary>, ServiceError> {
        let select = format!("SELECT {SUMMARY_COLUMNS} FROM summaries");
        query_list(
            &self.pool,
            &select,
            "id",
            SUMMARY_FIELDS,
            query,
            "list_summaries",
        )
        .await
    }

    async fn update_summary(
        &self,
        owner_id: Uuid,
        id: i64,
        update: SummaryUpdate,
    ) -> Result<Summary, ServiceError> {
        let sql = format!(
            "UPDATE summaries SET skills = $3, bio = $4, languages = $5 \
             WHERE owner_id = $1 AND id = $2 RETURNING {SUMMARY_COLUMNS}"
        );
        sqlx::query_as::<_, Summary>(&sql)
            .bind(owner_id)
            .bind(id)
            .bind(&update.skills)
            .bind(&update.bio)
            .bind(&update.languages)
            .fetch_one(&self.pool)
            .await
            .map_err(fetch_err("update_summary", "summary not found"))
    }

    async fn delete_summary(&self, owner_id: Uuid, id: i64) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM summaries WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(exec_err("delete_summary"))?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("summary not found"));
        }
        Ok(true)
    }
}
