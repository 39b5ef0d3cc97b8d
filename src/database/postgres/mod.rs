// Postgres-backed implementations of the directory and ledger contracts
mod directory;
mod ledger;

pub use directory::PgDirectory;
pub use ledger::PgLedger;

use sqlx::PgPool;

use crate::database::filter::{self, FieldKind, FieldMatch, ListQuery};
use crate::error::ServiceError;

/// Maps a single-row fetch failure: a missing row is `NotFound`, anything
/// else is a logged dependency failure.
pub(crate) fn fetch_err(
    operation: &'static str,
    missing: &'static str,
) -> impl FnOnce(sqlx::Error) -> ServiceError {
    move |err| match err {
        sqlx::Error::RowNotFound => ServiceError::not_found(missing),
        err => ServiceError::dependency(operation, err),
    }
}

/// Maps an insert failure: a unique-key violation is `Conflict`.
pub(crate) fn insert_err(
    operation: &'static str,
    conflict: &'static str,
) -> impl FnOnce(sqlx::Error) -> ServiceError {
    move |err| {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ServiceError::conflict(conflict);
            }
        }
        ServiceError::dependency(operation, err)
    }
}

/// Maps an update-returning failure: missing row or unique-key violation.
pub(crate) fn write_err(
    operation: &'static str,
    missing: &'static str,
    conflict: &'static str,
) -> impl FnOnce(sqlx::Error) -> ServiceError {
    move |err| match err {
        sqlx::Error::RowNotFound => ServiceError::not_found(missing),
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            ServiceError::conflict(conflict)
        }
        err => ServiceError::dependency(operation, err),
    }
}

pub(crate) fn exec_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> ServiceError {
    move |err| ServiceError::dependency(operation, err)
}

/// Shared list-query runner: resolves the whitelisted filter, assembles
/// WHERE/ORDER BY/LIMIT/OFFSET and binds the single filter value. Column
/// names come exclusively from the static whitelists.
pub(crate) async fn query_list<T>(
    pool: &PgPool,
    select: &str,
    order_by: &str,
    fields: &'static [(&'static str, FieldKind)],
    query: &ListQuery,
    operation: &'static str,
) -> Result<Vec<T>, ServiceError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    query.validate()?;
    let matcher = filter::resolve_filter(fields, query)?;

    let mut sql = select.to_string();
    match &matcher {
        Some(FieldMatch::Uuid { column, .. }) | Some(FieldMatch::Int { column, .. }) => {
            sql.push_str(&format!(" WHERE {column} = $1"));
        }
        Some(FieldMatch::Prefix { column, .. }) => {
            sql.push_str(&format!(" WHERE {column} ILIKE $1"));
        }
        None => {}
    }
    sql.push_str(&format!(" ORDER BY {order_by}"));
    if !query.is_unbounded() {
        sql.push_str(&format!(" LIMIT {} OFFSET {}", query.limit, query.offset()));
    }

    let stmt = sqlx::query_as::<_, T>(&sql);
    let stmt = match matcher {
        Some(FieldMatch::Uuid { value, .. }) => stmt.bind(value),
        Some(FieldMatch::Int { value, .. }) => stmt.bind(value),
        Some(FieldMatch::Prefix { value, .. }) => stmt.bind(filter::like_prefix(&value)),
        None => stmt,
    };

    stmt.fetch_all(pool).await.map_err(exec_err(operation))
}
