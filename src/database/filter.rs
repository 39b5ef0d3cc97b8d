// List pagination and one-field filtering shared by both storage backends
use uuid::Uuid;

use crate::error::ServiceError;

/// Page/limit plus an optional single-field filter, the shape every list
/// operation accepts.
///
/// `limit == 0` disables pagination entirely and returns the full result
/// set; otherwise rows are skipped by `limit * (page - 1)`.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub field: Option<String>,
    pub value: Option<String>,
}

impl ListQuery {
    pub fn new(page: i64, limit: i64) -> Self {
        ListQuery {
            page,
            limit,
            field: None,
            value: None,
        }
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self.value = Some(value.into());
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit <= 0
    }

    /// Pages below 1 clamp to the first page, so the offset is always
    /// non-negative.
    pub fn offset(&self) -> i64 {
        self.limit * (self.page.max(1) - 1)
    }

    /// Rejects inputs the pagination arithmetic is not defined for.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.limit < 0 {
            return Err(ServiceError::validation("limit must not be negative"));
        }
        Ok(())
    }
}

/// How a whitelisted filter field matches: identity and key columns match
/// exactly, text columns match case-insensitively on the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    ExactUuid,
    ExactInt,
    Prefix,
}

pub const CLIENT_FIELDS: &[(&str, FieldKind)] = &[
    ("id", FieldKind::ExactUuid),
    ("email", FieldKind::Prefix),
    ("first_name", FieldKind::Prefix),
    ("last_name", FieldKind::Prefix),
    ("role", FieldKind::Prefix),
];

pub const SUMMARY_FIELDS: &[(&str, FieldKind)] = &[
    ("id", FieldKind::ExactInt),
    ("owner_id", FieldKind::ExactUuid),
    ("skills", FieldKind::Prefix),
    ("bio", FieldKind::Prefix),
    ("languages", FieldKind::Prefix),
];

pub const JOB_FIELDS: &[(&str, FieldKind)] = &[
    ("id", FieldKind::ExactUuid),
    ("owner_id", FieldKind::ExactUuid),
    ("title", FieldKind::Prefix),
    ("description", FieldKind::Prefix),
];

pub const REQUEST_FIELDS: &[(&str, FieldKind)] = &[
    ("job_id", FieldKind::ExactUuid),
    ("client_id", FieldKind::ExactUuid),
    ("status_resp", FieldKind::Prefix),
    ("description_resp", FieldKind::Prefix),
];

/// Columns `is_field_taken` may probe.
pub const CLIENT_UNIQUE_FIELDS: &[&str] = &["id", "email"];

/// A resolved, typed filter ready for either backend. Column names only
/// ever come from the whitelists above, never from caller input.
#[derive(Debug, Clone)]
pub enum FieldMatch {
    Uuid { column: &'static str, value: Uuid },
    Int { column: &'static str, value: i64 },
    Prefix { column: &'static str, value: String },
}

/// Resolves the query's optional filter against an entity's whitelist.
/// Unknown fields and unparseable key values are validation failures.
pub fn resolve_filter(
    fields: &'static [(&str, FieldKind)],
    query: &ListQuery,
) -> Result<Option<FieldMatch>, ServiceError> {
    let field = match query.field.as_deref() {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(None),
    };
    let value = query.value.as_deref().unwrap_or("");

    let (column, kind) = fields
        .iter()
        .find(|(name, _)| *name == field)
        .copied()
        .ok_or_else(|| ServiceError::validation(format!("unknown filter field: {field}")))?;

    let resolved = match kind {
        FieldKind::ExactUuid => FieldMatch::Uuid {
            column,
            value: Uuid::parse_str(value).map_err(|_| {
                ServiceError::validation(format!("filter value for '{column}' must be a uuid"))
            })?,
        },
        FieldKind::ExactInt => FieldMatch::Int {
            column,
            value: value.parse().map_err(|_| {
                ServiceError::validation(format!("filter value for '{column}' must be an integer"))
            })?,
        },
        FieldKind::Prefix => FieldMatch::Prefix {
            column,
            value: value.to_string(),
        },
    };

    Ok(Some(resolved))
}

/// Escapes LIKE metacharacters and appends the trailing wildcard, so the
/// filter value is always matched literally as a prefix.
pub(crate) fn like_prefix(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 1);
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive starts-with, the in-memory twin of `ILIKE 'value%'`.
pub(crate) fn starts_with_ci(haystack: &str, prefix: &str) -> bool {
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_limit_times_page_minus_one() {
        assert_eq!(ListQuery::new(1, 10).offset(), 0);
        assert_eq!(ListQuery::new(3, 10).offset(), 20);
        assert_eq!(ListQuery::new(2, 25).offset(), 25);
    }

    #[test]
    fn pages_below_one_clamp_to_first_page() {
        assert_eq!(ListQuery::new(0, 10).offset(), 0);
        assert_eq!(ListQuery::new(-4, 10).offset(), 0);
    }

    #[test]
    fn zero_limit_means_unbounded() {
        let query = ListQuery::new(5, 0);
        assert!(query.is_unbounded());
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn negative_limit_is_rejected() {
        assert!(ListQuery::new(1, -1).validate().is_err());
        assert!(ListQuery::new(1, 0).validate().is_ok());
    }

    #[test]
    fn unknown_filter_field_is_rejected() {
        let query = ListQuery::new(1, 10).with_filter("password_hash", "x");
        let err = resolve_filter(CLIENT_FIELDS, &query).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn owner_field_resolves_to_exact_uuid_match() {
        let owner = Uuid::new_v4();
        let query = ListQuery::new(1, 10).with_filter("owner_id", owner.to_string());
        match resolve_filter(SUMMARY_FIELDS, &query).unwrap() {
            Some(FieldMatch::Uuid { column, value }) => {
                assert_eq!(column, "owner_id");
                assert_eq!(value, owner);
            }
            other => panic!("expected uuid match, got {other:?}"),
        }
    }

    #[test]
    fn malformed_uuid_filter_value_is_rejected() {
        let query = ListQuery::new(1, 10).with_filter("owner_id", "not-a-uuid");
        assert!(resolve_filter(SUMMARY_FIELDS, &query).is_err());
    }

    #[test]
    fn text_field_resolves_to_prefix_match() {
        let query = ListQuery::new(1, 10).with_filter("title", "rust dev");
        match resolve_filter(JOB_FIELDS, &query).unwrap() {
            Some(FieldMatch::Prefix { column, value }) => {
                assert_eq!(column, "title");
                assert_eq!(value, "rust dev");
            }
            other => panic!("expected prefix match, got {other:?}"),
        }
    }

    #[test]
    fn empty_field_means_no_filter() {
        let mut query = ListQuery::new(1, 10);
        query.field = Some(String::new());
        query.value = Some("x".to_string());
        assert!(resolve_filter(JOB_FIELDS, &query).unwrap().is_none());
    }

    #[test]
    fn like_prefix_escapes_metacharacters() {
        assert_eq!(like_prefix("abc"), "abc%");
        assert_eq!(like_prefix("50%_off"), "50\\%\\_off%");
        assert_eq!(like_prefix("a\\b"), "a\\\\b%");
    }

    #[test]
    fn starts_with_ci_ignores_case() {
        assert!(starts_with_ci("Rust Developer", "rust"));
        assert!(starts_with_ci("rust", "RU"));
        assert!(!starts_with_ci("developer", "rust"));
    }
}
