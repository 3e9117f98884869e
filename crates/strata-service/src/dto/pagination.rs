//! Pagination query parameters.

use serde::{Deserialize, Deserializer};
use strata_core::PageRequest;
use utoipa::IntoParams;

/// Query parameters for listing users.
///
/// Values that are missing or not integers fall back to the defaults, the
/// same as out-of-range values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// 1-based page number. Defaults to 1.
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    /// Page size, 1 to 100. Defaults to 10.
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
}

impl PaginationQuery {
    #[must_use]
    pub const fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

impl From<PaginationQuery> for PageRequest {
    fn from(query: PaginationQuery) -> Self {
        Self::normalized(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(i64::from(Self::DEFAULT_SIZE)),
        )
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}
