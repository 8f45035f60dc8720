//! This modules defines the common functionality for paging data.

use serde::{Deserialize, Serialize};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum expenses per page when not specified in a request.
    pub default_page_size: u64,
    /// The page size used by the filter endpoint when not specified.
    pub filter_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            filter_page_size: 9,
        }
    }
}

/// The raw `page` and `limit` query parameters.
///
/// Kept as strings so that malformed values fall back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    /// Resolve the query into a page request, using `default_limit` when no limit is given.
    pub fn resolve(&self, config: &PaginationConfig, default_limit: u64) -> PageRequest {
        PageRequest::parse(
            self.page.as_deref(),
            self.limit.as_deref(),
            config.default_page,
            default_limit,
        )
    }
}

/// The page a client asked for.
///
/// Both `page` and `limit` are always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Parse the raw `page` and `limit` query parameters.
    ///
    /// Parsing is lenient: a missing, unparsable or zero value falls back to
    /// the default, and a negative value is raised to one.
    pub fn parse(
        raw_page: Option<&str>,
        raw_limit: Option<&str>,
        default_page: u64,
        default_limit: u64,
    ) -> Self {
        Self {
            page: parse_positive_or(raw_page, default_page),
            limit: parse_positive_or(raw_limit, default_limit),
        }
    }

    /// The number of items that come before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive_or(raw: Option<&str>, default: u64) -> u64 {
    match raw.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        None | Some(0) => default.max(1),
        Some(value) if value < 0 => 1,
        Some(value) => value.unsigned_abs(),
    }
}

/// The pagination metadata sent alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Describe `request` as a page of a result set with `total` items.
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(request.limit),
            has_next_page: request.page.saturating_mul(request.limit) < total,
            has_prev_page: request.page > 1,
        }
    }
}

/// Take the page described by `request` out of the full list of `items`.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> (Vec<T>, Pagination) {
    let pagination = Pagination::new(items.len() as u64, request);
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(request.limit).unwrap_or(usize::MAX);

    let page = items.into_iter().skip(offset).take(limit).collect();

    (page, pagination)
}
