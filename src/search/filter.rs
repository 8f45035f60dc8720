//! Builds an [ExpenseFilter] from the raw filter query parameters.

use serde::Deserialize;

use crate::{
    Error,
    catalog::CatalogId,
    dates::parse_optional_date,
    expense::ExpenseFilter,
    pagination::PageQuery,
    user::UserID,
};

/// The raw query parameters of the filter endpoint.
///
/// Every value is optional and blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub search_query: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl FilterParams {
    /// Build the structured part of the filter for the expenses of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::InvalidStartDate] or [Error::InvalidEndDate] for a malformed date,
    /// - [Error::InvalidRequest] if the category or payment method is not an ID.
    pub fn to_filter(&self, user_id: UserID) -> Result<ExpenseFilter, Error> {
        Ok(ExpenseFilter {
            user_id,
            start_date: parse_optional_date(self.start_date.as_deref(), Error::InvalidStartDate)?,
            end_date: parse_optional_date(self.end_date.as_deref(), Error::InvalidEndDate)?,
            category_id: parse_optional_id(self.category.as_deref(), "category")?,
            payment_method_id: parse_optional_id(self.payment_method.as_deref(), "paymentMethod")?,
        })
    }

    /// The keyword to filter by, if one was given.
    pub fn keyword(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .filter(|query| !query.trim().is_empty())
    }

    /// The page and limit parameters.
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.clone(),
            limit: self.limit.clone(),
        }
    }
}

fn parse_optional_id(raw: Option<&str>, name: &str) -> Result<Option<CatalogId>, Error> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidRequest(format!("Invalid {name} ID."))),
    }
}
