//! The JSON body accepted when creating or updating an expense.

use serde::{Deserialize, Serialize};

use crate::{Error, catalog::CatalogId, dates::parse_date, expense::NewExpense};

/// Raw expense fields as sent by the client.
///
/// Every field is optional at this stage so that a missing field produces
/// the same validation message as a blank one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseForm {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::numbers::optional_number::deserialize")]
    pub amount: Option<f64>,
    /// Either "YYYY-MM-DD" or an RFC 3339 timestamp.
    pub date: Option<String>,
    pub note: Option<String>,
    #[serde(default, deserialize_with = "crate::numbers::optional_id::deserialize")]
    pub category: Option<CatalogId>,
    #[serde(default, deserialize_with = "crate::numbers::optional_id::deserialize")]
    pub payment_method: Option<CatalogId>,
}

impl ExpenseForm {
    /// Check the form and convert it into a [NewExpense].
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::IncompleteExpense] if a required field is missing or the title is blank,
    /// - [Error::InvalidAmount] if the amount is not a positive number,
    /// - [Error::InvalidDate] if the date cannot be parsed.
    pub fn validate(self) -> Result<NewExpense, Error> {
        let (Some(title), Some(amount), Some(raw_date), Some(category_id), Some(payment_method_id)) = (
            self.title,
            self.amount,
            self.date,
            self.category,
            self.payment_method,
        ) else {
            return Err(Error::IncompleteExpense);
        };

        let title = title.trim();
        if title.is_empty() {
            return Err(Error::IncompleteExpense);
        }

        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        let date = parse_date(&raw_date).ok_or(Error::InvalidDate)?;

        let note = self
            .note
            .map(|note| note.trim().to_owned())
            .filter(|note| !note.is_empty());

        Ok(NewExpense {
            title: title.to_owned(),
            amount,
            date,
            note,
            category_id,
            payment_method_id,
        })
    }
}
