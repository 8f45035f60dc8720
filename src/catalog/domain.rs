//! Core catalog domain types shared by categories and payment methods.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The two admin-managed reference lists that expenses point into.
///
/// Categories and payment methods behave identically, so their storage,
/// endpoints and messages are written once and parameterised by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Category,
    PaymentMethod,
}

impl CatalogKind {
    /// The human readable name used at the start of messages.
    pub fn label(self) -> &'static str {
        match self {
            CatalogKind::Category => "Category",
            CatalogKind::PaymentMethod => "Payment method",
        }
    }

    /// The key a single entry is returned under in JSON responses.
    pub fn singular_key(self) -> &'static str {
        match self {
            CatalogKind::Category => "category",
            CatalogKind::PaymentMethod => "paymentMethod",
        }
    }

    /// The key a list of entries is returned under in JSON responses.
    pub fn plural_key(self) -> &'static str {
        match self {
            CatalogKind::Category => "categories",
            CatalogKind::PaymentMethod => "paymentMethods",
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            CatalogKind::Category => "category",
            CatalogKind::PaymentMethod => "payment_method",
        }
    }

    /// The expense column that references this kind of entry.
    pub(crate) fn expense_column(self) -> &'static str {
        match self {
            CatalogKind::Category => "category_id",
            CatalogKind::PaymentMethod => "payment_method_id",
        }
    }

    /// The kind whose counters are affected when expenses of this kind are removed.
    pub(crate) fn other(self) -> CatalogKind {
        match self {
            CatalogKind::Category => CatalogKind::PaymentMethod,
            CatalogKind::PaymentMethod => CatalogKind::Category,
        }
    }
}

/// A validated, non-empty catalog entry title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Title(String);

impl Title {
    /// Create a title for an entry of `kind`.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyTitle] if `title` is empty or only whitespace.
    pub fn new(title: &str, kind: CatalogKind) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyTitle(kind))
        } else {
            Ok(Self(title.to_string()))
        }
    }

    /// Create a title without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_string())
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category or payment method.
pub type CatalogId = i64;

/// A category or payment method.
///
/// `count` is the number of expenses that currently reference the entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: CatalogId,
    pub title: Title,
    pub description: Option<String>,
    pub count: i64,
}

/// The ID and title of a catalog entry, as embedded in expense responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryRef {
    pub id: CatalogId,
    pub title: String,
}

/// JSON body for creating a category or payment method.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogForm {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod title_tests {
    use crate::{
        Error,
        catalog::{CatalogKind, Title},
    };

    #[test]
    fn new_fails_on_empty_string() {
        let title = Title::new("", CatalogKind::Category);

        assert_eq!(title, Err(Error::EmptyTitle(CatalogKind::Category)));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let title = Title::new("\n\t \r", CatalogKind::PaymentMethod);

        assert_eq!(title, Err(Error::EmptyTitle(CatalogKind::PaymentMethod)));
    }

    #[test]
    fn new_trims_title() {
        let title = Title::new("  Food ", CatalogKind::Category).unwrap();

        assert_eq!(title.as_ref(), "Food");
    }
}
