//! Categories and payment methods: shared, reference-counted tags for expenses.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_catalog_tables, create_entry, delete_entry_with_expenses, entry_exists,
    get_all_entries, get_entry,
};
pub(crate) use db::adjust_count;
pub use domain::{CatalogEntry, CatalogForm, CatalogId, CatalogKind, EntryRef, Title};
pub use endpoints::{
    CatalogState, create_category, create_payment_method, delete_category,
    delete_payment_method, list_categories, list_payment_methods,
};
