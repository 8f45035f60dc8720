//! The dashboard's view of the caller's expenses, bucketed by day.

mod aggregation;
mod handlers;

pub use aggregation::{DayBucket, DayExpense, group_by_day};
pub use handlers::{DashboardParams, DashboardState, get_expenses_by_day};
