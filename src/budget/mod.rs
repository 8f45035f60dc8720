//! The caller's total monthly budget and per-category budget overrides.

mod db;
mod endpoints;

pub use db::{
    CategoryBudget, UNTRACKED_LIMIT, create_category_budget_table, delete_category_budget,
    get_category_budgets, get_used_categories, set_category_budget, sync_category_budgets,
};
pub use endpoints::{
    BudgetState, CategoryBudgetForm, MonthlyBudgetForm, delete_category_budget_endpoint,
    get_monthly_budget, list_used_categories, set_category_budget_endpoint, set_monthly_budget,
    sync_category_budgets_endpoint,
};
