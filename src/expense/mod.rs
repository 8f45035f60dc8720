//! Expenses: the spend records each user owns.

mod core;
mod endpoints;
mod form;
mod query;

pub use core::{
    Expense, ExpenseId, NewExpense, create_expense, create_expense_table, delete_expense,
    update_expense,
};
pub use endpoints::{
    ExpenseState, create_expense_endpoint, delete_expense_endpoint, list_expenses,
    update_expense_endpoint,
};
pub use form::ExpenseForm;
pub use query::{
    ExpenseFilter, SortOrder, count_expenses, get_expense, get_expense_page, query_expenses,
};
