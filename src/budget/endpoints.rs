//! Handlers for the caller's monthly budget and per-category budget overrides.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::AuthUser,
    budget::{
        delete_category_budget, get_category_budgets, get_used_categories,
        set_category_budget, sync_category_budgets,
    },
    catalog::CatalogId,
    user::{get_total_monthly_budget, set_total_monthly_budget},
};

/// The state needed by the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for setting the total monthly budget.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudgetForm {
    #[serde(default, deserialize_with = "crate::numbers::optional_number::deserialize")]
    pub total_monthly_budget: Option<f64>,
}

/// The request body for setting or removing a category budget.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudgetForm {
    #[serde(default, deserialize_with = "crate::numbers::optional_id::deserialize")]
    pub category_id: Option<CatalogId>,
    #[serde(default, deserialize_with = "crate::numbers::optional_number::deserialize")]
    pub limit: Option<f64>,
}

/// A route handler for the caller's total monthly budget.
pub async fn get_monthly_budget(
    State(state): State<BudgetState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, Error> {
    let total_monthly_budget = {
        let connection = lock_connection(&state.db_connection)?;
        get_total_monthly_budget(user.id, &connection)?
    };

    Ok(Json(json!({
        "success": true,
        "totalMonthlyBudget": total_monthly_budget,
    })))
}

/// A route handler for replacing the caller's total monthly budget.
///
/// The budget must be a non-negative number.
pub async fn set_monthly_budget(
    State(state): State<BudgetState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(form), _): WithRejection<Json<MonthlyBudgetForm>, Error>,
) -> Result<Json<Value>, Error> {
    let total_monthly_budget = form
        .total_monthly_budget
        .filter(|budget| budget.is_finite() && *budget >= 0.0)
        .ok_or(Error::InvalidMonthlyBudget)?;

    {
        let connection = lock_connection(&state.db_connection)?;
        set_total_monthly_budget(user.id, total_monthly_budget, &connection)?;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Monthly budget updated successfully.",
        "totalMonthlyBudget": total_monthly_budget,
    })))
}

/// A route handler for setting the caller's limit on one category.
pub async fn set_category_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(form), _): WithRejection<Json<CategoryBudgetForm>, Error>,
) -> Result<Json<Value>, Error> {
    let (Some(category_id), Some(limit)) = (form.category_id, form.limit) else {
        return Err(Error::InvalidCategoryBudget);
    };

    if !limit.is_finite() || limit < 0.0 {
        return Err(Error::InvalidCategoryBudget);
    }

    let category_budgets = {
        let connection = lock_connection(&state.db_connection)?;
        let transaction = connection.unchecked_transaction()?;
        set_category_budget(user.id, category_id, limit, &transaction)?;
        let category_budgets = get_category_budgets(user.id, &transaction)?;
        transaction.commit()?;
        category_budgets
    };

    Ok(Json(json!({
        "success": true,
        "message": "Category budget updated successfully.",
        "categoryBudgets": category_budgets,
    })))
}

/// A route handler for removing the caller's limit on one category.
pub async fn delete_category_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(form), _): WithRejection<Json<CategoryBudgetForm>, Error>,
) -> Result<Json<Value>, Error> {
    let category_id = form.category_id.ok_or(Error::MissingCategoryId)?;

    let category_budgets = {
        let connection = lock_connection(&state.db_connection)?;
        delete_category_budget(user.id, category_id, &connection)?;
        get_category_budgets(user.id, &connection)?
    };

    Ok(Json(json!({
        "success": true,
        "message": "Category budget removed successfully.",
        "categoryBudgets": category_budgets,
    })))
}

/// A route handler for the categories used in the caller's expenses.
pub async fn list_used_categories(
    State(state): State<BudgetState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, Error> {
    let categories = {
        let connection = lock_connection(&state.db_connection)?;
        get_used_categories(user.id, &connection)?
    };

    Ok(Json(json!({
        "success": true,
        "categories": categories,
    })))
}

/// A route handler that adds an untracked budget for every category the
/// caller spends in but has not budgeted yet.
pub async fn sync_category_budgets_endpoint(
    State(state): State<BudgetState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, Error> {
    let (added, category_budgets) = {
        let connection = lock_connection(&state.db_connection)?;
        let transaction = connection.unchecked_transaction()?;
        let added = sync_category_budgets(user.id, &transaction)?;
        let category_budgets = get_category_budgets(user.id, &transaction)?;
        transaction.commit()?;
        (added, category_budgets)
    };

    if added > 0 {
        tracing::debug!("added {added} untracked category budgets for user {}", user.id);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Category budgets synced.",
        "added": added,
        "categoryBudgets": category_budgets,
    })))
}
