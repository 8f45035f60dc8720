//! Case-insensitive keyword matching and relevance scoring for expenses.

use crate::expense::Expense;

/// The score given to a field that equals the query, ignoring case.
pub const EXACT_MATCH_SCORE: f64 = 100.0;

/// The text fields of an expense that a keyword is matched against.
///
/// Empty fields are skipped.
fn searchable_fields(expense: &Expense) -> impl Iterator<Item = &str> {
    [
        Some(expense.title.as_str()),
        expense.note.as_deref(),
        Some(expense.category.title.as_str()),
        Some(expense.payment_method.title.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|field| !field.is_empty())
}

/// Whether `keyword` appears in the title, note, category or payment method
/// of `expense`, ignoring case.
///
/// The keyword is matched literally.
pub fn matches_keyword(expense: &Expense, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();

    searchable_fields(expense).any(|field| field.to_lowercase().contains(&keyword))
}

/// Score how well `query` matches `field` on a scale from 0 to 100.
///
/// An exact match, ignoring case, scores 100. Otherwise a field that
/// contains the query scores the share of the field the query covers, so
/// shorter fields rank higher. A field without the query scores 0.
pub fn match_score(field: &str, query: &str) -> f64 {
    if field.is_empty() || query.is_empty() {
        return 0.0;
    }

    let field = field.to_lowercase();
    let query = query.to_lowercase();

    if field == query {
        EXACT_MATCH_SCORE
    } else if field.contains(&query) {
        query.chars().count() as f64 / field.chars().count() as f64 * 100.0
    } else {
        0.0
    }
}

/// The best score of `query` across the searchable fields of `expense`.
pub fn relevance(expense: &Expense, query: &str) -> f64 {
    searchable_fields(expense)
        .map(|field| match_score(field, query))
        .fold(0.0, f64::max)
}

/// Sort `expenses` by their relevance to `query`, most relevant first.
///
/// Expenses with equal scores keep their relative order.
pub fn rank_by_relevance(expenses: Vec<Expense>, query: &str) -> Vec<Expense> {
    let mut scored: Vec<(f64, Expense)> = expenses
        .into_iter()
        .map(|expense| (relevance(&expense, query), expense))
        .collect();

    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    scored.into_iter().map(|(_, expense)| expense).collect()
}
