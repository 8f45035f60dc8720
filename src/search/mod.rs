//! Keyword search and structured filtering over the caller's expenses.

mod endpoints;
mod filter;
mod keyword;

pub use endpoints::{SearchParams, SearchState, filter_expenses, search_expenses};
pub use filter::FilterParams;
pub use keyword::{EXACT_MATCH_SCORE, match_score, matches_keyword, rank_by_relevance, relevance};
