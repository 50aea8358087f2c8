//! List and analytics projections over the transaction list.

use crate::core::models::transaction::Transaction;
use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Settled,
    Pending,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Day,
    Week,
    Month,
}

impl TimePeriod {
    /// Earliest date kept by the window, relative to `now`. `Day` starts at
    /// midnight in `offset`.
    pub fn window_start(self, now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
        match self {
            TimePeriod::Day => now
                .with_timezone(&offset)
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .and_then(|midnight| midnight.and_local_timezone(offset).single())
                .map(|midnight| midnight.with_timezone(&Utc))
                .unwrap_or(now),
            TimePeriod::Week => now - Duration::days(7),
            TimePeriod::Month => now - Duration::days(30),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort: SortOption,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub period: Option<TimePeriod>,
    /// Caller's offset from UTC in minutes, used for the start of "today".
    /// Unset or out of range means UTC.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default)]
    pub sort: SortOption,
}

fn search_matches(tx: &Transaction, search: Option<&str>) -> bool {
    match search {
        Some(q) if !q.is_empty() => tx.matches_search(q),
        _ => true,
    }
}

fn category_matches(tx: &Transaction, category: Option<&str>) -> bool {
    category.is_none_or(|c| tx.category == c)
}

fn compare(a: &Transaction, b: &Transaction, sort: SortOption) -> Ordering {
    match sort {
        SortOption::DateDesc => b.date.cmp(&a.date),
        SortOption::DateAsc => a.date.cmp(&b.date),
        SortOption::AmountDesc => b.amount.total_cmp(&a.amount),
        SortOption::AmountAsc => a.amount.total_cmp(&b.amount),
    }
}

pub fn sort_transactions(transactions: &mut [Transaction], sort: SortOption) {
    transactions.sort_by(|a, b| compare(a, b, sort));
}

/// Search, category and status filters combined with AND, then sorted.
pub fn list_view(transactions: &[Transaction], filter: &ListFilter) -> Vec<Transaction> {
    let mut view: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| search_matches(tx, filter.search.as_deref()))
        .filter(|tx| category_matches(tx, filter.category.as_deref()))
        .filter(|tx| match filter.status {
            StatusFilter::All => true,
            StatusFilter::Settled => tx.settled,
            StatusFilter::Pending => !tx.settled,
        })
        .cloned()
        .collect();
    sort_transactions(&mut view, filter.sort);
    view
}

/// Like [`list_view`] but keeps settled transactions, and adds currency and
/// time-window filters.
pub fn analytics_view(
    transactions: &[Transaction],
    filter: &AnalyticsFilter,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let offset = filter
        .utc_offset_minutes
        .and_then(|minutes| minutes.checked_mul(60))
        .and_then(FixedOffset::east_opt)
        .unwrap_or(Utc.fix());
    let window_start = filter.period.map(|p| p.window_start(now, offset));
    let mut view: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| search_matches(tx, filter.search.as_deref()))
        .filter(|tx| category_matches(tx, filter.category.as_deref()))
        .filter(|tx| filter.currency.as_deref().is_none_or(|c| tx.currency == c))
        .filter(|tx| window_start.is_none_or(|start| tx.date >= start))
        .cloned()
        .collect();
    sort_transactions(&mut view, filter.sort);
    view
}
