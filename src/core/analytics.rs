use crate::core::models::transaction::Transaction;
use crate::core::split::round_cents;
use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    pub total_amount: f64,
    pub count: usize,
    /// Currency of the last transaction seen in the category.
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub total_amount: f64,
    pub count: usize,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct WeekdaySummary {
    pub day: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpendingTrend {
    pub increasing_categories: Vec<String>,
    pub decreasing_categories: Vec<String>,
}

/// Total spent in one currency, with its display form.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CurrencyTotal {
    pub currency: String,
    pub amount: f64,
    pub formatted: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub transactions: Vec<Transaction>,
    /// The newest few transactions, most recent first.
    pub recent: Vec<Transaction>,
    pub totals: Vec<CurrencyTotal>,
    pub by_category: Vec<CategorySummary>,
    pub by_month: Vec<MonthlySummary>,
    pub by_weekday: Vec<WeekdaySummary>,
    pub trend: SpendingTrend,
}

pub fn spending_by_category(transactions: &[Transaction]) -> Vec<CategorySummary> {
    // Insertion order is kept so equal totals stay in first-seen order.
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, CategorySummary> = HashMap::new();

    for tx in transactions {
        let entry = totals.entry(tx.category.clone()).or_insert_with(|| {
            order.push(tx.category.clone());
            CategorySummary {
                category: tx.category.clone(),
                total_amount: 0.0,
                count: 0,
                currency: tx.currency.clone(),
            }
        });
        entry.total_amount += tx.amount;
        entry.count += 1;
        entry.currency = tx.currency.clone();
    }

    let mut summaries: Vec<CategorySummary> = order
        .into_iter()
        .filter_map(|c| totals.remove(&c))
        .map(|mut s| {
            s.total_amount = round_cents(s.total_amount);
            s
        })
        .collect();
    summaries.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
    summaries
}

pub fn month_key(date: DateTime<Utc>) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Totals per calendar month, in chronological order.
pub fn spending_by_month(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<String, MonthlySummary> = BTreeMap::new();
    for tx in transactions {
        let key = month_key(tx.date);
        let entry = months.entry(key.clone()).or_insert_with(|| MonthlySummary {
            month: key,
            total_amount: 0.0,
            count: 0,
            currency: tx.currency.clone(),
        });
        entry.total_amount += tx.amount;
        entry.count += 1;
        entry.currency = tx.currency.clone();
    }
    months
        .into_values()
        .map(|mut m| {
            m.total_amount = round_cents(m.total_amount);
            m
        })
        .collect()
}

pub fn spending_by_weekday(transactions: &[Transaction]) -> Vec<WeekdaySummary> {
    let mut order: Vec<String> = Vec::new();
    let mut days: HashMap<String, WeekdaySummary> = HashMap::new();
    for tx in transactions {
        let day = tx.date.format("%A").to_string();
        let entry = days.entry(day.clone()).or_insert_with(|| {
            order.push(day.clone());
            WeekdaySummary {
                day,
                amount: 0.0,
                currency: tx.currency.clone(),
            }
        });
        entry.amount += tx.amount;
        entry.currency = tx.currency.clone();
    }
    let mut summaries: Vec<WeekdaySummary> = order
        .into_iter()
        .filter_map(|d| days.remove(&d))
        .map(|mut s| {
            s.amount = round_cents(s.amount);
            s
        })
        .collect();
    summaries.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    summaries
}

pub fn recent_transactions(transactions: &[Transaction], count: usize) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(count);
    sorted
}

/// Compares the last `months` months against the `months` before that. A
/// category is increasing above 120% of its earlier total and decreasing below
/// 80%. Categories missing from either period are ignored.
pub fn spending_trend(transactions: &[Transaction], months: u32, now: DateTime<Utc>) -> SpendingTrend {
    let Some(recent_start) = now.checked_sub_months(Months::new(months)) else {
        return SpendingTrend::default();
    };
    let Some(older_start) = recent_start.checked_sub_months(Months::new(months)) else {
        return SpendingTrend::default();
    };

    let recent: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.date >= recent_start)
        .cloned()
        .collect();
    let older: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.date < recent_start && t.date >= older_start)
        .cloned()
        .collect();

    let older = spending_by_category(&older);
    let mut trend = SpendingTrend::default();
    for current in spending_by_category(&recent) {
        if let Some(previous) = older.iter().find(|o| o.category == current.category) {
            if current.total_amount > previous.total_amount * 1.2 {
                trend.increasing_categories.push(current.category);
            } else if current.total_amount < previous.total_amount * 0.8 {
                trend.decreasing_categories.push(current.category);
            }
        }
    }
    trend
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" | "CAD" | "AUD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// `1234.5, "USD"` becomes `$1,234.50`; unknown codes are prefixed as `CHF 1,234.50`.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let code = if currency.is_empty() { "USD" } else { currency };
    match currency_symbol(code) {
        Some(symbol) => format!("{}{}{}.{:02}", sign, symbol, grouped, cents % 100),
        None => format!("{}{} {}.{:02}", sign, code, grouped, cents % 100),
    }
}

const RECENT_COUNT: usize = 5;

/// Totals per currency code, in code order.
pub fn totals_by_currency(transactions: &[Transaction]) -> Vec<CurrencyTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.currency.as_str()).or_default() += tx.amount;
    }
    totals
        .into_iter()
        .map(|(currency, amount)| {
            let amount = round_cents(amount);
            CurrencyTotal {
                currency: currency.to_string(),
                amount,
                formatted: format_currency(amount, currency),
            }
        })
        .collect()
}

pub fn build_report(transactions: Vec<Transaction>, now: DateTime<Utc>) -> AnalyticsReport {
    AnalyticsReport {
        recent: recent_transactions(&transactions, RECENT_COUNT),
        totals: totals_by_currency(&transactions),
        by_category: spending_by_category(&transactions),
        by_month: spending_by_month(&transactions),
        by_weekday: spending_by_weekday(&transactions),
        trend: spending_trend(&transactions, 3, now),
        transactions,
    }
}
