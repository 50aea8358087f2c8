use crate::core::analytics::{
    build_report, format_currency, month_key, recent_transactions, spending_by_category, spending_by_month,
    spending_by_weekday, spending_trend,
};
use crate::core::models::transaction::Transaction;
use crate::tests::{at, share, stored};

fn expense(id: &str, category: &str, amount: f64, date: chrono::DateTime<chrono::Utc>) -> Transaction {
    let mut tx = stored(id, id, amount, "me", vec![share("me", amount, true)]);
    tx.category = category.to_string();
    tx.date = date;
    tx
}

#[test]
fn test_category_totals_sorted_by_total() {
    let transactions = vec![
        expense("a", "Food", 20.0, at(2025, 4, 1)),
        expense("b", "Transport", 50.0, at(2025, 4, 2)),
        expense("c", "Food", 45.5, at(2025, 4, 3)),
        expense("d", "Fun", 10.0, at(2025, 4, 4)),
    ];
    let categories = spending_by_category(&transactions);
    let names: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["Food", "Transport", "Fun"]);
    assert_eq!(categories[0].total_amount, 65.5);
    assert_eq!(categories[0].count, 2);
    assert_eq!(categories[0].currency, "USD");
}

#[test]
fn test_monthly_totals_are_chronological() {
    let transactions = vec![
        expense("a", "Food", 10.0, at(2025, 4, 1)),
        expense("b", "Food", 20.0, at(2024, 12, 5)),
        expense("c", "Food", 5.0, at(2025, 4, 20)),
        expense("d", "Food", 7.0, at(2025, 1, 9)),
    ];
    let months = spending_by_month(&transactions);
    let keys: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(keys, vec!["2024-12", "2025-01", "2025-04"]);
    assert_eq!(months[2].total_amount, 15.0);
    assert_eq!(months[2].count, 2);
    assert_eq!(month_key(at(2025, 1, 9)), "2025-01");
}

#[test]
fn test_weekday_totals() {
    // 2025-04-07 is a Monday, 2025-04-08 a Tuesday.
    let transactions = vec![
        expense("a", "Food", 10.0, at(2025, 4, 7)),
        expense("b", "Food", 30.0, at(2025, 4, 8)),
        expense("c", "Food", 5.0, at(2025, 4, 14)),
    ];
    let days = spending_by_weekday(&transactions);
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].day, "Tuesday");
    assert_eq!(days[0].amount, 30.0);
    assert_eq!(days[1].day, "Monday");
    assert_eq!(days[1].amount, 15.0);
}

#[test]
fn test_recent_transactions_newest_first() {
    let transactions = vec![
        expense("old", "Food", 1.0, at(2025, 1, 1)),
        expense("new", "Food", 1.0, at(2025, 4, 1)),
        expense("mid", "Food", 1.0, at(2025, 2, 1)),
    ];
    let recent = recent_transactions(&transactions, 2);
    let ids: Vec<&str> = recent.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid"]);
}

#[test]
fn test_spending_trend_thresholds() {
    let now = at(2025, 6, 30);
    let transactions = vec![
        // Earlier period: January to March.
        expense("f1", "Food", 100.0, at(2025, 2, 10)),
        expense("t1", "Transport", 100.0, at(2025, 2, 10)),
        expense("h1", "Housing", 100.0, at(2025, 2, 10)),
        // Recent period: April to June.
        expense("f2", "Food", 130.0, at(2025, 5, 10)),
        expense("t2", "Transport", 70.0, at(2025, 5, 10)),
        expense("h2", "Housing", 110.0, at(2025, 5, 10)),
        expense("n2", "New", 500.0, at(2025, 5, 10)),
    ];
    let trend = spending_trend(&transactions, 3, now);
    assert_eq!(trend.increasing_categories, vec!["Food".to_string()]);
    assert_eq!(trend.decreasing_categories, vec!["Transport".to_string()]);
}

#[test]
fn test_format_currency() {
    assert_eq!(format_currency(1234.5, "USD"), "$1,234.50");
    assert_eq!(format_currency(45.0, "EUR"), "€45.00");
    assert_eq!(format_currency(1_000_000.0, "GBP"), "£1,000,000.00");
    assert_eq!(format_currency(99.999, "INR"), "₹100.00");
    assert_eq!(format_currency(1234.5, "CHF"), "CHF 1,234.50");
    assert_eq!(format_currency(-12.3, "USD"), "-$12.30");
}

#[test]
fn test_build_report_uses_given_transactions() {
    let transactions = vec![
        expense("a", "Food", 10.0, at(2025, 4, 1)),
        expense("b", "Fun", 20.0, at(2025, 4, 2)),
    ];
    let report = build_report(transactions, at(2025, 4, 30));
    assert_eq!(report.transactions.len(), 2);
    assert_eq!(report.by_category[0].category, "Fun");
    assert_eq!(report.by_month.len(), 1);
    assert_eq!(report.recent[0].id, "b");
    assert_eq!(report.totals.len(), 1);
    assert_eq!(report.totals[0].formatted, "$30.00");
}

#[test]
fn test_report_keeps_currencies_apart() {
    let mut euros = expense("e", "Travel", 1200.0, at(2025, 4, 3));
    euros.currency = "EUR".to_string();
    let mut transactions = vec![euros];
    for day in 1..=6 {
        transactions.push(expense(&format!("d{}", day), "Food", 10.0, at(2025, 4, day)));
    }

    let report = build_report(transactions, at(2025, 4, 30));
    let totals: Vec<(&str, &str)> = report
        .totals
        .iter()
        .map(|t| (t.currency.as_str(), t.formatted.as_str()))
        .collect();
    assert_eq!(totals, vec![("EUR", "€1,200.00"), ("USD", "$60.00")]);
    assert_eq!(report.recent.len(), 5);
    assert_eq!(report.recent[0].id, "d6");
}
