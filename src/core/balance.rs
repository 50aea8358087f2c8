use crate::core::models::transaction::Transaction;
use crate::core::split::round_cents;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BalanceSummary {
    /// Unpaid shares of others on unsettled transactions the user paid for.
    pub owed_to_me: f64,
    /// The user's own unpaid share on unsettled transactions someone else paid for.
    pub i_owe: f64,
    pub net: f64,
    /// Distinct people with an unpaid share on something the user paid for.
    pub owed_by_people: usize,
    /// Distinct payers the user still owes.
    pub owing_to_people: usize,
}

/// One pass over the list. Settled transactions are skipped entirely.
pub fn summarize(transactions: &[Transaction], user_id: &str) -> BalanceSummary {
    let mut owed_to_me = 0.0;
    let mut i_owe = 0.0;
    let mut debtors: HashSet<&str> = HashSet::new();
    let mut creditors: HashSet<&str> = HashSet::new();

    for tx in transactions.iter().filter(|tx| !tx.settled) {
        if tx.paid_by == user_id {
            for p in tx.participants.iter().filter(|p| p.user_id != user_id && !p.paid) {
                owed_to_me += p.amount;
                debtors.insert(p.user_id.as_str());
            }
        } else if let Some(own) = tx.participant(user_id).filter(|p| !p.paid) {
            i_owe += own.amount;
            creditors.insert(tx.paid_by.as_str());
        }
    }

    let owed_to_me = round_cents(owed_to_me);
    let i_owe = round_cents(i_owe);
    BalanceSummary {
        owed_to_me,
        i_owe,
        net: round_cents(owed_to_me - i_owe),
        owed_by_people: debtors.len(),
        owing_to_people: creditors.len(),
    }
}
