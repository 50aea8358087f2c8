mod advisor_tests;
mod analytics_tests;
mod ledger_tests;

use crate::core::models::transaction::{Participant, Transaction};
use crate::core::models::user::SessionUser;
use crate::core::services::{LedgerService, NewTransaction};
use crate::core::split::{ParticipantDraft, SplitPolicy};
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryRealtimeStore;
use chrono::{DateTime, TimeZone, Utc};

pub fn create_test_ledger() -> LedgerService<InMemoryRealtimeStore, InMemoryLogging> {
    let _ = env_logger::try_init();
    LedgerService::new(InMemoryRealtimeStore::new(), InMemoryLogging::new(), "USD")
}

pub fn user(uid: &str, name: &str) -> SessionUser {
    SessionUser {
        uid: uid.to_string(),
        email: Some(format!("{}@example.com", uid)),
        display_name: Some(name.to_string()),
        photo_url: None,
    }
}

pub fn draft(user_id: &str, name: &str, value: f64) -> ParticipantDraft {
    ParticipantDraft {
        user_id: user_id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", user_id),
        photo_url: None,
        value,
    }
}

/// `paid_by` pays `amount`, split equally with everyone in `others`.
pub fn equal_expense(title: &str, amount: f64, paid_by: &SessionUser, others: &[&SessionUser]) -> NewTransaction {
    let mut participants = vec![draft(&paid_by.uid, &paid_by.name_or("Payer"), 0.0)];
    participants.extend(others.iter().map(|u| draft(&u.uid, &u.name_or("Friend"), 0.0)));
    NewTransaction {
        title: title.to_string(),
        description: None,
        amount,
        currency: None,
        date: None,
        category: "Food".to_string(),
        paid_by: paid_by.uid.clone(),
        paid_by_name: None,
        split_policy: SplitPolicy::Equal,
        participants,
        group: None,
    }
}

pub fn share(user_id: &str, amount: f64, paid: bool) -> Participant {
    Participant {
        user_id: user_id.to_string(),
        name: user_id.to_string(),
        email: format!("{}@example.com", user_id),
        photo_url: None,
        amount,
        paid,
    }
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// A stored transaction built directly, bypassing the ledger.
pub fn stored(id: &str, title: &str, amount: f64, paid_by: &str, participants: Vec<Participant>) -> Transaction {
    Transaction {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        amount,
        currency: "USD".to_string(),
        date: at(2025, 4, 2),
        category: "Other".to_string(),
        paid_by: paid_by.to_string(),
        paid_by_name: paid_by.to_string(),
        participants,
        settled: false,
        created_at: at(2025, 4, 2),
        updated_at: None,
        group: None,
    }
}
