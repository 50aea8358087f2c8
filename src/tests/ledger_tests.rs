use crate::core::constants::{
    SETTLED_WITH_USER, TRANSACTION_CREATED, TRANSACTION_SETTLED, TRANSACTIONS_COLLECTION,
};
use crate::core::errors::LedgerError;
use crate::core::models::group::GroupMember;
use crate::core::models::transaction::TransactionPatch;
use crate::core::query::{AnalyticsFilter, ListFilter};
use crate::core::services::Consistency;
use crate::core::split::SplitPolicy;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::{RealtimeStore, Snapshot};
use crate::tests::{create_test_ledger, draft, equal_expense, share, user};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_create_transaction_persists_remotely() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    ledger.load_for(&me).await;

    let created = ledger
        .create_transaction(&me, equal_expense("Dinner", 45.0, &me, &[&alex]))
        .await
        .unwrap();
    assert_eq!(created.consistency, Consistency::PersistedRemotely);

    let tx = created.value;
    assert_eq!(tx.currency, "USD");
    assert_eq!(tx.paid_by_name, "Me");
    assert!(!tx.settled);
    assert_eq!(tx.participants.len(), 2);
    assert_eq!(ledger.transactions().await.len(), 1);

    let remote = ledger.store().snapshot(TRANSACTIONS_COLLECTION).await.unwrap();
    assert_eq!(remote.records.len(), 1);
    assert_eq!(remote.records[0].0, tx.id);

    let balances = ledger.balances("me").await;
    assert_eq!(balances.owed_to_me, 22.5);
    assert_eq!(balances.i_owe, 0.0);
}

#[tokio::test]
async fn test_create_appends_actor_as_zero_share_participant() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let maria = user("maria", "Maria");

    let created = ledger
        .create_transaction(&me, equal_expense("Concert", 100.0, &alex, &[&maria]))
        .await
        .unwrap()
        .value;
    assert_eq!(created.participants.len(), 3);
    let own = created.participant("me").unwrap();
    assert_eq!(own.amount, 0.0);
    assert!(!own.paid);
}

#[tokio::test]
async fn test_invalid_split_aborts_creation() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let mut new_tx = equal_expense("Trip", 100.0, &me, &[&user("alex", "Alex")]);
    new_tx.split_policy = SplitPolicy::Percentage;
    new_tx.participants = vec![draft("me", "Me", 50.0), draft("alex", "Alex", 40.0)];

    let err = ledger.create_transaction(&me, new_tx).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "The sum of percentages (90.00%) should equal 100%");
    assert!(ledger.transactions().await.is_empty());
    assert!(ledger.logs(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_validates_required_fields() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");

    let mut blank_title = equal_expense("  ", 10.0, &me, &[&alex]);
    blank_title.title = "  ".to_string();
    assert!(matches!(
        ledger.create_transaction(&me, blank_title).await,
        Err(LedgerError::InvalidInput(field, _)) if field == "title"
    ));

    let zero_amount = equal_expense("Coffee", 0.0, &me, &[&alex]);
    assert!(matches!(
        ledger.create_transaction(&me, zero_amount).await,
        Err(LedgerError::InvalidInput(field, _)) if field == "amount"
    ));

    let alone = equal_expense("Coffee", 5.0, &me, &[]);
    assert!(matches!(
        ledger.create_transaction(&me, alone).await,
        Err(LedgerError::InvalidSplit(_))
    ));

    let mut stranger_paid = equal_expense("Coffee", 5.0, &me, &[&alex]);
    stranger_paid.paid_by = "stranger".to_string();
    assert!(matches!(
        ledger.create_transaction(&me, stranger_paid).await,
        Err(LedgerError::PayerNotParticipant(id)) if id == "stranger"
    ));

    assert!(ledger.transactions().await.is_empty());
}

#[tokio::test]
async fn test_remote_failure_keeps_local_state() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    ledger.store().set_offline(true);

    let created = ledger
        .create_transaction(&me, equal_expense("Dinner", 45.0, &me, &[&alex]))
        .await
        .unwrap();
    assert!(matches!(
        created.consistency,
        Consistency::PersistedLocallyOnly { ref reason } if reason.contains("permission denied")
    ));
    assert_eq!(ledger.transactions().await.len(), 1);

    let settled = ledger.settle_transaction(&me, &created.value.id).await.unwrap();
    assert!(!settled.consistency.is_remote());
    assert!(ledger.transaction(&created.value.id).await.unwrap().settled);

    ledger.store().set_offline(false);
    let remote = ledger.store().snapshot(TRANSACTIONS_COLLECTION).await.unwrap();
    assert!(!remote.exists());
}

#[tokio::test]
async fn test_update_transaction_merges_fields() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let tx = ledger
        .create_transaction(&me, equal_expense("Dinner", 45.0, &me, &[&alex]))
        .await
        .unwrap()
        .value;

    let patch = TransactionPatch {
        title: Some("Team dinner".to_string()),
        category: Some("Entertainment".to_string()),
        ..Default::default()
    };
    let updated = ledger.update_transaction(&me, &tx.id, patch).await.unwrap();
    assert_eq!(updated.consistency, Consistency::PersistedRemotely);
    assert_eq!(updated.value.title, "Team dinner");
    assert_eq!(updated.value.category, "Entertainment");
    assert_eq!(updated.value.amount, 45.0);
    assert!(updated.value.updated_at.is_some());

    let remote = ledger.store().snapshot(TRANSACTIONS_COLLECTION).await.unwrap();
    assert_eq!(remote.records[0].1["title"], "Team dinner");
    assert_eq!(remote.records[0].1["amount"], 45.0);
}

#[tokio::test]
async fn test_update_keeps_participants_consistent() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let tx = ledger
        .create_transaction(&me, equal_expense("Dinner", 45.0, &me, &[&alex]))
        .await
        .unwrap()
        .value;

    let duplicated = TransactionPatch {
        participants: Some(vec![share("me", 10.0, true), share("alex", 10.0, false), share("alex", 10.0, false)]),
        amount: Some(30.0),
        ..Default::default()
    };
    assert!(matches!(
        ledger.update_transaction(&me, &tx.id, duplicated).await,
        Err(LedgerError::DuplicateParticipant(id)) if id == "alex"
    ));

    let without_payer = TransactionPatch {
        participants: Some(vec![share("alex", 45.0, false)]),
        ..Default::default()
    };
    assert!(matches!(
        ledger.update_transaction(&me, &tx.id, without_payer).await,
        Err(LedgerError::PayerNotParticipant(id)) if id == "me"
    ));

    let amount_only = TransactionPatch {
        amount: Some(999.0),
        ..Default::default()
    };
    assert!(matches!(
        ledger.update_transaction(&me, &tx.id, amount_only).await,
        Err(LedgerError::InvalidSplit(_))
    ));

    let unchanged = ledger.transaction(&tx.id).await.unwrap();
    assert_eq!(unchanged, tx);

    let resplit = TransactionPatch {
        amount: Some(60.0),
        participants: Some(vec![share("me", 20.0, true), share("alex", 40.0, false)]),
        ..Default::default()
    };
    let updated = ledger.update_transaction(&me, &tx.id, resplit).await.unwrap().value;
    assert_eq!(updated.amount, 60.0);
    assert_eq!(updated.participant("alex").unwrap().amount, 40.0);
}

#[tokio::test]
async fn test_settled_transaction_cannot_be_edited() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let tx = ledger
        .create_transaction(&me, equal_expense("Dinner", 45.0, &me, &[&alex]))
        .await
        .unwrap()
        .value;
    ledger.settle_transaction(&me, &tx.id).await.unwrap();

    let patch = TransactionPatch {
        title: Some("Renamed".to_string()),
        ..Default::default()
    };
    let err = ledger.update_transaction(&me, &tx.id, patch).await.unwrap_err();
    assert!(matches!(err, LedgerError::TransactionSettled(ref id) if *id == tx.id));
    assert!(err.is_validation());
    assert_eq!(ledger.transaction(&tx.id).await.unwrap().title, "Dinner");
}

#[tokio::test]
async fn test_update_normalizes_text_like_create() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let mut expense = equal_expense("Dinner", 45.0, &me, &[&alex]);
    expense.description = Some("Birthday".to_string());
    let tx = ledger.create_transaction(&me, expense).await.unwrap().value;

    let patch = TransactionPatch {
        title: Some("  Team dinner  ".to_string()),
        description: Some("   ".to_string()),
        currency: Some("".to_string()),
        ..Default::default()
    };
    let updated = ledger.update_transaction(&me, &tx.id, patch).await.unwrap().value;
    assert_eq!(updated.title, "Team dinner");
    assert_eq!(updated.description, None);
    assert_eq!(updated.currency, "USD");

    let remote = ledger.store().snapshot(TRANSACTIONS_COLLECTION).await.unwrap();
    assert_eq!(remote.records[0].1["title"], "Team dinner");
    assert!(remote.records[0].1["description"].is_null());
    assert_eq!(remote.records[0].1["currency"], "USD");
}

#[tokio::test]
async fn test_update_unknown_transaction() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let result = ledger
        .update_transaction(&me, "missing", TransactionPatch::default())
        .await;
    assert!(matches!(result, Err(LedgerError::TransactionNotFound(id)) if id == "missing"));
}

#[tokio::test]
async fn test_delete_removes_from_every_view() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let tx = ledger
        .create_transaction(&me, equal_expense("Dinner", 45.0, &me, &[&alex]))
        .await
        .unwrap()
        .value;

    let deleted = ledger.delete_transaction(&me, &tx.id).await.unwrap();
    assert!(deleted.value);
    assert_eq!(deleted.consistency, Consistency::PersistedRemotely);
    assert!(ledger.list_view(&ListFilter::default()).await.is_empty());
    assert!(
        ledger
            .analytics(&AnalyticsFilter::default(), Utc::now())
            .await
            .transactions
            .is_empty()
    );
    assert!(matches!(
        ledger.transaction(&tx.id).await,
        Err(LedgerError::TransactionNotFound(_))
    ));

    // A repeated delete is a local no-op but still reaches the store.
    let again = ledger.delete_transaction(&me, &tx.id).await.unwrap();
    assert!(!again.value);
    assert_eq!(again.consistency, Consistency::PersistedRemotely);
}

#[tokio::test]
async fn test_settle_is_idempotent() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let tx = ledger
        .create_transaction(&me, equal_expense("Dinner", 45.0, &me, &[&alex]))
        .await
        .unwrap()
        .value;

    let first = ledger.settle_transaction(&me, &tx.id).await.unwrap();
    assert_eq!(first.consistency, Consistency::PersistedRemotely);
    assert!(first.value.settled);

    let second = ledger.settle_transaction(&me, &tx.id).await.unwrap();
    assert_eq!(second.consistency, Consistency::Unchanged);
    assert!(second.value.settled);
    assert_eq!(second.value.participants, first.value.participants);
    assert_eq!(second.value.amount, 45.0);

    let settle_logs = ledger
        .logs(Some("me"))
        .await
        .unwrap()
        .into_iter()
        .filter(|log| log.action == TRANSACTION_SETTLED)
        .count();
    assert_eq!(settle_logs, 1);

    assert!(matches!(
        ledger.settle_transaction(&me, "missing").await,
        Err(LedgerError::TransactionNotFound(_))
    ));
}

#[tokio::test]
async fn test_settle_with_user_only_touches_their_open_transactions() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let maria = user("maria", "Maria");

    let with_alex = ledger
        .create_transaction(&me, equal_expense("Dinner", 40.0, &me, &[&alex]))
        .await
        .unwrap()
        .value;
    let with_both = ledger
        .create_transaction(&me, equal_expense("Cabin", 90.0, &me, &[&alex, &maria]))
        .await
        .unwrap()
        .value;
    let with_maria = ledger
        .create_transaction(&me, equal_expense("Taxi", 20.0, &me, &[&maria]))
        .await
        .unwrap()
        .value;
    let already_settled = ledger
        .create_transaction(&me, equal_expense("Lunch", 30.0, &me, &[&alex]))
        .await
        .unwrap()
        .value;
    ledger.settle_transaction(&me, &already_settled.id).await.unwrap();
    let settled_at = ledger.transaction(&already_settled.id).await.unwrap().updated_at;

    let result = ledger.settle_with_user(&me, "alex").await.unwrap();
    assert_eq!(result.consistency, Consistency::PersistedRemotely);
    let mut settled_ids = result.value.clone();
    settled_ids.sort();
    let mut expected = vec![with_alex.id.clone(), with_both.id.clone()];
    expected.sort();
    assert_eq!(settled_ids, expected);

    assert!(ledger.transaction(&with_alex.id).await.unwrap().settled);
    assert!(ledger.transaction(&with_both.id).await.unwrap().settled);
    assert!(!ledger.transaction(&with_maria.id).await.unwrap().settled);
    let untouched = ledger.transaction(&already_settled.id).await.unwrap();
    assert!(untouched.settled);
    assert_eq!(untouched.updated_at, settled_at);

    let nothing_left = ledger.settle_with_user(&me, "alex").await.unwrap();
    assert!(nothing_left.value.is_empty());
    assert_eq!(nothing_left.consistency, Consistency::Unchanged);

    let logs = ledger.logs(Some("me")).await.unwrap();
    assert_eq!(logs.iter().filter(|l| l.action == SETTLED_WITH_USER).count(), 1);
    assert_eq!(logs.iter().filter(|l| l.action == TRANSACTION_CREATED).count(), 4);
}

#[tokio::test]
async fn test_settle_with_user_offline_reports_local_only() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    ledger
        .create_transaction(&me, equal_expense("Dinner", 40.0, &me, &[&alex]))
        .await
        .unwrap();

    ledger.store().set_offline(true);
    let result = ledger.settle_with_user(&me, "alex").await.unwrap();
    assert_eq!(result.value.len(), 1);
    assert!(matches!(result.consistency, Consistency::PersistedLocallyOnly { .. }));
    assert_eq!(ledger.balances("me").await.owed_to_me, 0.0);
}

#[tokio::test]
async fn test_create_group_adds_actor() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = GroupMember {
        id: "alex".to_string(),
        name: "Alex".to_string(),
        email: "alex@example.com".to_string(),
        photo_url: None,
    };

    let group = ledger
        .create_group(&me, "Roommates".to_string(), None, vec![alex])
        .await
        .unwrap();
    assert_eq!(group.consistency, Consistency::PersistedRemotely);
    assert!(group.value.has_member("me"));
    assert!(group.value.has_member("alex"));
    assert_eq!(group.value.created_by, "me");
    assert_eq!(ledger.groups().await.len(), 1);

    let blank = ledger.create_group(&me, " ".to_string(), None, vec![]).await;
    assert!(matches!(blank, Err(LedgerError::InvalidInput(field, _)) if field == "name"));
}

#[tokio::test]
async fn test_snapshot_keeps_only_records_with_viewer() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    ledger.load_for(&me).await;

    let snapshot = Snapshot {
        collection: TRANSACTIONS_COLLECTION.to_string(),
        records: vec![
            (
                "mine".to_string(),
                json!({
                    "amount": 12.5,
                    "participants": [{ "userId": "me", "amount": 12.5, "paid": true }]
                }),
            ),
            (
                "theirs".to_string(),
                json!({
                    "title": "Not mine",
                    "participants": [{ "userId": "alex" }]
                }),
            ),
            ("broken".to_string(), json!({ "participants": "nope" })),
            ("empty".to_string(), json!({ "title": "No participants" })),
        ],
    };
    assert_eq!(ledger.apply_snapshot(&snapshot).await, 1);

    let transactions = ledger.transactions().await;
    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx.id, "mine");
    assert_eq!(tx.title, "Untitled");
    assert_eq!(tx.currency, "USD");
    assert_eq!(tx.category, "Other");
    assert_eq!(tx.paid_by, "me");
    assert_eq!(tx.paid_by_name, "Unknown");
    assert!(!tx.settled);

    // An empty snapshot leaves the list alone.
    let empty = Snapshot {
        collection: TRANSACTIONS_COLLECTION.to_string(),
        records: vec![],
    };
    assert_eq!(ledger.apply_snapshot(&empty).await, 0);
    assert_eq!(ledger.transactions().await.len(), 1);
}

#[tokio::test]
async fn test_load_for_switches_users() {
    let ledger = create_test_ledger();
    let me = user("me", "Me");
    let alex = user("alex", "Alex");
    let maria = user("maria", "Maria");
    ledger.load_for(&me).await;
    ledger
        .create_transaction(&me, equal_expense("Dinner", 40.0, &me, &[&alex]))
        .await
        .unwrap();

    ledger.load_for(&maria).await;
    assert!(ledger.transactions().await.is_empty());

    ledger.load_for(&alex).await;
    assert_eq!(ledger.transactions().await.len(), 1);
    assert_eq!(ledger.balances("alex").await.i_owe, 20.0);

    ledger.clear().await;
    assert!(ledger.transactions().await.is_empty());
}

#[tokio::test]
async fn test_subscription_applies_remote_changes() {
    let ledger = Arc::new(create_test_ledger());
    let me = user("me", "Me");
    ledger.load_for(&me).await;
    let handles = ledger.subscribe().await.unwrap();

    // Another device writes a record that involves the viewer.
    ledger
        .store()
        .write(
            TRANSACTIONS_COLLECTION,
            "remote-1",
            json!({
                "title": "Groceries",
                "amount": 30.0,
                "paidBy": "alex",
                "participants": [
                    { "userId": "alex", "amount": 15.0, "paid": true },
                    { "userId": "me", "amount": 15.0, "paid": false }
                ]
            }),
        )
        .await
        .unwrap();

    let mut seen = false;
    for _ in 0..50 {
        if ledger.transaction("remote-1").await.is_ok() {
            seen = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(seen);
    assert_eq!(ledger.balances("me").await.i_owe, 15.0);

    for handle in handles {
        handle.abort();
    }
}

#[tokio::test]
async fn test_audit_log_drops_oldest_entries() {
    let logging = InMemoryLogging::with_retention(2);
    for action in ["first", "second", "third"] {
        logging.log_action(action, json!({}), Some("me")).await.unwrap();
    }
    let actions: Vec<String> = logging.get_logs().await.unwrap().into_iter().map(|l| l.action).collect();
    assert_eq!(actions, vec!["second", "third"]);

    assert!(logging.log_action("bad", json!("not an object"), None).await.is_err());
}
