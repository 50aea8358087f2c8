use crate::core::analytics::{AnalyticsReport, build_report};
use crate::core::balance::{BalanceSummary, summarize};
use crate::core::constants::{
    DEFAULT_CATEGORY, DEFAULT_GROUP_NAME, DEFAULT_TITLE, GROUP_CREATED, GROUPS_COLLECTION, SETTLED_WITH_USER,
    SNAPSHOT_APPLIED, SPLIT_TOLERANCE, TRANSACTION_CREATED, TRANSACTION_DELETED, TRANSACTION_SETTLED, TRANSACTION_UPDATED,
    TRANSACTIONS_COLLECTION, UNKNOWN_PAYER_NAME,
};
use crate::core::errors::LedgerError;
use crate::core::models::{
    audit::AppLog,
    group::{Group, GroupMember},
    transaction::{Participant, Transaction, TransactionPatch},
    user::SessionUser,
};
use crate::core::query::{AnalyticsFilter, ListFilter, analytics_view, list_view};
use crate::core::split::{ParticipantDraft, SplitDraft, SplitPolicy};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{RealtimeStore, Snapshot, record_path};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use utoipa::ToSchema;
use uuid::Uuid;

/// Where a mutation ended up. Local state is always updated first; the remote
/// write is best effort.
#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Consistency {
    PersistedRemotely,
    PersistedLocallyOnly { reason: String },
    /// Nothing needed to change, so nothing was written.
    Unchanged,
}

impl Consistency {
    pub fn is_remote(&self) -> bool {
        matches!(self, Consistency::PersistedRemotely)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Persisted<T> {
    pub value: T,
    pub consistency: Consistency,
}

impl<T> Persisted<T> {
    fn new(value: T, consistency: Consistency) -> Self {
        Persisted { value, consistency }
    }
}

/// Input for [`LedgerService::create_transaction`]. `participants[i].value`
/// is read according to `split_policy`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    pub category: String,
    pub paid_by: String,
    #[serde(default)]
    pub paid_by_name: Option<String>,
    #[serde(default)]
    pub split_policy: SplitPolicy,
    pub participants: Vec<ParticipantDraft>,
    #[serde(default)]
    pub group: Option<String>,
}

/// Lenient shape of a stored transaction. Anything missing falls back to a default.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct TransactionRecord {
    title: Option<String>,
    description: Option<String>,
    amount: Option<f64>,
    currency: Option<String>,
    date: Option<DateTime<Utc>>,
    category: Option<String>,
    paid_by: Option<String>,
    paid_by_name: Option<String>,
    participants: Option<Vec<Participant>>,
    settled: Option<bool>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    group: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GroupRecord {
    name: Option<String>,
    description: Option<String>,
    members: Option<Vec<GroupMember>>,
    created_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct LedgerService<S: RealtimeStore, L: LoggingService> {
    store: S,
    logging: L,
    default_currency: String,
    viewer: RwLock<Option<SessionUser>>,
    transactions: RwLock<Vec<Transaction>>,
    groups: RwLock<Vec<Group>>,
}

impl<S: RealtimeStore, L: LoggingService> LedgerService<S, L> {
    pub fn new(store: S, logging: L, default_currency: impl Into<String>) -> Self {
        LedgerService {
            store,
            logging,
            default_currency: default_currency.into(),
            viewer: RwLock::new(None),
            transactions: RwLock::new(Vec::new()),
            groups: RwLock::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn log_and_audit(&self, action: &str, details: Value, user_id: Option<&str>) {
        if let Err(e) = self.logging.log_action(action, details, user_id).await {
            warn!("Failed to record {} in the audit log: {}", action, e);
        }
    }

    fn remote_outcome(operation: &str, result: Result<(), LedgerError>) -> Consistency {
        match result {
            Ok(()) => Consistency::PersistedRemotely,
            Err(e) => {
                warn!("Remote {} failed, keeping local state: {}", operation, e);
                Consistency::PersistedLocallyOnly { reason: e.to_string() }
            }
        }
    }

    fn validate_text(&self, field: &str, value: &str, max_length: usize) -> Result<(), LedgerError> {
        if value.trim().is_empty() {
            return Err(LedgerError::invalid(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(LedgerError::invalid(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(LedgerError::invalid(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    fn validate_amount(&self, amount: f64) -> Result<(), LedgerError> {
        if !amount.is_finite() {
            return Err(LedgerError::invalid("amount", "Invalid Amount", "Amount must be a finite number"));
        }
        if amount <= 0.0 {
            return Err(LedgerError::invalid("amount", "Invalid Amount", "Please enter a valid amount"));
        }
        if amount > 1_000_000.0 {
            return Err(LedgerError::invalid(
                "amount",
                "Amount Too Large",
                "Amount cannot exceed 1,000,000",
            ));
        }
        Ok(())
    }

    /// Switches the ledger to `actor` and pulls the current remote contents.
    /// A store that cannot be reached leaves the ledger empty.
    pub async fn load_for(&self, actor: &SessionUser) {
        *self.viewer.write().await = Some(actor.clone());
        self.transactions.write().await.clear();
        self.groups.write().await.clear();

        for collection in [TRANSACTIONS_COLLECTION, GROUPS_COLLECTION] {
            match self.store.snapshot(collection).await {
                Ok(snapshot) => {
                    self.apply_snapshot(&snapshot).await;
                }
                Err(e) => warn!("Failed to load {}, starting empty: {}", collection, e),
            }
        }
    }

    /// Forgets the signed-in user and everything loaded for them.
    pub async fn clear(&self) {
        self.viewer.write().await.take();
        self.transactions.write().await.clear();
        self.groups.write().await.clear();
    }

    /// Replaces the local list with the records of `snapshot` that involve the
    /// signed-in user. Returns how many records were kept. Empty snapshots
    /// leave the local list as it is.
    pub async fn apply_snapshot(&self, snapshot: &Snapshot) -> usize {
        if !snapshot.exists() {
            debug!("Ignoring empty {} snapshot", snapshot.collection);
            return 0;
        }
        let Some(viewer) = self.viewer.read().await.clone() else {
            debug!("No signed-in user, ignoring {} snapshot", snapshot.collection);
            return 0;
        };

        let kept = match snapshot.collection.as_str() {
            TRANSACTIONS_COLLECTION => {
                let parsed: Vec<Transaction> = snapshot
                    .records
                    .iter()
                    .filter_map(|(id, record)| parse_transaction(id, record, &viewer.uid))
                    .collect();
                let kept = parsed.len();
                *self.transactions.write().await = parsed;
                kept
            }
            GROUPS_COLLECTION => {
                let parsed: Vec<Group> = snapshot
                    .records
                    .iter()
                    .filter_map(|(id, record)| parse_group(id, record, &viewer.uid))
                    .collect();
                let kept = parsed.len();
                *self.groups.write().await = parsed;
                kept
            }
            other => {
                warn!("Ignoring snapshot of unknown collection {}", other);
                return 0;
            }
        };

        debug!(
            "Applied {} snapshot: kept {} of {} records",
            snapshot.collection,
            kept,
            snapshot.records.len()
        );
        self.log_and_audit(
            SNAPSHOT_APPLIED,
            json!({
                "collection": snapshot.collection,
                "records": snapshot.records.len(),
                "kept": kept
            }),
            Some(viewer.uid.as_str()),
        )
        .await;
        kept
    }

    /// Spawns one listener per collection that feeds every published snapshot
    /// into [`apply_snapshot`](Self::apply_snapshot).
    pub async fn subscribe(self: &Arc<Self>) -> Result<Vec<JoinHandle<()>>, LedgerError>
    where
        S: 'static,
        L: 'static,
    {
        let mut handles = Vec::new();
        for collection in [TRANSACTIONS_COLLECTION, GROUPS_COLLECTION] {
            let mut receiver = self.store.subscribe(collection).await?;
            let ledger = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                loop {
                    match receiver.recv().await {
                        Ok(snapshot) => {
                            ledger.apply_snapshot(&snapshot).await;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Subscription to {} skipped {} snapshots", collection, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("Subscription to {} closed", collection);
                            break;
                        }
                    }
                }
            }));
        }
        Ok(handles)
    }

    pub async fn create_transaction(
        &self,
        actor: &SessionUser,
        draft: NewTransaction,
    ) -> Result<Persisted<Transaction>, LedgerError> {
        self.validate_text("title", &draft.title, 255)
            .map_err(|_| LedgerError::invalid("title", "Missing Title", "Please enter a title for the transaction"))?;
        self.validate_amount(draft.amount)?;
        if draft.category.trim().is_empty() {
            return Err(LedgerError::invalid("category", "Missing Category", "Please select a category"));
        }
        if draft.paid_by.trim().is_empty() {
            return Err(LedgerError::invalid("paidBy", "Missing Payer", "Please select who paid"));
        }
        if draft.participants.len() < 2 {
            return Err(LedgerError::InvalidSplit(
                "Please add at least one more person to split with".to_string(),
            ));
        }
        let payer = draft
            .participants
            .iter()
            .find(|p| p.user_id == draft.paid_by)
            .ok_or_else(|| LedgerError::PayerNotParticipant(draft.paid_by.clone()))?;
        let paid_by_name = non_blank(draft.paid_by_name)
            .or_else(|| non_blank(Some(payer.name.clone())))
            .unwrap_or_else(|| UNKNOWN_PAYER_NAME.to_string());

        let mut participants =
            SplitDraft::new(draft.amount, draft.split_policy, draft.participants).finalize(&draft.paid_by)?;
        if !participants.iter().any(|p| p.user_id == actor.uid) {
            participants.push(actor.as_participant());
        }

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            title: draft.title.trim().to_string(),
            description: non_blank(draft.description),
            amount: draft.amount,
            currency: non_blank(draft.currency).unwrap_or_else(|| self.default_currency.clone()),
            date: draft.date.unwrap_or(now),
            category: draft.category.trim().to_string(),
            paid_by: draft.paid_by,
            paid_by_name,
            participants,
            settled: false,
            created_at: now,
            updated_at: Some(now),
            group: non_blank(draft.group),
        };

        self.transactions.write().await.push(transaction.clone());
        info!("Created transaction {} ({})", transaction.id, transaction.title);

        let record = serde_json::to_value(&transaction).map_err(|e| LedgerError::UnexpectedError(e.to_string()))?;
        let consistency = Self::remote_outcome(
            "create",
            self.store.write(TRANSACTIONS_COLLECTION, &transaction.id, record).await,
        );

        self.log_and_audit(
            TRANSACTION_CREATED,
            json!({
                "transaction_id": transaction.id,
                "title": transaction.title,
                "amount": transaction.amount,
                "currency": transaction.currency,
                "paid_by": transaction.paid_by,
                "participants": transaction.participants.len()
            }),
            Some(actor.uid.as_str()),
        )
        .await;

        Ok(Persisted::new(transaction, consistency))
    }

    pub async fn update_transaction(
        &self,
        actor: &SessionUser,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<Persisted<Transaction>, LedgerError> {
        if let Some(title) = &patch.title {
            self.validate_text("title", title, 255)?;
        }
        if let Some(amount) = patch.amount {
            self.validate_amount(amount)?;
        }
        if let Some(category) = &patch.category {
            self.validate_text("category", category, 100)?;
        }

        let now = Utc::now();
        let changed: Vec<String> = match serde_json::to_value(&patch) {
            Ok(Value::Object(fields)) => fields.into_iter().map(|(key, _)| key).collect(),
            Ok(_) => Vec::new(),
            Err(e) => return Err(LedgerError::UnexpectedError(e.to_string())),
        };

        let updated = {
            let mut transactions = self.transactions.write().await;
            let transaction = transactions
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))?;
            if transaction.settled {
                return Err(LedgerError::TransactionSettled(id.to_string()));
            }
            check_shares(transaction, &patch)?;
            patch.apply_to(transaction, now);
            transaction.clone()
        };
        info!("Updated transaction {}", id);

        // The remote copy gets the merged values, so a cleared field is sent as null.
        let merged = serde_json::to_value(&updated).map_err(|e| LedgerError::UnexpectedError(e.to_string()))?;
        let mut fields = serde_json::Map::new();
        for key in changed {
            let value = merged.get(&key).cloned().unwrap_or(Value::Null);
            fields.insert(key, value);
        }
        fields.insert("updatedAt".to_string(), json!(now));
        let partial = Value::Object(fields);

        let consistency = Self::remote_outcome(
            "update",
            self.store.update(&record_path(TRANSACTIONS_COLLECTION, id), partial.clone()).await,
        );

        self.log_and_audit(
            TRANSACTION_UPDATED,
            json!({ "transaction_id": id, "changes": partial }),
            Some(actor.uid.as_str()),
        )
        .await;

        Ok(Persisted::new(updated, consistency))
    }

    /// Removes the transaction locally (a no-op if it is not there) and then
    /// remotely. The value is whether a local copy was removed.
    pub async fn delete_transaction(&self, actor: &SessionUser, id: &str) -> Result<Persisted<bool>, LedgerError> {
        let removed = {
            let mut transactions = self.transactions.write().await;
            let before = transactions.len();
            transactions.retain(|t| t.id != id);
            transactions.len() != before
        };
        if removed {
            info!("Deleted transaction {}", id);
        } else {
            debug!("Transaction {} not held locally, deleting remotely only", id);
        }

        let consistency = Self::remote_outcome(
            "delete",
            self.store.delete(&record_path(TRANSACTIONS_COLLECTION, id)).await,
        );

        self.log_and_audit(
            TRANSACTION_DELETED,
            json!({ "transaction_id": id, "removed_locally": removed }),
            Some(actor.uid.as_str()),
        )
        .await;

        Ok(Persisted::new(removed, consistency))
    }

    /// Marks one transaction as settled. Settling twice is a no-op.
    pub async fn settle_transaction(
        &self,
        actor: &SessionUser,
        id: &str,
    ) -> Result<Persisted<Transaction>, LedgerError> {
        let now = Utc::now();
        let (settled, changed) = {
            let mut transactions = self.transactions.write().await;
            let transaction = transactions
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))?;
            if transaction.settled {
                (transaction.clone(), false)
            } else {
                transaction.settled = true;
                transaction.updated_at = Some(now);
                (transaction.clone(), true)
            }
        };

        if !changed {
            debug!("Transaction {} is already settled", id);
            return Ok(Persisted::new(settled, Consistency::Unchanged));
        }
        info!("Settled transaction {}", id);

        let consistency = Self::remote_outcome(
            "settle",
            self.store
                .update(
                    &record_path(TRANSACTIONS_COLLECTION, id),
                    json!({ "settled": true, "updatedAt": now }),
                )
                .await,
        );

        self.log_and_audit(
            TRANSACTION_SETTLED,
            json!({ "transaction_id": id, "amount": settled.amount, "currency": settled.currency }),
            Some(actor.uid.as_str()),
        )
        .await;

        Ok(Persisted::new(settled, consistency))
    }

    /// Settles every unsettled transaction `user_id` takes part in and returns
    /// their ids. Remote updates are all attempted even if some fail.
    pub async fn settle_with_user(
        &self,
        actor: &SessionUser,
        user_id: &str,
    ) -> Result<Persisted<Vec<String>>, LedgerError> {
        let now = Utc::now();
        let settled_ids: Vec<String> = {
            let mut transactions = self.transactions.write().await;
            transactions
                .iter_mut()
                .filter(|t| !t.settled && t.involves(user_id))
                .map(|t| {
                    t.settled = true;
                    t.updated_at = Some(now);
                    t.id.clone()
                })
                .collect()
        };

        if settled_ids.is_empty() {
            debug!("Nothing to settle with {}", user_id);
            return Ok(Persisted::new(settled_ids, Consistency::Unchanged));
        }
        info!("Settled {} transactions with {}", settled_ids.len(), user_id);

        let paths: Vec<String> = settled_ids
            .iter()
            .map(|id| record_path(TRANSACTIONS_COLLECTION, id))
            .collect();
        let results = join_all(
            paths
                .iter()
                .map(|path| self.store.update(path, json!({ "settled": true, "updatedAt": now }))),
        )
        .await;
        let failures: Vec<String> = results
            .into_iter()
            .zip(&settled_ids)
            .filter_map(|(result, id)| result.err().map(|e| format!("{}: {}", id, e)))
            .collect();
        let consistency = if failures.is_empty() {
            Consistency::PersistedRemotely
        } else {
            warn!(
                "Remote settle failed for {} of {} transactions, keeping local state",
                failures.len(),
                settled_ids.len()
            );
            Consistency::PersistedLocallyOnly {
                reason: failures.join("; "),
            }
        };

        self.log_and_audit(
            SETTLED_WITH_USER,
            json!({ "counterparty": user_id, "transaction_ids": settled_ids }),
            Some(actor.uid.as_str()),
        )
        .await;

        Ok(Persisted::new(settled_ids, consistency))
    }

    pub async fn create_group(
        &self,
        actor: &SessionUser,
        name: String,
        description: Option<String>,
        mut members: Vec<GroupMember>,
    ) -> Result<Persisted<Group>, LedgerError> {
        self.validate_text("name", &name, 100)?;
        if !members.iter().any(|m| m.id == actor.uid) {
            members.push(actor.as_group_member());
        }

        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: non_blank(description),
            members,
            created_by: actor.uid.clone(),
            created_at: Utc::now(),
        };
        self.groups.write().await.push(group.clone());
        info!("Created group {} ({})", group.id, group.name);

        let record = serde_json::to_value(&group).map_err(|e| LedgerError::UnexpectedError(e.to_string()))?;
        let consistency = Self::remote_outcome(
            "create group",
            self.store.write(GROUPS_COLLECTION, &group.id, record).await,
        );

        self.log_and_audit(
            GROUP_CREATED,
            json!({ "group_id": group.id, "name": group.name, "members": group.members.len() }),
            Some(actor.uid.as_str()),
        )
        .await;

        Ok(Persisted::new(group, consistency))
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.read().await.clone()
    }

    pub async fn transaction(&self, id: &str) -> Result<Transaction, LedgerError> {
        self.transactions
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))
    }

    pub async fn groups(&self) -> Vec<Group> {
        self.groups.read().await.clone()
    }

    pub async fn balances(&self, user_id: &str) -> BalanceSummary {
        summarize(&self.transactions.read().await, user_id)
    }

    pub async fn list_view(&self, filter: &ListFilter) -> Vec<Transaction> {
        list_view(&self.transactions.read().await, filter)
    }

    pub async fn analytics(&self, filter: &AnalyticsFilter, now: DateTime<Utc>) -> AnalyticsReport {
        let view = analytics_view(&self.transactions.read().await, filter, now);
        build_report(view, now)
    }

    pub async fn logs(&self, user_id: Option<&str>) -> Result<Vec<AppLog>, LedgerError> {
        match user_id {
            Some(uid) => self.logging.get_logs_for_user(uid).await,
            None => self.logging.get_logs().await,
        }
    }
}

/// Checks the participants and amount `patch` would leave on `tx`: one entry
/// per user, the payer among them, and shares adding up to the amount when
/// either side changes.
fn check_shares(tx: &Transaction, patch: &TransactionPatch) -> Result<(), LedgerError> {
    if patch.participants.is_none() && patch.amount.is_none() {
        return Ok(());
    }
    let participants = patch.participants.as_deref().unwrap_or(&tx.participants);
    let amount = patch.amount.unwrap_or(tx.amount);

    let mut seen = HashSet::new();
    for p in participants {
        if !seen.insert(p.user_id.as_str()) {
            return Err(LedgerError::DuplicateParticipant(p.user_id.clone()));
        }
        if !p.amount.is_finite() || p.amount < 0.0 {
            return Err(LedgerError::InvalidSplit(format!(
                "Amount for {} cannot be negative",
                p.name
            )));
        }
    }
    if !seen.contains(tx.paid_by.as_str()) {
        return Err(LedgerError::PayerNotParticipant(tx.paid_by.clone()));
    }

    let shares: f64 = participants.iter().map(|p| p.amount).sum();
    if (shares - amount).abs() > SPLIT_TOLERANCE {
        return Err(LedgerError::InvalidSplit(format!(
            "The sum of individual amounts ({:.2}) doesn't match the total ({:.2})",
            shares, amount
        )));
    }
    Ok(())
}

/// `None` when the record does not involve `viewer` or cannot be parsed.
fn parse_transaction(id: &str, record: &Value, viewer: &str) -> Option<Transaction> {
    let parsed: TransactionRecord = match serde_json::from_value(record.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Error parsing transaction {}: {}", id, e);
            return None;
        }
    };
    let participants = parsed.participants.unwrap_or_default();
    if !participants.iter().any(|p| p.user_id == viewer) {
        return None;
    }
    let now = Utc::now();
    Some(Transaction {
        id: id.to_string(),
        title: non_blank(parsed.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: non_blank(parsed.description),
        amount: parsed.amount.unwrap_or(0.0),
        currency: non_blank(parsed.currency).unwrap_or_else(|| "USD".to_string()),
        date: parsed.date.unwrap_or(now),
        category: non_blank(parsed.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        paid_by: non_blank(parsed.paid_by).unwrap_or_else(|| viewer.to_string()),
        paid_by_name: non_blank(parsed.paid_by_name).unwrap_or_else(|| UNKNOWN_PAYER_NAME.to_string()),
        participants,
        settled: parsed.settled.unwrap_or(false),
        created_at: parsed.created_at.unwrap_or(now),
        updated_at: parsed.updated_at,
        group: non_blank(parsed.group),
    })
}

fn parse_group(id: &str, record: &Value, viewer: &str) -> Option<Group> {
    let parsed: GroupRecord = match serde_json::from_value(record.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Error parsing group {}: {}", id, e);
            return None;
        }
    };
    let members = parsed.members.unwrap_or_default();
    if !members.iter().any(|m| m.id == viewer) {
        return None;
    }
    Some(Group {
        id: id.to_string(),
        name: non_blank(parsed.name).unwrap_or_else(|| DEFAULT_GROUP_NAME.to_string()),
        description: non_blank(parsed.description),
        members,
        created_by: non_blank(parsed.created_by).unwrap_or_else(|| viewer.to_string()),
        created_at: parsed.created_at.unwrap_or_else(Utc::now),
    })
}
