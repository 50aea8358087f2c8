use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub paid: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    pub currency: String,
    #[schema(value_type = String, example = "2025-04-02T00:00:00Z")]
    pub date: DateTime<Utc>,
    pub category: String,
    pub paid_by: String,
    pub paid_by_name: String,
    pub participants: Vec<Participant>,
    pub settled: bool,
    #[schema(value_type = String, example = "2025-04-02T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Transaction {
    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.participant(user_id).is_some()
    }

    /// Case-insensitive substring match over title, description and category.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || self.category.to_lowercase().contains(&needle)
    }
}

/// Partial update merged into an existing transaction. Absent fields are left
/// untouched; the serialized form only carries the fields that are set.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

fn non_blank(value: String) -> Option<String> {
    Some(value).filter(|v| !v.trim().is_empty())
}

impl TransactionPatch {
    /// Text is trimmed the way creation trims it. A blank description or
    /// group clears it; a blank currency is ignored.
    pub fn apply_to(self, tx: &mut Transaction, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            tx.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            tx.description = non_blank(description);
        }
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(currency) = self.currency.and_then(non_blank) {
            tx.currency = currency;
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
        if let Some(category) = self.category {
            tx.category = category.trim().to_string();
        }
        if let Some(participants) = self.participants {
            tx.participants = participants;
        }
        if let Some(group) = self.group {
            tx.group = non_blank(group);
        }
        tx.updated_at = Some(now);
    }
}
