//! Share computation for a single transaction.
//!
//! A [`SplitDraft`] holds the raw per-participant inputs as entered (ignored,
//! a percentage, or an amount depending on the policy). [`SplitDraft::validate`]
//! is pure and can run any number of times; [`SplitDraft::finalize`] consumes
//! the draft and is the only place percentages become currency amounts.

use crate::core::constants::SPLIT_TOLERANCE;
use crate::core::errors::LedgerError;
use crate::core::models::transaction::Participant;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    #[default]
    Equal,
    Percentage,
    #[serde(rename = "amount")]
    ExactAmount,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDraft {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Percentage (0-100) or exact amount depending on the policy. Unused for equal splits.
    #[serde(default)]
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SplitDraft {
    pub total: f64,
    pub policy: SplitPolicy,
    pub participants: Vec<ParticipantDraft>,
}

/// Rounds to two decimal places, half away from zero.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Every participant gets `round(total / count, 2)`. The leftover cent (if any)
/// is not redistributed, so the shares may not add back up to `total`.
pub fn equal_shares(total: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let share = round_cents(total / count as f64);
    vec![share; count]
}

impl SplitDraft {
    pub fn new(total: f64, policy: SplitPolicy, participants: Vec<ParticipantDraft>) -> Self {
        SplitDraft {
            total,
            policy,
            participants,
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(LedgerError::invalid(
                "amount",
                "Invalid Amount",
                "Amount must be a finite, non-negative number",
            ));
        }
        if self.participants.is_empty() {
            return Err(LedgerError::InvalidSplit(
                "Please add at least one person to split with".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for p in &self.participants {
            if !seen.insert(p.user_id.as_str()) {
                return Err(LedgerError::DuplicateParticipant(p.user_id.clone()));
            }
        }

        match self.policy {
            SplitPolicy::Equal => Ok(()),
            SplitPolicy::Percentage => {
                if let Some(p) = self
                    .participants
                    .iter()
                    .find(|p| !p.value.is_finite() || !(0.0..=100.0).contains(&p.value))
                {
                    return Err(LedgerError::InvalidSplit(format!(
                        "Percentage for {} must be between 0 and 100",
                        p.name
                    )));
                }
                let total_percentage: f64 = self.participants.iter().map(|p| p.value).sum();
                if (total_percentage - 100.0).abs() > SPLIT_TOLERANCE {
                    return Err(LedgerError::InvalidSplit(format!(
                        "The sum of percentages ({:.2}%) should equal 100%",
                        total_percentage
                    )));
                }
                Ok(())
            }
            SplitPolicy::ExactAmount => {
                if let Some(p) = self
                    .participants
                    .iter()
                    .find(|p| !p.value.is_finite() || p.value < 0.0)
                {
                    return Err(LedgerError::InvalidSplit(format!(
                        "Amount for {} cannot be negative",
                        p.name
                    )));
                }
                let total_shares: f64 = self.participants.iter().map(|p| p.value).sum();
                if (total_shares - self.total).abs() > SPLIT_TOLERANCE {
                    return Err(LedgerError::InvalidSplit(format!(
                        "The sum of individual amounts ({:.2}) doesn't match the total ({:.2})",
                        total_shares, self.total
                    )));
                }
                Ok(())
            }
        }
    }

    /// Validates, then converts the inputs to currency shares. The payer's own
    /// share is marked as paid.
    pub fn finalize(self, payer_id: &str) -> Result<Vec<Participant>, LedgerError> {
        self.validate()?;

        let amounts: Vec<f64> = match self.policy {
            SplitPolicy::Equal => equal_shares(self.total, self.participants.len()),
            SplitPolicy::Percentage => self
                .participants
                .iter()
                .map(|p| round_cents(p.value / 100.0 * self.total))
                .collect(),
            SplitPolicy::ExactAmount => self.participants.iter().map(|p| p.value).collect(),
        };

        Ok(self
            .participants
            .into_iter()
            .zip(amounts)
            .map(|(draft, amount)| Participant {
                paid: draft.user_id == payer_id,
                user_id: draft.user_id,
                name: draft.name,
                email: draft.email,
                photo_url: draft.photo_url,
                amount,
            })
            .collect())
    }
}
