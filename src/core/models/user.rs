use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::group::GroupMember;
use super::transaction::Participant;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    #[schema(value_type = String, example = "2025-04-02T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn name_or(&self, fallback: &str) -> String {
        self.display_name.clone().unwrap_or_else(|| fallback.to_string())
    }

    /// The acting user as an unpaid, zero-share participant.
    pub fn as_participant(&self) -> Participant {
        Participant {
            user_id: self.uid.clone(),
            name: self.name_or("Demo User"),
            email: self.email.clone().unwrap_or_else(|| "demo@example.com".to_string()),
            photo_url: self.photo_url.clone(),
            amount: 0.0,
            paid: false,
        }
    }

    pub fn as_group_member(&self) -> GroupMember {
        GroupMember {
            id: self.uid.clone(),
            name: self.name_or("Demo User"),
            email: self.email.clone().unwrap_or_else(|| "demo@example.com".to_string()),
            photo_url: self.photo_url.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme `{}`", other)),
        }
    }
}
