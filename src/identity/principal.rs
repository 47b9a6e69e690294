use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Role discriminator. Selects which collection a principal lives in and
/// which routes it may call. Parsing is strict: an unrecognized tag is not
/// silently mapped to either role.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    #[default]
    User,
    Owner,
}

impl RoleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::User => "user",
            RoleTag::Owner => "owner",
        }
    }

    /// The store collection holding principals of this role. Users and owners
    /// are disjoint; identifiers and email uniqueness never cross over.
    pub fn collection(&self) -> &'static str {
        match self {
            RoleTag::User => "users",
            RoleTag::Owner => "owners",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "user" => Some(RoleTag::User),
            "owner" => Some(RoleTag::Owner),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored identity record, typed at the store boundary. The hashed password
/// rides along internally and must be stripped (via `PrincipalResponse`)
/// before anything leaves the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub hashed_password: String,
    /// Older user documents may predate the tag; absent means plain user.
    #[serde(rename = "user_type", default)]
    pub role: RoleTag,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Principal {
    /// Decode a raw store document into a typed principal. A document missing
    /// required fields is treated as an unresolvable principal, which
    /// surfaces as the same undifferentiated credential failure.
    pub fn from_document(doc: serde_json::Value) -> AppResult<Self> {
        serde_json::from_value(doc).map_err(|_| AppError::invalid_credentials())
    }
}
