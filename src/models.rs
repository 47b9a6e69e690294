//! Request and response payloads for the HTTP surface.
//!
//! Responses that describe a principal go through `PrincipalResponse`, which
//! has no credential field at all — sanitization by construction rather than
//! by remembering to strip a key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::identity::{Principal, RoleTag};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password: String,
}

/// OAuth2-style password form: the email travels in `username`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self { access_token, token_type: "bearer".to_string() }
    }
}

/// A principal as clients see it: everything except the hashed password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub user_type: RoleTag,
    pub created_at: DateTime<Utc>,
}

impl From<Principal> for PrincipalResponse {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            email: p.email,
            name: p.name,
            phone: p.phone,
            user_type: p.role,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TurfCreatePayload {
    pub name: String,
    pub description: String,
    pub location: String,
    pub price_per_hour: f64,
    pub available_hours: Vec<String>,
    pub amenities: Vec<String>,
}

/// A turf listing. Owned by exactly one owner principal; every read path
/// filters on `owner_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turf {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price_per_hour: f64,
    pub available_hours: Vec<String>,
    pub amenities: Vec<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Turf {
    pub fn from_document(doc: serde_json::Value) -> AppResult<Self> {
        serde_json::from_value(doc)
            .map_err(|e| AppError::internal("corrupt_turf_record".to_string(), e.to_string()))
    }
}
