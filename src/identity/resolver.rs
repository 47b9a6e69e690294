//! Token validation and principal resolution.

use crate::error::{AppError, AppResult};
use crate::storage::SharedStore;
use crate::tprintln;

use super::principal::{Principal, RoleTag};
use super::token::TokenIssuer;

/// Resolve a presented bearer token to the stored principal it names.
///
/// Decode and signature/expiry checks happen first and are pure; the only
/// I/O is the final store lookup. The role claim selects which collection to
/// search: users and owners are disjoint stores. An unrecognized role tag is
/// rejected outright rather than falling back to a guessed collection.
///
/// Every failure mode (bad signature, expired, missing subject, unknown
/// role, absent record, malformed record) surfaces as the same
/// undifferentiated credential error.
pub fn resolve(store: &SharedStore, issuer: &TokenIssuer, token: &str) -> AppResult<Principal> {
    let claims = issuer.decode(token)?;
    if claims.sub.is_empty() {
        return Err(AppError::invalid_credentials());
    }
    let role = RoleTag::parse(&claims.user_type).ok_or_else(AppError::invalid_credentials)?;

    let doc = store
        .find_one(role.collection(), "email", &claims.sub)?
        .ok_or_else(AppError::invalid_credentials)?;
    let principal = Principal::from_document(doc)?;
    tprintln!("identity.resolve email={} role={}", principal.email, role);
    Ok(principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{register, RoleTag};
    use crate::models::RegisterPayload;
    use jsonwebtoken::Algorithm;
    use tempfile::tempdir;

    fn payload(email: &str) -> RegisterPayload {
        RegisterPayload {
            email: email.to_string(),
            name: "Test".to_string(),
            phone: "555".to_string(),
            password: "pw123456".to_string(),
        }
    }

    #[test]
    fn resolves_registered_owner() {
        let tmp = tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        let issuer = TokenIssuer::new("s", Algorithm::HS256, 30);
        register(&store, &payload("o@x.com"), RoleTag::Owner).unwrap();

        let token = issuer.issue("o@x.com", RoleTag::Owner, None).unwrap();
        let principal = resolve(&store, &issuer, &token).unwrap();
        assert_eq!(principal.email, "o@x.com");
        assert_eq!(principal.role, RoleTag::Owner);
    }

    #[test]
    fn token_for_absent_principal_is_rejected() {
        let tmp = tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        let issuer = TokenIssuer::new("s", Algorithm::HS256, 30);

        let token = issuer.issue("ghost@x.com", RoleTag::User, None).unwrap();
        let err = resolve(&store, &issuer, &token).unwrap_err();
        assert_eq!(err.code_str(), "invalid_credentials");
    }

    #[test]
    fn unrecognized_role_tag_is_rejected_not_defaulted() {
        let tmp = tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        let issuer = TokenIssuer::new("s", Algorithm::HS256, 30);
        register(&store, &payload("o@x.com"), RoleTag::Owner).unwrap();

        // Hand-sign claims with a role tag the server does not know about
        #[derive(serde::Serialize)]
        struct RawClaims<'a> {
            sub: &'a str,
            user_type: &'a str,
            exp: i64,
        }
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS256),
            &RawClaims {
                sub: "o@x.com",
                user_type: "admin",
                exp: chrono::Utc::now().timestamp() + 600,
            },
            &jsonwebtoken::EncodingKey::from_secret(b"s"),
        )
        .unwrap();

        let err = resolve(&store, &issuer, &token).unwrap_err();
        assert_eq!(err.code_str(), "invalid_credentials");
    }

    #[test]
    fn role_claim_selects_the_collection() {
        let tmp = tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        let issuer = TokenIssuer::new("s", Algorithm::HS256, 30);
        // Registered as user only; an owner-role token must not find it
        register(&store, &payload("u@x.com"), RoleTag::User).unwrap();

        let token = issuer.issue("u@x.com", RoleTag::Owner, None).unwrap();
        assert!(resolve(&store, &issuer, &token).is_err());

        let token = issuer.issue("u@x.com", RoleTag::User, None).unwrap();
        assert!(resolve(&store, &issuer, &token).is_ok());
    }
}
