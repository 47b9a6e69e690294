//! Registration and login flows: the glue calling the hasher, the store and
//! the token issuer in sequence. Registration never issues a token; a fresh
//! principal still has to log in.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::RegisterPayload;
use crate::security;
use crate::storage::SharedStore;
use crate::tprintln;

use super::principal::{Principal, RoleTag};
use super::token::TokenIssuer;

/// Register a new principal under the given role's collection.
///
/// Duplicate email within that collection is a user error; the same email in
/// the *other* role's collection is fine, the two stores are independent.
/// Returns the full stored principal; the HTTP layer is responsible for
/// sanitizing it before it reaches a client.
pub fn register(store: &SharedStore, payload: &RegisterPayload, role: RoleTag) -> AppResult<Principal> {
    if store.find_one(role.collection(), "email", &payload.email)?.is_some() {
        return Err(AppError::user("email_registered", "Email already registered"));
    }

    let hashed_password = security::hash_password(&payload.password)?;
    let principal = Principal {
        id: Uuid::new_v4().to_string(),
        email: payload.email.clone(),
        name: payload.name.clone(),
        phone: payload.phone.clone(),
        hashed_password,
        role,
        created_at: chrono::Utc::now(),
        updated_at: None,
    };

    let doc = serde_json::to_value(&principal)
        .map_err(|e| AppError::internal("encode_error".to_string(), e.to_string()))?;
    store.create_collection(role.collection())?;
    store.insert_one(role.collection(), doc)?;

    tprintln!("identity.register email={} role={} id={}", principal.email, role, principal.id);
    Ok(principal)
}

/// Verify credentials against the role's collection and issue a bearer token.
///
/// A missing principal and a failed password check return the identical
/// error; nothing reveals which half was wrong.
pub fn login(
    store: &SharedStore,
    issuer: &TokenIssuer,
    email: &str,
    password: &str,
    role: RoleTag,
) -> AppResult<String> {
    let doc = store
        .find_one(role.collection(), "email", email)?
        .ok_or_else(AppError::invalid_credentials)?;
    let principal = Principal::from_document(doc)?;
    if !security::verify_password(&principal.hashed_password, password) {
        return Err(AppError::invalid_credentials());
    }

    tprintln!("identity.login email={} role={}", principal.email, role);
    issuer.issue(&principal.email, role, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;
    use tempfile::tempdir;

    fn payload(email: &str, password: &str) -> RegisterPayload {
        RegisterPayload {
            email: email.to_string(),
            name: "T".to_string(),
            phone: "1".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn duplicate_email_conflicts_within_a_role_only() {
        let tmp = tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();

        register(&store, &payload("dup@x.com", "pw"), RoleTag::User).unwrap();
        let err = register(&store, &payload("dup@x.com", "pw"), RoleTag::User).unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.message(), "Email already registered");

        // Same email under the other role's store succeeds
        register(&store, &payload("dup@x.com", "pw"), RoleTag::Owner).unwrap();
    }

    #[test]
    fn stored_password_is_hashed_not_plaintext() {
        let tmp = tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        let p = register(&store, &payload("h@x.com", "secret-pw"), RoleTag::User).unwrap();
        assert_ne!(p.hashed_password, "secret-pw");
        assert!(security::verify_password(&p.hashed_password, "secret-pw"));
    }

    #[test]
    fn login_errors_are_an_oracle_free_single_shape() {
        let tmp = tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        let issuer = TokenIssuer::new("s", Algorithm::HS256, 30);
        register(&store, &payload("real@x.com", "right-pw"), RoleTag::User).unwrap();

        let wrong_pw = login(&store, &issuer, "real@x.com", "wrong-pw", RoleTag::User).unwrap_err();
        let no_user = login(&store, &issuer, "ghost@x.com", "right-pw", RoleTag::User).unwrap_err();
        assert_eq!(wrong_pw.code_str(), no_user.code_str());
        assert_eq!(wrong_pw.message(), no_user.message());
        assert_eq!(wrong_pw.http_status(), 401);
    }

    #[test]
    fn login_succeeds_with_correct_credentials() {
        let tmp = tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        let issuer = TokenIssuer::new("s", Algorithm::HS256, 30);
        register(&store, &payload("ok@x.com", "pw"), RoleTag::Owner).unwrap();

        let token = login(&store, &issuer, "ok@x.com", "pw", RoleTag::Owner).unwrap();
        let claims = issuer.decode(&token).unwrap();
        assert_eq!(claims.sub, "ok@x.com");
        assert_eq!(claims.user_type, "owner");
    }
}
