use super::principal::{Principal, RoleTag};

/// Role gate: a resolved principal may act only in the role it was stored
/// under. Exact match, nothing transitive — an owner is not a superset of a
/// user. Callers map a `false` here to a forbidden response, which is
/// distinct from the unauthenticated failure of resolution.
pub fn authorize(principal: &Principal, required: RoleTag) -> bool {
    principal.role == required
}
