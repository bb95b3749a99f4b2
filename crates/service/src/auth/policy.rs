//! Access policy: pure decisions over an optional [`Identity`].
//!
//! A missing identity is always `Unauthenticated`; an identity lacking the
//! capability is `Forbidden`. The two are never conflated.

use crate::errors::ServiceError;

use super::identity::{Identity, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability<'a> {
    Admin,
    /// Operator or admin.
    Operator,
    /// User or admin.
    User,
    /// The given owner id, or admin.
    SelfOrAdmin(&'a str),
}

impl Capability<'_> {
    fn denial(&self) -> &'static str {
        match self {
            Capability::Admin => "Forbidden: admin only",
            Capability::Operator => "Forbidden: operator only",
            Capability::User => "Forbidden: user only",
            Capability::SelfOrAdmin(_) => "Forbidden: not owner",
        }
    }
}

pub fn satisfies(identity: &Identity, capability: Capability<'_>) -> bool {
    match capability {
        Capability::Admin => identity.is_admin(),
        Capability::Operator => identity.is_staff(),
        Capability::User => identity.is_admin() || identity.has_role(Role::User),
        Capability::SelfOrAdmin(owner) => identity.is_admin() || identity.subject == owner,
    }
}

/// Any verified identity.
pub fn authenticated(identity: Option<&Identity>) -> Result<&Identity, ServiceError> {
    identity.ok_or_else(ServiceError::unauthenticated)
}

pub fn authorize<'i>(identity: Option<&'i Identity>, capability: Capability<'_>) -> Result<&'i Identity, ServiceError> {
    let identity = authenticated(identity)?;
    if satisfies(identity, capability) {
        Ok(identity)
    } else {
        Err(ServiceError::Forbidden(capability.denial().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(sub: &str, roles: &[Role]) -> Identity { Identity::new(sub, roles.iter().copied()) }

    #[test]
    fn missing_identity_is_unauthenticated_not_forbidden() {
        for cap in [Capability::Admin, Capability::Operator, Capability::User, Capability::SelfOrAdmin("x")] {
            assert!(matches!(authorize(None, cap), Err(ServiceError::Unauthenticated(_))));
        }
    }

    #[test]
    fn admin_satisfies_everything() {
        let admin = id("root", &[Role::Admin]);
        for cap in [Capability::Admin, Capability::Operator, Capability::User, Capability::SelfOrAdmin("someone")] {
            assert!(satisfies(&admin, cap), "{cap:?}");
        }
    }

    #[test]
    fn operator_is_not_admin() {
        let op = id("op", &[Role::Operator]);
        assert!(satisfies(&op, Capability::Operator));
        assert!(!satisfies(&op, Capability::Admin));
        assert!(!satisfies(&op, Capability::User));
        assert!(matches!(
            authorize(Some(&op), Capability::Admin),
            Err(ServiceError::Forbidden(m)) if m == "Forbidden: admin only"
        ));
    }

    #[test]
    fn self_or_admin_compares_subject() {
        let u = id("u-1", &[Role::User]);
        assert!(authorize(Some(&u), Capability::SelfOrAdmin("u-1")).is_ok());
        assert!(matches!(
            authorize(Some(&u), Capability::SelfOrAdmin("u-2")),
            Err(ServiceError::Forbidden(m)) if m == "Forbidden: not owner"
        ));
    }

    #[test]
    fn roleless_identity_is_still_authenticated() {
        let bare = id("anon-ish", &[]);
        assert!(authenticated(Some(&bare)).is_ok());
        assert!(!satisfies(&bare, Capability::User));
    }
}
