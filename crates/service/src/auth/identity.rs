use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// Canonical roles every claim shape is normalized into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::User => "user",
        }
    }

    /// Map one raw grant (role name, scope or permission) to a role.
    pub fn from_grant(grant: &str) -> Option<Role> {
        match grant.trim().to_ascii_lowercase().as_str() {
            "admin" | "write:users" => Some(Role::Admin),
            "operator" | "manage:appointments" => Some(Role::Operator),
            "user" | "read:users" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Every claim shape a token may carry. Providers differ in which of these
/// they populate; [`Identity::from_claims`] merges them all.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Provider-specific claims, e.g. a namespaced roles list.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TokenClaims {
    /// All raw grant strings: roles, the namespaced roles claim, scopes and permissions.
    pub fn grants(&self, roles_claim: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        out.extend(self.role.iter().cloned());
        out.extend(self.roles.iter().cloned());
        match self.extra.get(roles_claim) {
            Some(serde_json::Value::Array(items)) => {
                out.extend(items.iter().filter_map(|v| v.as_str()).map(str::to_string));
            }
            Some(serde_json::Value::String(s)) => { out.insert(s.clone()); }
            _ => {}
        }
        if let Some(scope) = &self.scope {
            out.extend(scope.split_whitespace().map(str::to_string));
        }
        out.extend(self.permissions.iter().cloned());
        out
    }
}

/// The verified caller for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub roles: BTreeSet<Role>,
    /// Raw role, scope and permission strings as presented by the token.
    pub grants: BTreeSet<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        let grants = roles.iter().map(|r| r.as_str().to_string()).collect();
        Self { subject: subject.into(), roles, grants }
    }

    pub fn from_claims(claims: &TokenClaims, roles_claim: &str) -> Result<Self, AuthError> {
        let subject = claims
            .sub
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSubject)?
            .to_string();
        let grants = claims.grants(roles_claim);
        let roles = grants.iter().filter_map(|g| Role::from_grant(g)).collect();
        Ok(Self { subject, roles, grants })
    }

    pub fn has_role(&self, role: Role) -> bool { self.roles.contains(&role) }

    pub fn is_admin(&self) -> bool { self.has_role(Role::Admin) }

    /// Operator or admin.
    pub fn is_staff(&self) -> bool { self.is_admin() || self.has_role(Role::Operator) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "https://booking-api/roles";

    fn claims(json: serde_json::Value) -> TokenClaims { serde_json::from_value(json).unwrap() }

    #[test]
    fn merges_every_claim_shape() {
        let c = claims(serde_json::json!({
            "sub": "auth0|42",
            "scope": "openid read:users",
            "permissions": ["manage:appointments"],
        }));
        let id = Identity::from_claims(&c, NS).unwrap();
        assert_eq!(id.subject, "auth0|42");
        assert!(id.has_role(Role::User));
        assert!(id.has_role(Role::Operator));
        assert!(!id.is_admin());
        assert!(id.is_staff());
        assert!(id.grants.contains("openid"));
    }

    #[test]
    fn namespaced_roles_claim_is_honored() {
        let c = claims(serde_json::json!({ "sub": "u1", NS: ["admin"] }));
        let id = Identity::from_claims(&c, NS).unwrap();
        assert!(id.is_admin());
        // A different namespace is ignored.
        let id = Identity::from_claims(&c, "https://other/roles").unwrap();
        assert!(id.roles.is_empty());
    }

    #[test]
    fn single_role_and_write_users_scope_mean_admin() {
        let c = claims(serde_json::json!({ "sub": "u1", "role": "Admin" }));
        assert!(Identity::from_claims(&c, NS).unwrap().is_admin());
        let c = claims(serde_json::json!({ "sub": "u1", "scope": "write:users" }));
        assert!(Identity::from_claims(&c, NS).unwrap().is_admin());
    }

    #[test]
    fn audience_accepts_string_or_list() {
        let one = claims(serde_json::json!({ "sub": "a", "aud": "api" }));
        assert_eq!(one.aud, Some(Audience::One("api".into())));
        let many = claims(serde_json::json!({ "sub": "a", "aud": ["api", "other"] }));
        assert!(matches!(many.aud, Some(Audience::Many(ref v)) if v.len() == 2));
    }

    #[test]
    fn missing_or_blank_subject_is_rejected() {
        let c = claims(serde_json::json!({ "roles": ["admin"] }));
        assert!(matches!(Identity::from_claims(&c, NS), Err(AuthError::MissingSubject)));
        let c = claims(serde_json::json!({ "sub": "  ", "roles": ["admin"] }));
        assert!(matches!(Identity::from_claims(&c, NS), Err(AuthError::MissingSubject)));
    }

    #[test]
    fn unknown_grants_give_no_roles() {
        let c = claims(serde_json::json!({ "sub": "x", "roles": ["guest"], "scope": "openid profile" }));
        let id = Identity::from_claims(&c, NS).unwrap();
        assert!(id.roles.is_empty());
        assert!(!id.is_staff());
    }
}
