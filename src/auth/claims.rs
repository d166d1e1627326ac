/// JWT Claims structure
///
/// One claims layout serves both token kinds. Access tokens carry the role;
/// refresh tokens carry only the identity. `typ` keeps one kind from being
/// accepted where the other is expected, and `jti` makes every issued token
/// textually unique even when two are minted within the same second.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (identity email)
    pub sub: String,
    /// Role, present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub typ: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Unique token id
    pub jti: String,
}

impl Claims {
    pub fn access(email: &str, role: Role, expiry_seconds: i64, issuer: &str) -> Self {
        Self::new(email, Some(role), TokenKind::Access, expiry_seconds, issuer)
    }

    pub fn refresh(email: &str, expiry_seconds: i64, issuer: &str) -> Self {
        Self::new(email, None, TokenKind::Refresh, expiry_seconds, issuer)
    }

    fn new(
        email: &str,
        role: Option<Role>,
        typ: TokenKind,
        expiry_seconds: i64,
        issuer: &str,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: email.to_string(),
            role,
            typ,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn email(&self) -> &str {
        &self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims() {
        let claims = Claims::access("a@x.com", Role::Admin, 3600, "test");

        assert_eq!(claims.email(), "a@x.com");
        assert_eq!(claims.role, Some(Role::Admin));
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_refresh_claims_omit_role() {
        let claims = Claims::refresh("a@x.com", 3600, "test");
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["typ"], "refresh");
        assert!(json.get("role").is_none());
    }

    #[test]
    fn test_every_token_id_is_unique() {
        let first = Claims::refresh("a@x.com", 3600, "test");
        let second = Claims::refresh("a@x.com", 3600, "test");
        assert_ne!(first.jti, second.jti);
    }
}
