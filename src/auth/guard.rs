/// Access Guard
///
/// Stateless check run by every protected operation: the presented access token
/// must be correctly signed, unexpired, and of the access kind. Role checks are a
/// second, explicit step (`AuthenticatedUser::authorize`) taken by the caller.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::jwt::TokenCodec;
use crate::error::AuthError;
use crate::users::{Permission, Role};

/// Identity proven by a valid access token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedUser {
    pub email: String,
    pub role: Role,
    /// Access token expiry (Unix timestamp)
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// # Errors
    /// `Forbidden` if the role does not grant `permission`
    pub fn authorize(&self, permission: Permission) -> Result<(), AuthError> {
        if self.role.permits(permission) {
            Ok(())
        } else {
            tracing::warn!(
                email = %self.email,
                role = %self.role,
                permission = ?permission,
                "Role does not grant permission"
            );
            Err(AuthError::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct AccessGuard {
    codec: Arc<TokenCodec>,
}

impl AccessGuard {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// # Errors
    /// `TokenInvalid` / `TokenExpired`, both reported as unauthenticated
    pub fn check(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.codec.verify_access(access_token)?;
        let role = claims.role.ok_or(AuthError::TokenInvalid)?;

        Ok(AuthenticatedUser {
            email: claims.sub,
            role,
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::JwtSettings;
    use crate::users::User;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(
            TokenCodec::new(&JwtSettings {
                secret: "test-secret-key-at-least-32-characters-long".to_string(),
                access_token_expiry: 900,
                refresh_token_expiry: 3600,
                issuer: "test".to_string(),
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_check_exposes_identity_and_role() {
        let codec = codec();
        let guard = AccessGuard::new(Arc::clone(&codec));
        let user = User::new("a@x.com".into(), None, "hash".into(), Role::Admin);
        let token = codec.issue_access_token(&user).unwrap();

        let authenticated = guard.check(&token).unwrap();
        assert_eq!(authenticated.email, "a@x.com");
        assert_eq!(authenticated.role, Role::Admin);
    }

    #[test]
    fn test_check_rejects_refresh_token() {
        let codec = codec();
        let guard = AccessGuard::new(Arc::clone(&codec));
        let user = User::new("a@x.com".into(), None, "hash".into(), Role::Admin);
        let token = codec.issue_refresh_token(&user).unwrap();

        assert_eq!(guard.check(&token), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_check_rejects_garbage() {
        let guard = AccessGuard::new(codec());
        assert!(guard.check("").unwrap_err().is_unauthenticated());
        assert!(guard.check("a.b.c").unwrap_err().is_unauthenticated());
    }

    #[test]
    fn test_authorize() {
        let user = AuthenticatedUser {
            email: "a@x.com".into(),
            role: Role::User,
            expires_at: 0,
        };
        assert!(user.authorize(Permission::ReadDirectory).is_ok());
        assert_eq!(user.authorize(Permission::ManageIdentities), Err(AuthError::Forbidden));

        let admin = AuthenticatedUser {
            role: Role::Admin,
            ..user
        };
        assert!(admin.authorize(Permission::ManageIdentities).is_ok());
    }
}
