/// Session orchestration: sign-in, refresh (rotation) and logout.
///
/// Per identity the session is either absent or active. Sign-in activates it,
/// refresh keeps it active with a new refresh token, and logout or a
/// superseding sign-in ends it. Expiry is never stored; it is evaluated when a
/// token is verified.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::{AuditAction, AuditLog};
use crate::auth::guard::{AccessGuard, AuthenticatedUser};
use crate::auth::jwt::TokenCodec;
use crate::auth::password::PasswordHasher;
use crate::auth::refresh_store::RefreshStore;
use crate::error::{AppError, AuthError};
use crate::users::{User, UserDirectory};
use crate::validators::{is_valid_email, require_password};

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthSessionManager {
    users: Arc<dyn UserDirectory>,
    refresh_store: Arc<dyn RefreshStore>,
    codec: Arc<TokenCodec>,
    guard: AccessGuard,
    hasher: PasswordHasher,
}

impl AuthSessionManager {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        refresh_store: Arc<dyn RefreshStore>,
        codec: Arc<TokenCodec>,
        hasher: PasswordHasher,
    ) -> Self {
        let guard = AccessGuard::new(Arc::clone(&codec));
        Self {
            users,
            refresh_store,
            codec,
            guard,
            hasher,
        }
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Access token lifetime in seconds
    pub fn access_ttl(&self) -> i64 {
        self.codec.access_ttl()
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_ttl(&self) -> i64 {
        self.codec.refresh_ttl()
    }

    /// Verify credentials and start a session.
    ///
    /// Any earlier refresh token for the identity stops working.
    ///
    /// # Errors
    /// * `Validation` - malformed email or empty password
    /// * `InvalidCredentials` - unknown email or wrong password (the store is untouched)
    pub fn sign_in(&self, request: &SignInRequest) -> Result<TokenPair, AppError> {
        let email = is_valid_email(&request.email)?;
        require_password(&request.password)?;

        // Unknown emails pay the same bcrypt cost as wrong passwords
        let user = self.users.find_by_email(&email);
        let verified = match &user {
            Some(user) => self.hasher.verify(&request.password, &user.password_hash),
            None => self.hasher.verify_missing(&request.password),
        };

        let user = user.filter(|_| verified).ok_or_else(|| {
            AuditLog::failure(AuditAction::SignIn, "invalid credentials")
                .with_email(&email)
                .emit();
            AuthError::InvalidCredentials
        })?;

        let pair = self.issue_pair(&user)?;
        self.refresh_store.save(&user.email, &pair.refresh_token);

        AuditLog::success(AuditAction::SignIn, "session started")
            .with_email(&user.email)
            .emit();

        Ok(pair)
    }

    /// Exchange a refresh token for a new pair, rotating the stored token.
    ///
    /// # Errors
    /// * `TokenInvalid` / `TokenExpired` - the token does not verify, or its identity is gone
    /// * `TokenSuperseded` - the token verifies but is not the stored one
    pub fn refresh(&self, presented: &str) -> Result<TokenPair, AppError> {
        let claims = self.codec.verify_refresh(presented).map_err(|e| {
            AuditLog::failure(AuditAction::Refresh, e.to_string()).emit();
            e
        })?;
        let email = claims.email();

        if !self.refresh_store.compare(email, presented) {
            AuditLog::failure(AuditAction::Refresh, "refresh token is not the active one")
                .with_email(email)
                .emit();
            return Err(AuthError::TokenSuperseded.into());
        }

        // The role may have changed since sign-in; a deleted identity cannot refresh.
        // Only the presented token is dropped, in case the email was registered again.
        let user = self.users.find_by_email(email).ok_or_else(|| {
            self.refresh_store.delete(presented);
            AuditLog::failure(AuditAction::Refresh, "identity no longer exists")
                .with_email(email)
                .emit();
            AuthError::TokenInvalid
        })?;

        let pair = self.issue_pair(&user)?;

        // A concurrent refresh with the same token may have rotated first
        if !self
            .refresh_store
            .rotate(email, presented, &pair.refresh_token)
        {
            AuditLog::failure(AuditAction::Refresh, "lost rotation race")
                .with_email(email)
                .emit();
            return Err(AuthError::TokenSuperseded.into());
        }

        AuditLog::success(AuditAction::Refresh, "refresh token rotated")
            .with_email(email)
            .emit();

        Ok(pair)
    }

    /// End the session belonging to the presented refresh token.
    ///
    /// # Errors
    /// * `MissingToken` / `TokenInvalid` / `TokenExpired` - the access token does not verify
    pub fn logout(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<AuthenticatedUser, AppError> {
        let access_token = access_token.ok_or(AuthError::MissingToken)?;
        let user = self.guard.check(access_token).map_err(|e| {
            AuditLog::failure(AuditAction::Logout, e.to_string()).emit();
            e
        })?;

        if let Some(refresh_token) = refresh_token {
            self.refresh_store.delete(refresh_token);
        }

        AuditLog::success(AuditAction::Logout, "session ended")
            .with_email(&user.email)
            .emit();

        Ok(user)
    }

    /// Drop any refresh token held for `email`
    pub fn end_sessions(&self, email: &str) {
        self.refresh_store.revoke_identity(email);
    }

    fn issue_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.codec.issue_access_token(user)?,
            refresh_token: self.codec.issue_refresh_token(user)?,
        })
    }
}
