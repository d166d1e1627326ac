/// Identity management
///
/// Sign-up and the administrative CRUD operations. Every operation except
/// sign-up takes the caller's `AuthenticatedUser`; reads need any valid session,
/// writes need `Permission::ManageIdentities`.

use std::sync::Arc;

use serde::Deserialize;

use crate::audit::{AuditAction, AuditLog};
use crate::auth::{AuthSessionManager, AuthenticatedUser, PasswordHasher};
use crate::configuration::AdminSettings;
use crate::error::{AppError, DirectoryError};
use crate::users::{Permission, Role, User, UserChanges, UserDirectory};
use crate::validators::{is_valid_email, is_valid_full_name, validate_password_strength};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteUserRequest {
    pub email: String,
}

pub struct UserService {
    users: Arc<dyn UserDirectory>,
    sessions: Arc<AuthSessionManager>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        sessions: Arc<AuthSessionManager>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// Self-service registration; always creates a `User`
    pub fn sign_up(&self, request: &SignUpRequest) -> Result<User, AppError> {
        let email = is_valid_email(&request.email)?;
        let full_name = is_valid_full_name(request.full_name.as_deref())?;
        validate_password_strength(&request.password)?;

        let user = self.insert(email, full_name, &request.password, Role::User)?;

        AuditLog::success(AuditAction::SignUp, "identity registered")
            .with_email(&user.email)
            .emit();

        Ok(user)
    }

    /// Create the configured administrator unless the email is already taken
    pub fn bootstrap_admin(&self, admin: &AdminSettings) -> Result<(), AppError> {
        let email = is_valid_email(&admin.email)?;
        if self.users.find_by_email(&email).is_some() {
            tracing::info!(email = %email, "Bootstrap administrator already present");
            return Ok(());
        }

        let full_name = is_valid_full_name(admin.full_name.as_deref())?;
        self.insert(email.clone(), full_name, &admin.password, Role::Admin)?;
        tracing::info!(email = %email, "Bootstrap administrator created");
        Ok(())
    }

    pub fn list(&self, actor: &AuthenticatedUser) -> Result<Vec<User>, AppError> {
        actor.authorize(Permission::ReadDirectory)?;
        Ok(self.users.list())
    }

    pub fn get(&self, actor: &AuthenticatedUser, email: &str) -> Result<User, AppError> {
        let email = is_valid_email(email)?;
        actor.authorize(Permission::ReadDirectory)?;

        self.users
            .find_by_email(&email)
            .ok_or_else(|| DirectoryError::NotFound(email).into())
    }

    pub fn create(
        &self,
        actor: &AuthenticatedUser,
        request: &CreateUserRequest,
    ) -> Result<User, AppError> {
        let email = is_valid_email(&request.email)?;
        let full_name = is_valid_full_name(request.full_name.as_deref())?;
        validate_password_strength(&request.password)?;

        self.authorize_write(actor, AuditAction::CreateUser, &email)?;

        let user = self.insert(email, full_name, &request.password, request.role)?;

        AuditLog::success(AuditAction::CreateUser, format!("identity created as {}", user.role))
            .with_email(&user.email)
            .with_actor(&actor.email)
            .emit();

        Ok(user)
    }

    pub fn update(
        &self,
        actor: &AuthenticatedUser,
        request: &UpdateUserRequest,
    ) -> Result<User, AppError> {
        let email = is_valid_email(&request.email)?;
        let full_name = is_valid_full_name(request.full_name.as_deref())?;
        if let Some(password) = &request.password {
            validate_password_strength(password)?;
        }

        self.authorize_write(actor, AuditAction::UpdateUser, &email)?;

        let password_hash = match &request.password {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        let user = self.users.update(
            &email,
            UserChanges {
                full_name,
                password_hash,
                role: request.role,
            },
        )?;

        AuditLog::success(AuditAction::UpdateUser, "identity updated")
            .with_email(&user.email)
            .with_actor(&actor.email)
            .emit();

        Ok(user)
    }

    /// Remove an identity and end its session.
    ///
    /// Access tokens already issued to it stay valid until they expire.
    pub fn delete(
        &self,
        actor: &AuthenticatedUser,
        request: &DeleteUserRequest,
    ) -> Result<User, AppError> {
        let email = is_valid_email(&request.email)?;

        self.authorize_write(actor, AuditAction::DeleteUser, &email)?;

        let user = self.users.remove(&email)?;
        self.sessions.end_sessions(&user.email);

        AuditLog::success(AuditAction::DeleteUser, "identity deleted, session revoked")
            .with_email(&user.email)
            .with_actor(&actor.email)
            .emit();

        Ok(user)
    }

    fn authorize_write(
        &self,
        actor: &AuthenticatedUser,
        action: AuditAction,
        email: &str,
    ) -> Result<(), AppError> {
        actor.authorize(Permission::ManageIdentities).map_err(|e| {
            AuditLog::failure(action, "insufficient role")
                .with_email(email)
                .with_actor(&actor.email)
                .emit();
            AppError::from(e)
        })
    }

    fn insert(
        &self,
        email: String,
        full_name: Option<String>,
        password: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let password_hash = self.hasher.hash(password)?;
        let user = self
            .users
            .insert(User::new(email, full_name, password_hash, role))?;
        Ok(user)
    }
}
