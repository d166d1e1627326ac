/// Audit trail for session and directory events
///
/// One structured tracing event per sign-in, refresh, logout and identity
/// change. Failures go out at `warn`, successes at `info`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    SignUp,
    SignIn,
    Refresh,
    Logout,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::SignUp => "SIGN_UP",
            AuditAction::SignIn => "SIGN_IN",
            AuditAction::Refresh => "REFRESH",
            AuditAction::Logout => "LOGOUT",
            AuditAction::CreateUser => "CREATE_USER",
            AuditAction::UpdateUser => "UPDATE_USER",
            AuditAction::DeleteUser => "DELETE_USER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLog {
    pub log_id: String,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    /// Identity the event concerns, when known
    pub email: Option<String>,
    /// Identity that performed the event, for administrative actions
    pub actor: Option<String>,
    pub status: AuditStatus,
    pub message: String,
}

impl AuditLog {
    pub fn success(action: AuditAction, message: impl Into<String>) -> Self {
        Self::new(action, AuditStatus::Success, message)
    }

    pub fn failure(action: AuditAction, message: impl Into<String>) -> Self {
        Self::new(action, AuditStatus::Failure, message)
    }

    fn new(action: AuditAction, status: AuditStatus, message: impl Into<String>) -> Self {
        Self {
            log_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            email: None,
            actor: None,
            status,
            message: message.into(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn emit(&self) {
        match self.status {
            AuditStatus::Failure => tracing::warn!(
                log_id = %self.log_id,
                action = self.action.as_str(),
                email = ?self.email,
                actor = ?self.actor,
                status = "FAILURE",
                message = %self.message,
                "Audit log entry"
            ),
            AuditStatus::Success => tracing::info!(
                log_id = %self.log_id,
                action = self.action.as_str(),
                email = ?self.email,
                actor = ?self.actor,
                status = "SUCCESS",
                message = %self.message,
                "Audit log entry"
            ),
        }
    }
}
