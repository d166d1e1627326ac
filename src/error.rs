/// Error Handling Module
///
/// Every operation in the service surfaces one `AppError`. The transport layer maps
/// each kind to exactly one status code and a JSON body; lower-level detail
/// (signing, hashing, storage) is logged but never returned to the caller.

use actix_web::{
    error::{JsonPayloadError, ResponseError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Malformed input shape, detected before any identity or token logic runs
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    SuspiciousContent(String),
    WeakPassword,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
            ValidationError::WeakPassword => write!(
                f,
                "password must contain at least one digit, one lowercase letter, and one uppercase letter"
            ),
        }
    }
}

impl StdError for ValidationError {}

/// Authentication and authorization failures.
///
/// Everything except `Forbidden` is reported to the caller as "unauthenticated";
/// the individual variants only exist for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    InvalidCredentials,
    MissingToken,
    TokenInvalid,
    TokenExpired,
    /// Well-formed refresh token that is no longer the stored one (revoked, superseded, replayed)
    TokenSuperseded,
    Forbidden,
}

impl AuthError {
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, AuthError::Forbidden)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenSuperseded => write!(f, "Token has been revoked or superseded"),
            AuthError::Forbidden => write!(f, "Insufficient role"),
        }
    }
}

impl StdError for AuthError {}

/// Identity directory errors (collaborator store)
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryError {
    Duplicate(String),
    NotFound(String),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::Duplicate(email) => write!(f, "Identity already exists: {}", email),
            DirectoryError::NotFound(email) => write!(f, "Identity not found: {}", email),
        }
    }
}

impl StdError for DirectoryError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    Directory(DirectoryError),
    Config(ConfigError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Directory(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        AppError::Directory(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Directory(DirectoryError::Duplicate(_)) => StatusCode::CONFLICT,
            AppError::Directory(DirectoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let status = self.status();
        let (code, message) = match self {
            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),
            AppError::Auth(AuthError::Forbidden) => ("FORBIDDEN", "Forbidden".to_string()),
            AppError::Auth(_) => ("UNAUTHENTICATED", "Unauthorized".to_string()),
            AppError::Directory(e @ DirectoryError::Duplicate(_)) => {
                ("DUPLICATE_ENTRY", e.to_string())
            }
            AppError::Directory(e @ DirectoryError::NotFound(_)) => ("NOT_FOUND", e.to_string()),
            AppError::Config(_) => ("CONFIG_ERROR", "Server configuration error".to_string()),
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error".to_string()),
        };

        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, error = %self, "Invalid credentials attempt");
            }
            AppError::Auth(AuthError::Forbidden) => {
                tracing::warn!(request_id = request_id, error = %self, "Authorization denied");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Directory(e) => {
                tracing::info!(request_id = request_id, error = %e, "Directory error");
            }
            AppError::Config(e) => {
                tracing::error!(request_id = request_id, error = %e, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        self.status()
    }
}

/// Rejects JSON bodies that fail to deserialize (missing or mistyped fields,
/// bad syntax, wrong content type) with the regular `VALIDATION_ERROR` body.
///
/// The serde message is logged, never returned.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(path = %req.path(), error = %err, "Rejected request body");
    AppError::Validation(ValidationError::InvalidFormat("body".to_string())).into()
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-operation context attached to log lines
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub email: Option<String>,
    pub operation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            email: None,
            operation: operation.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn log_error(&self, error: &AppError) {
        let context = serde_json::json!({
            "request_id": self.request_id,
            "operation": self.operation,
            "email": self.email,
            "timestamp": self.timestamp.to_rfc3339(),
        });

        match error {
            AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %error, context = ?context, "Operation failed");
            }
            _ => {
                tracing::warn!(error = %error, context = ?context, "Operation rejected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = AuthError::TokenExpired.into();
        assert!(matches!(app_err, AppError::Auth(AuthError::TokenExpired)));
    }

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (AppError::from(ValidationError::WeakPassword), 400),
            (AppError::from(AuthError::InvalidCredentials), 401),
            (AppError::from(AuthError::TokenExpired), 401),
            (AppError::from(AuthError::TokenSuperseded), 401),
            (AppError::from(AuthError::MissingToken), 401),
            (AppError::from(AuthError::Forbidden), 403),
            (AppError::from(DirectoryError::Duplicate("a@x.com".into())), 409),
            (AppError::from(DirectoryError::NotFound("a@x.com".into())), 404),
            (AppError::Internal("boom".into()), 500),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code().as_u16(), expected, "{:?}", error);
        }
    }

    #[test]
    fn test_unauthenticated_kinds_share_one_response() {
        let expired = <AppError as ErrorHandler>::error_response(
            &AppError::Auth(AuthError::TokenExpired),
            "req-1",
        )
        .1;
        let invalid = <AppError as ErrorHandler>::error_response(
            &AppError::Auth(AuthError::TokenInvalid),
            "req-2",
        )
        .1;

        assert_eq!(expired.code, "UNAUTHENTICATED");
        assert_eq!(expired.code, invalid.code);
        assert_eq!(expired.message, invalid.message);
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let (_, body) = <AppError as ErrorHandler>::error_response(
            &AppError::Internal("jsonwebtoken: InvalidKeyFormat".into()),
            "req-3",
        );
        assert_eq!(body.message, "Internal server error");
    }

    #[derive(serde::Deserialize)]
    struct Credentials {
        #[allow(dead_code)]
        email: String,
        #[allow(dead_code)]
        password: String,
    }

    #[actix_web::test]
    async fn test_malformed_json_body_is_a_validation_error() {
        use actix_web::{test, web, App};

        let app = test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .route(
                    "/",
                    web::post().to(|_: web::Json<Credentials>| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        for body in [r#"{"email":"a@x.com"}"#, r#"{"email":1,"password":"p"}"#, "not json"] {
            let req = test::TestRequest::post()
                .uri("/")
                .insert_header(("Content-Type", "application/json"))
                .set_payload(body)
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", body);
            let json: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(json["code"], "VALIDATION_ERROR");
            assert_eq!(json["message"], "body has invalid format");
        }
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("sign_in");
        assert_eq!(ctx.operation, "sign_in");
        assert!(ctx.email.is_none());

        let ctx = ctx.with_email("a@x.com");
        assert_eq!(ctx.email.as_deref(), Some("a@x.com"));
    }
}
