/// Authentication Routes
///
/// Sign-up, sign-in, token refresh, the current session payload, and logout.
/// Tokens travel in HttpOnly cookies; the bodies repeat them for clients that
/// prefer bearer headers.

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::auth::{AuthSessionManager, AuthenticatedUser, SignInRequest, TokenPair};
use crate::cookies::{self, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::error::{AppError, AuthError, ErrorContext};
use crate::users::{SignUpRequest, UserService, UserView};

/// POST /signup
///
/// Register a new identity with role `User`. No session is started.
///
/// # Errors
/// - 400: Invalid email, full name, or weak password
/// - 409: Email already registered
pub async fn signup(
    form: web::Json<SignUpRequest>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("sign_up").with_email(&form.email);

    let user = users.sign_up(&form).map_err(|e| {
        context.log_error(&e);
        e
    })?;

    Ok(HttpResponse::Created().json(json!({ "data": UserView::from(&user) })))
}

/// POST /signin
///
/// # Errors
/// - 400: Malformed email or empty password
/// - 401: Unknown email or wrong password
pub async fn signin(
    form: web::Json<SignInRequest>,
    sessions: web::Data<AuthSessionManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("sign_in").with_email(&form.email);

    let pair = sessions.sign_in(&form).map_err(|e| {
        context.log_error(&e);
        e
    })?;

    Ok(with_token_cookies(&sessions, pair))
}

/// POST /refresh
///
/// Rotates the `refreshToken` cookie. Replayed, superseded, or forged tokens get 401.
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<AuthSessionManager>,
) -> Result<HttpResponse, AppError> {
    let presented = cookies::refresh_token(&req).ok_or(AuthError::MissingToken)?;
    let pair = sessions.refresh(&presented)?;

    tracing::debug!("Token pair rotated");

    Ok(with_token_cookies(&sessions, pair))
}

/// GET /payload
///
/// Echoes the identity the access guard decoded from the access token.
pub async fn payload(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "data": user.into_inner() }))
}

/// POST /logout
///
/// # Errors
/// - 401: Missing or invalid access token (cookies are left alone)
pub async fn logout(
    req: HttpRequest,
    sessions: web::Data<AuthSessionManager>,
) -> Result<HttpResponse, AppError> {
    let access_token = cookies::access_token(&req);
    let refresh_token = cookies::refresh_token(&req);

    let user = sessions.logout(access_token.as_deref(), refresh_token.as_deref())?;
    tracing::info!(email = %user.email, "User logged out");

    Ok(HttpResponse::Ok()
        .cookie(cookies::removal_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(cookies::removal_cookie(REFRESH_TOKEN_COOKIE))
        .json(json!({ "data": { "status": 200 } })))
}

fn with_token_cookies(sessions: &AuthSessionManager, pair: TokenPair) -> HttpResponse {
    let access = cookies::token_cookie(
        ACCESS_TOKEN_COOKIE,
        pair.access_token.clone(),
        sessions.access_ttl(),
    );
    let refresh = cookies::token_cookie(
        REFRESH_TOKEN_COOKIE,
        pair.refresh_token.clone(),
        sessions.refresh_ttl(),
    );

    HttpResponse::Ok()
        .cookie(access)
        .cookie(refresh)
        .json(json!({ "data": pair }))
}
