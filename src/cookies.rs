/// Token cookies
///
/// The session core only deals in token strings and lifetimes; this is where
/// they are turned into (and read back from) HTTP cookies.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// HttpOnly cookie living exactly as long as the token it carries
pub fn token_cookie(name: &'static str, token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(name, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Cookie that tells the client to drop `name`
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").finish();
    cookie.make_removal();
    cookie
}

pub fn refresh_token(req: &HttpRequest) -> Option<String> {
    non_empty_cookie(req, REFRESH_TOKEN_COOKIE)
}

/// Access token from the `accessToken` cookie, falling back to `Authorization: Bearer`
pub fn access_token(req: &HttpRequest) -> Option<String> {
    non_empty_cookie(req, ACCESS_TOKEN_COOKIE).or_else(|| {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

fn non_empty_cookie(req: &HttpRequest, name: &str) -> Option<String> {
    req.cookie(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
