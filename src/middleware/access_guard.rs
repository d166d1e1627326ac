/// Access Guard Middleware
///
/// Runs `AccessGuard::check` on the request's access token (cookie or bearer
/// header) and injects the resulting `AuthenticatedUser` into request extensions
/// for route handlers to read via `web::ReqData<AuthenticatedUser>`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::AccessGuard;
use crate::cookies;
use crate::error::{AppError, AuthError};

/// Must wrap every route that requires a session.
pub struct AccessGuardMiddleware {
    guard: AccessGuard,
}

impl AccessGuardMiddleware {
    pub fn new(guard: AccessGuard) -> Self {
        Self { guard }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGuardMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGuardMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AccessGuardMiddlewareService {
            service: Rc::new(service),
            guard: self.guard.clone(),
        }))
    }
}

pub struct AccessGuardMiddlewareService<S> {
    service: Rc<S>,
    guard: AccessGuard,
}

impl<S, B> Service<ServiceRequest> for AccessGuardMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let checked = match cookies::access_token(req.request()) {
            None => Err(AuthError::MissingToken),
            Some(token) => self.guard.check(&token),
        };

        match checked {
            Ok(user) => {
                tracing::debug!(
                    email = %user.email,
                    role = %user.role,
                    "Access token validated"
                );
                req.extensions_mut().insert(user);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Access denied");
                Box::pin(async move { Err(AppError::Auth(e).into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, TokenCodec};
    use crate::configuration::JwtSettings;
    use crate::users::{Role, User};
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use std::sync::Arc;

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

    async fn whoami(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
        HttpResponse::Ok().body(user.email.clone())
    }

    #[actix_web::test]
    async fn test_valid_token_reaches_handler() {
        let codec = codec();
        let token = codec
            .issue_access_token(&User::new("a@x.com".into(), None, "hash".into(), Role::User))
            .unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AccessGuardMiddleware::new(AccessGuard::new(codec)))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .cookie(actix_web::cookie::Cookie::new(cookies::ACCESS_TOKEN_COOKIE, token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, "a@x.com");
    }

    #[actix_web::test]
    async fn test_missing_and_invalid_tokens_are_401() {
        let app = test::init_service(
            App::new()
                .wrap(AccessGuardMiddleware::new(AccessGuard::new(codec())))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Bearer invalid.token.here"))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }
}
