use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthSessionManager, InMemoryRefreshStore, PasswordHasher, TokenCodec};
use crate::configuration::Settings;
use crate::error::{json_error_handler, AppError};
use crate::logger::LoggerMiddleware;
use crate::middleware::AccessGuardMiddleware;
use crate::routes::{
    create_user, delete_user, get_user, health_check, list_users, logout, payload, refresh, signin,
    signup, update_user,
};
use crate::users::{InMemoryUserDirectory, UserService};

/// Everything the handlers share, built once from `Settings`
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<InMemoryUserDirectory>,
    pub refresh_store: Arc<InMemoryRefreshStore>,
    pub sessions: Arc<AuthSessionManager>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wire the stores, codec and services, then create the bootstrap admin if configured.
    ///
    /// # Errors
    /// * `Config` - JWT settings the codec refuses
    pub fn build(settings: &Settings) -> Result<Self, AppError> {
        let users = Arc::new(InMemoryUserDirectory::new());
        let refresh_store = Arc::new(InMemoryRefreshStore::new());
        let codec = Arc::new(TokenCodec::new(&settings.jwt)?);
        let hasher = PasswordHasher::new(settings.application.password_hash_cost);

        let sessions = Arc::new(AuthSessionManager::new(
            users.clone(),
            refresh_store.clone(),
            codec,
            hasher,
        ));
        let user_service = Arc::new(UserService::new(users.clone(), sessions.clone(), hasher));

        if let Some(admin) = &settings.admin {
            user_service.bootstrap_admin(admin)?;
        }

        Ok(Self {
            users,
            refresh_store,
            sessions,
            user_service,
        })
    }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let sessions = web::Data::from(state.sessions.clone());
    let user_service = web::Data::from(state.user_service.clone());
    let guard = state.sessions.guard().clone();

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(sessions.clone())
            .app_data(user_service.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/signup", web::post().to(signup))
            .route("/signin", web::post().to(signin))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))

            // Routes requiring a valid access token
            .service(
                web::resource("/payload")
                    .wrap(AccessGuardMiddleware::new(guard.clone()))
                    .route(web::get().to(payload)),
            )
            .service(
                web::scope("/users")
                    .wrap(AccessGuardMiddleware::new(guard.clone()))
                    .route("", web::get().to(list_users))
                    .route("", web::post().to(create_user))
                    .route("", web::put().to(update_user))
                    .route("", web::delete().to(delete_user))
                    .route("/{email}", web::get().to(get_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
