/// Identity Routes
///
/// Every route here sits behind `AccessGuardMiddleware`. Reads are open to any
/// session; writes are checked against the caller's role by `UserService`.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::users::{CreateUserRequest, DeleteUserRequest, UpdateUserRequest, UserService, UserView};

/// GET /users
pub async fn list_users(
    actor: web::ReqData<AuthenticatedUser>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let views: Vec<UserView> = users.list(&actor)?.iter().map(UserView::from).collect();
    Ok(HttpResponse::Ok().json(json!({ "data": views })))
}

/// GET /users/{email}
///
/// # Errors
/// - 404: No identity with that email
pub async fn get_user(
    path: web::Path<String>,
    actor: web::ReqData<AuthenticatedUser>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.get(&actor, &path)?;
    Ok(HttpResponse::Ok().json(json!({ "data": UserView::from(&user) })))
}

/// POST /users
///
/// # Errors
/// - 400: Invalid input
/// - 403: Caller is not an admin
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    actor: web::ReqData<AuthenticatedUser>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.create(&actor, &form)?;
    Ok(HttpResponse::Created().json(json!({ "data": UserView::from(&user) })))
}

/// PUT /users
///
/// # Errors
/// - 403: Caller is not an admin
/// - 404: No identity with that email
pub async fn update_user(
    form: web::Json<UpdateUserRequest>,
    actor: web::ReqData<AuthenticatedUser>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.update(&actor, &form)?;
    Ok(HttpResponse::Ok().json(json!({ "data": UserView::from(&user) })))
}

/// DELETE /users
///
/// Also ends the deleted identity's session.
pub async fn delete_user(
    form: web::Json<DeleteUserRequest>,
    actor: web::ReqData<AuthenticatedUser>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.delete(&actor, &form)?;
    Ok(HttpResponse::Ok().json(json!({ "data": UserView::from(&user) })))
}
