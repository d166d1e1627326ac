mod auth;
mod health_check;
mod users;

pub use auth::{logout, payload, refresh, signin, signup};
pub use health_check::health_check;
pub use users::{create_user, delete_user, get_user, list_users, update_user};
