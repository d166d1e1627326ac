/// Users module
///
/// Identity model, roles, and the directory the session core reads identities from.

mod directory;
mod model;
mod service;

pub use directory::InMemoryUserDirectory;
pub use directory::UserDirectory;
pub use model::Permission;
pub use model::Role;
pub use model::User;
pub use model::UserChanges;
pub use model::UserView;
pub use service::CreateUserRequest;
pub use service::DeleteUserRequest;
pub use service::SignUpRequest;
pub use service::UpdateUserRequest;
pub use service::UserService;
