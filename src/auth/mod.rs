/// Authentication module
///
/// Credential verification, token issuing/verification, refresh token tracking,
/// the access guard, and the session manager composing them.

mod claims;
mod guard;
mod jwt;
mod password;
mod refresh_store;
mod session;

pub use claims::Claims;
pub use claims::TokenKind;
pub use guard::AccessGuard;
pub use guard::AuthenticatedUser;
pub use jwt::TokenCodec;
pub use password::PasswordHasher;
pub use refresh_store::InMemoryRefreshStore;
pub use refresh_store::RefreshStore;
pub use session::AuthSessionManager;
pub use session::SignInRequest;
pub use session::TokenPair;
