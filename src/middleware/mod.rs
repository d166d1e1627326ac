/// Middleware module
///
/// Access-token enforcement for protected routes.

mod access_guard;

pub use access_guard::AccessGuardMiddleware;
