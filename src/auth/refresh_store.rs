/// Refresh Token Store
///
/// Holds the single authoritative refresh token per identity (email).
/// - A new sign-in overwrites the entry (last write wins, one active session)
/// - A successful refresh swaps the entry for the newly issued token (rotation)
/// - Logout removes the entry (revocation)
///
/// A refresh succeeds only if the presented token textually equals the stored one,
/// so every refresh token is single-use.

use dashmap::DashMap;

pub trait RefreshStore: Send + Sync {
    /// Insert or overwrite the entry for `email`
    fn save(&self, email: &str, token: &str);

    fn get(&self, email: &str) -> Option<String>;

    /// True iff an entry exists for `email` and equals `presented` exactly
    fn compare(&self, email: &str, presented: &str) -> bool {
        self.get(email)
            .map(|stored| constant_time_eq(stored.as_bytes(), presented.as_bytes()))
            .unwrap_or(false)
    }

    /// Overwrite with a rotated token; same effect as `save`.
    ///
    /// `AuthSessionManager::refresh` goes through `rotate`, the compare-and-swap
    /// form of this step, so that two refreshes cannot both succeed.
    fn update(&self, email: &str, token: &str) {
        self.save(email, token)
    }

    /// Replace the entry with `new_token` only if it still equals `expected`.
    ///
    /// Compare and write happen under the key's lock, so of two concurrent rotations
    /// presenting the same token exactly one returns `true`.
    fn rotate(&self, email: &str, expected: &str, new_token: &str) -> bool;

    /// Remove the entry whose stored value equals `presented`; no-op if none does
    fn delete(&self, presented: &str);

    /// Remove whatever entry `email` has
    fn revoke_identity(&self, email: &str);
}

#[derive(Debug, Default)]
pub struct InMemoryRefreshStore {
    tokens: DashMap<String, String>,
}

impl InMemoryRefreshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl RefreshStore for InMemoryRefreshStore {
    fn save(&self, email: &str, token: &str) {
        self.tokens.insert(email.to_string(), token.to_string());
    }

    fn get(&self, email: &str) -> Option<String> {
        self.tokens.get(email).map(|entry| entry.value().clone())
    }

    fn rotate(&self, email: &str, expected: &str, new_token: &str) -> bool {
        // get_mut holds the shard write lock until `entry` drops
        match self.tokens.get_mut(email) {
            Some(mut entry) if constant_time_eq(entry.as_bytes(), expected.as_bytes()) => {
                *entry = new_token.to_string();
                true
            }
            _ => false,
        }
    }

    fn delete(&self, presented: &str) {
        self.tokens
            .retain(|_, stored| !constant_time_eq(stored.as_bytes(), presented.as_bytes()));
    }

    fn revoke_identity(&self, email: &str) {
        self.tokens.remove(email);
    }
}

/// Constant-time comparison to avoid timing side-channels.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
