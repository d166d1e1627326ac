/// Identity directory
///
/// Generic document store for identities, keyed by email. The session core only
/// needs `find_by_email`; the rest backs the administrative endpoints.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::DirectoryError;
use crate::users::model::{User, UserChanges};

pub trait UserDirectory: Send + Sync {
    /// Insert a new identity. Fails with `Duplicate` if the email is taken.
    fn insert(&self, user: User) -> Result<User, DirectoryError>;

    fn find_by_email(&self, email: &str) -> Option<User>;

    /// All identities, oldest first
    fn list(&self) -> Vec<User>;

    fn update(&self, email: &str, changes: UserChanges) -> Result<User, DirectoryError>;

    fn remove(&self, email: &str) -> Result<User, DirectoryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<String, User>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn insert(&self, user: User) -> Result<User, DirectoryError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DirectoryError::Duplicate(user.email)),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    fn find_by_email(&self, email: &str) -> Option<User> {
        self.users.get(email).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        users
    }

    fn update(&self, email: &str, changes: UserChanges) -> Result<User, DirectoryError> {
        let mut user = self
            .users
            .get_mut(email)
            .ok_or_else(|| DirectoryError::NotFound(email.to_string()))?;

        if let Some(full_name) = changes.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        Ok(user.value().clone())
    }

    fn remove(&self, email: &str) -> Result<User, DirectoryError> {
        self.users
            .remove(email)
            .map(|(_, user)| user)
            .ok_or_else(|| DirectoryError::NotFound(email.to_string()))
    }
}
