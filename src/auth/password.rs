/// Password Hashing and Verification
///
/// bcrypt-backed credential hasher. Verification runs bcrypt's own
/// fixed-work comparison, so timing does not depend on where the mismatch is.

use bcrypt::{hash, verify};

use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// # Arguments
    /// * `cost` - bcrypt work factor (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password for storage
    ///
    /// # Errors
    /// Returns an internal error if bcrypt rejects the input or cost
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Check a submitted password against a stored hash.
    ///
    /// A malformed stored hash is logged and treated as a mismatch.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match verify(password, stored_hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash could not be verified");
                false
            }
        }
    }

    /// Stand-in for `verify` when no identity matches the submitted email.
    ///
    /// Spends the same bcrypt work factor so an unknown email answers no faster
    /// than a wrong password. Always a mismatch.
    pub fn verify_missing(&self, password: &str) -> bool {
        if let Err(e) = hash(password, self.cost) {
            tracing::error!(error = %e, "Password hashing failed for unknown identity");
        }
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
