//! Password hashing and verification.
//!
//! Both are thin wrappers over bcrypt. Plain passwords never leave these
//! functions and are never logged.

use crate::{EngineError, ResultEngine};

/// Lowest and highest cost factors bcrypt accepts.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// Hash `plain` with a fresh salt at the given cost factor.
pub fn hash_password(plain: &str, cost: u32) -> ResultEngine<String> {
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(EngineError::InvalidInput(format!(
            "bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}"
        )));
    }
    Ok(bcrypt::hash(plain, cost)?)
}

/// Check `plain` against a stored bcrypt hash.
///
/// A stored hash that bcrypt cannot parse never matches.
pub fn verify(plain: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(plain, stored_hash) {
        Ok(matches) => matches,
        Err(_) => {
            tracing::warn!("stored password hash is not a valid bcrypt hash");
            false
        }
    }
}
