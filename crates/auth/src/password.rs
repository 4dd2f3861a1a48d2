//! Password hashing and verification (bcrypt).
//!
//! bcrypt embeds a fresh random salt and the cost factor in every hash, so
//! hashing the same plaintext twice yields two different stored values and
//! verification needs nothing but the stored string.

use crate::error::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// bcrypt reads at most this many bytes of input; anything after is ignored,
/// so longer plaintexts are refused instead of silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Plaintext verified against when a login names an unknown account.
const DUMMY_PLAINTEXT: &str = "artisan-unknown-account";

/// A stored bcrypt hash.
///
/// `Debug` does not print the hash and the type is deliberately not
/// `Serialize`, so it cannot leak through logs or response bodies.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash read back from storage.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Hash a non-empty plaintext of at most [`MAX_PASSWORD_BYTES`] bytes with the
/// given bcrypt cost.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<PasswordHash, AuthError> {
    if plaintext.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::PasswordTooLong(MAX_PASSWORD_BYTES));
    }
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(AuthError::InvalidCost(cost));
    }
    bcrypt::hash(plaintext, cost)
        .map(PasswordHash)
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a plaintext against a stored hash.
///
/// Fails closed: empty or oversize input, a malformed hash and a mismatch all
/// yield `false`.
pub fn verify_password(plaintext: &str, stored: &PasswordHash) -> bool {
    if plaintext.is_empty() || plaintext.len() > MAX_PASSWORD_BYTES {
        return false;
    }
    bcrypt::verify(plaintext, stored.as_str()).unwrap_or(false)
}

/// Configured hasher shared by the request handlers.
///
/// Holds a dummy hash of the same cost so that a login naming an unknown
/// account still pays for one full bcrypt verification.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy: PasswordHash,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let dummy = hash_password(DUMMY_PLAINTEXT, cost)?;
        Ok(Self { cost, dummy })
    }

    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, AuthError> {
        hash_password(plaintext, self.cost)
    }

    /// Verify a login attempt. `stored` is `None` when no account matched the
    /// login key; the dummy hash is checked instead and the result discarded.
    pub fn verify_login(&self, plaintext: &str, stored: Option<&PasswordHash>) -> bool {
        match stored {
            Some(hash) => verify_password(plaintext, hash),
            None => {
                let _ = verify_password(plaintext, &self.dummy);
                false
            }
        }
    }
}

impl core::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordHasher").field("cost", &self.cost).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Lowest cost bcrypt accepts; keeps the suite fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("pw1", TEST_COST).unwrap();
        assert!(hash.as_str().starts_with("$2"));
        assert_ne!(hash.as_str(), "pw1");
        assert!(verify_password("pw1", &hash));
        assert!(!verify_password("pw2", &hash));
    }

    #[test]
    fn hashing_twice_yields_different_values() {
        let a = hash_password("same input", TEST_COST).unwrap();
        let b = hash_password("same input", TEST_COST).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same input", &a));
        assert!(verify_password("same input", &b));
    }

    #[test]
    fn empty_plaintext_is_rejected_and_never_verifies() {
        assert_eq!(hash_password("", TEST_COST), Err(AuthError::EmptyPassword));
        let hash = hash_password("pw1", TEST_COST).unwrap();
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("pw1", &PasswordHash::from_stored("not-a-bcrypt-hash")));
        assert!(!verify_password("pw1", &PasswordHash::from_stored("")));
    }

    #[test]
    fn out_of_range_cost_is_rejected() {
        assert_eq!(hash_password("pw1", 3), Err(AuthError::InvalidCost(3)));
        assert!(matches!(PasswordHasher::new(32), Err(AuthError::InvalidCost(32))));
    }

    #[test]
    fn hasher_debug_does_not_expose_hashes() {
        let hasher = PasswordHasher::new(TEST_COST).unwrap();
        let rendered = format!("{hasher:?} {:?}", hasher.hash("pw1").unwrap());
        assert!(!rendered.contains("$2"));
    }

    #[test]
    fn unknown_account_login_is_rejected() {
        let hasher = PasswordHasher::new(TEST_COST).unwrap();
        assert!(!hasher.verify_login("pw1", None));
        assert!(!hasher.verify_login(DUMMY_PLAINTEXT, None));

        let stored = hasher.hash("pw1").unwrap();
        assert!(hasher.verify_login("pw1", Some(&stored)));
        assert!(!hasher.verify_login("pw2", Some(&stored)));
    }

    #[test]
    fn plaintext_over_72_bytes_is_refused() {
        let long = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert_eq!(
            hash_password(&long, TEST_COST),
            Err(AuthError::PasswordTooLong(MAX_PASSWORD_BYTES))
        );
        assert!(hash_password(&"a".repeat(MAX_PASSWORD_BYTES), TEST_COST).is_ok());
    }

    #[test]
    fn shared_72_byte_prefix_does_not_verify() {
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let stored = hash_password(&prefix, TEST_COST).unwrap();

        // bcrypt alone would accept both of these against `stored`.
        assert!(!verify_password(&format!("{prefix}correct-suffix"), &stored));
        assert!(!verify_password(&format!("{prefix}attacker-guess"), &stored));
        assert!(verify_password(&prefix, &stored));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn verifies_only_the_hashed_plaintext(p1 in "[ -~]{1,100}", p2 in "[ -~]{1,72}") {
            let hash = hash_password(&p2, TEST_COST).unwrap();
            prop_assert!(verify_password(&p2, &hash));
            prop_assert_eq!(verify_password(&p1, &hash), p1 == p2);
        }

        #[test]
        fn oversize_plaintext_never_hashes(p in "[ -~]{73,120}") {
            prop_assert_eq!(
                hash_password(&p, TEST_COST),
                Err(AuthError::PasswordTooLong(MAX_PASSWORD_BYTES))
            );
        }
    }
}
