//! `artisan-auth` — credential & session guard.
//!
//! Turns plaintext passwords into stored credentials, verifies login attempts,
//! and issues/validates the bearer tokens that gate mutating operations.
//! This crate is decoupled from HTTP and storage.

pub mod account;
pub mod bearer;
pub mod claims;
pub mod error;
pub mod password;
pub mod token;

pub use account::{Account, AccountChanges, Credentials, NewAccount};
pub use bearer::bearer_token;
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use password::{DEFAULT_PASSWORD_COST, MAX_PASSWORD_BYTES, PasswordHash, PasswordHasher, hash_password, verify_password};
pub use token::{DEFAULT_TOKEN_TTL_SECS, Hs256SessionTokens, IssuedToken, SigningSecret, TokenVerifier};
