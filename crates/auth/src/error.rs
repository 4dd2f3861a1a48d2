use thiserror::Error;

/// Failures raised by the guard.
///
/// The token variants are the only ones a request can trigger after startup;
/// the HTTP layer maps all three to a single "forbidden" response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("password must be at most {0} bytes")]
    PasswordTooLong(usize),

    #[error("password cost {0} is outside the supported range 4..=31")]
    InvalidCost(u32),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("signing secret is not configured")]
    MissingSecret,
}

impl AuthError {
    /// True for the three token-verification outcomes.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken
        )
    }
}
