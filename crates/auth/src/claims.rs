use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use artisan_core::{AccountId, DomainResult};

/// JWT claims carried by a session token.
///
/// Timestamps are JWT NumericDate values (seconds since the Unix epoch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: decimal id of the account the token was issued to.
    pub sub: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,

    /// Token identifier, unique per issuance.
    pub jti: Uuid,
}

impl SessionClaims {
    pub fn new(sub: AccountId, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: sub.to_string(),
            iat,
            exp: iat.saturating_add(ttl_secs),
            jti: Uuid::now_v7(),
        }
    }

    /// The account named by `sub`.
    pub fn account_id(&self) -> DomainResult<AccountId> {
        self.sub.parse()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of already-verified claims.
///
/// Signature verification happens before this, in [`crate::token`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn window_checks() {
        let now = Utc::now();
        let claims = SessionClaims::new(AccountId::new(1), now, 3600);

        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(
            validate_claims(&claims, now + Duration::seconds(3600)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::seconds(10)),
            Err(TokenValidationError::NotYetValid)
        );

        let zero_ttl = SessionClaims::new(AccountId::new(1), now, 0);
        assert_eq!(
            validate_claims(&zero_ttl, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn subject_is_the_decimal_account_id() {
        let claims = SessionClaims::new(AccountId::new(42), Utc::now(), 60);
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.account_id(), Ok(AccountId::new(42)));
    }

    #[test]
    fn each_issuance_gets_its_own_jti() {
        let now = Utc::now();
        let a = SessionClaims::new(AccountId::new(1), now, 60);
        let b = SessionClaims::new(AccountId::new(1), now, 60);
        assert_ne!(a.jti, b.jti);
    }
}
