//! HS256 session tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use artisan_core::AccountId;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};
use crate::error::AuthError;

/// Default session lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Symmetric signing secret loaded from process configuration.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wrap a configured secret. Blank values are rejected.
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self(secret.into_bytes()))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Verifies bearer tokens. The HTTP middleware depends only on this trait.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccountId, AuthError>;
}

/// A freshly minted token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// Issues and verifies HS256-signed session tokens.
#[derive(Clone)]
pub struct Hs256SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl Hs256SessionTokens {
    pub fn new(secret: &SigningSecret, ttl_secs: i64) -> Self {
        // Expiry is checked by `validate_claims` against an explicit clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Mint a token for `account_id`, valid from `now` for the configured TTL.
    pub fn issue(&self, account_id: AccountId, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = SessionClaims::new(account_id, now, self.ttl_secs);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, returning the full claims.
    pub fn verify_claims(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(reason = %e, "session token rejected");
            AuthError::InvalidToken
        })?;

        validate_claims(&data.claims, now).map_err(|e| match e {
            TokenValidationError::Expired => AuthError::ExpiredToken,
            TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => {
                tracing::debug!(reason = %e, "session token rejected");
                AuthError::InvalidToken
            }
        })?;

        Ok(data.claims)
    }
}

impl TokenVerifier for Hs256SessionTokens {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccountId, AuthError> {
        let claims = self.verify_claims(token, now)?;
        claims.account_id().map_err(|_| AuthError::InvalidToken)
    }
}

impl core::fmt::Debug for Hs256SessionTokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256SessionTokens")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn tokens(secret: &str) -> Hs256SessionTokens {
        Hs256SessionTokens::new(&SigningSecret::new(secret).unwrap(), DEFAULT_TOKEN_TTL_SECS)
    }

    #[test]
    fn issued_token_verifies_to_its_account() {
        let guard = tokens("test-secret");
        let now = Utc::now();
        let issued = guard.issue(AccountId::new(7), now).unwrap();

        assert_eq!(guard.verify(&issued.token, now), Ok(AccountId::new(7)));
        assert_eq!(issued.claims.exp - issued.claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn token_past_ttl_is_expired() {
        let guard = tokens("test-secret");
        let issued_at = Utc::now() - Duration::hours(2);
        let issued = guard.issue(AccountId::new(7), issued_at).unwrap();

        assert_eq!(guard.verify(&issued.token, Utc::now()), Err(AuthError::ExpiredToken));
        assert_eq!(
            guard.verify(&issued.token, issued_at + Duration::seconds(DEFAULT_TOKEN_TTL_SECS)),
            Err(AuthError::ExpiredToken)
        );
        assert!(guard.verify(&issued.token, issued_at + Duration::seconds(1)).is_ok());
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let now = Utc::now();
        let issued = tokens("secret-a").issue(AccountId::new(7), now).unwrap();

        assert_eq!(tokens("secret-b").verify(&issued.token, now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let guard = tokens("test-secret");
        let now = Utc::now();
        let issued = guard.issue(AccountId::new(7), now).unwrap();

        let parts: Vec<&str> = issued.token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let mut payload: Vec<char> = parts[1].chars().collect();
        let mid = payload.len() / 2;
        payload[mid] = if payload[mid] == 'A' { 'B' } else { 'A' };
        let forged = format!("{}.{}.{}", parts[0], payload.into_iter().collect::<String>(), parts[2]);

        assert_eq!(guard.verify(&forged, now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_is_invalid() {
        let guard = tokens("test-secret");
        assert_eq!(guard.verify("not-a-jwt", Utc::now()), Err(AuthError::InvalidToken));
        assert_eq!(guard.verify("", Utc::now()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn blank_secret_is_a_configuration_error() {
        assert!(matches!(SigningSecret::new("   "), Err(AuthError::MissingSecret)));
        assert_eq!(
            format!("{:?}", SigningSecret::new("s3cr3t").unwrap()),
            "SigningSecret(<redacted>)"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn roundtrips_any_account_id(id in 1i64..i64::MAX) {
            let guard = tokens("prop-secret");
            let now = Utc::now();
            let issued = guard.issue(AccountId::new(id), now).unwrap();
            prop_assert_eq!(guard.verify(&issued.token, now), Ok(AccountId::new(id)));
        }
    }
}
