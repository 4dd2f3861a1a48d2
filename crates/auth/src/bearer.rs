use crate::error::AuthError;

/// Extract the token from an `Authorization` header value.
///
/// The scheme name is case-insensitive (RFC 7235). An absent header, a
/// scheme other than `Bearer` and an empty token are all reported as
/// [`AuthError::MissingToken`].
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?.trim_start();
    let (scheme, token) = header
        .split_once(|c: char| c.is_ascii_whitespace())
        .ok_or(AuthError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(Some("Bearer   abc ")), Ok("abc"));
    }

    #[test]
    fn scheme_name_ignores_case() {
        assert_eq!(bearer_token(Some("bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("BEARER abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("bEaReR\tabc")), Ok("abc"));
    }

    #[test]
    fn missing_or_foreign_scheme_is_missing_token() {
        assert_eq!(bearer_token(None), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("Basic dXNlcjpwdw==")), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("abc.def.ghi")), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("Bearerabc")), Err(AuthError::MissingToken));
    }
}
