//! `Authorization: Bearer` header handling

pub const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for other
/// schemes and for an empty token.
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Format a token as an `Authorization` header value
pub fn bearer_authorization(token: &str) -> String {
    format!("{} {}", BEARER_SCHEME, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("  Bearer   abc.def.ghi "), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_token_rejects_other_input() {
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
        assert_eq!(extract_bearer_token("Bearer    "), None);
        assert_eq!(extract_bearer_token(""), None);
    }

    #[test]
    fn test_bearer_authorization_round_trip() {
        let header = bearer_authorization("abc.def.ghi");
        assert_eq!(header, "Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&header), Some("abc.def.ghi"));
    }
}
