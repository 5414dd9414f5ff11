use base64::Engine;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("auth token is not a three-part JWT")]
    Malformed,
    #[error("auth token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("auth token payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("auth token payload has no userId claim")]
    MissingUserId,
}

/// The logged-in user: the bearer token and the owner id decoded from it.
///
/// The token signature is not verified here; the API does that. The client
/// only needs the `userId` claim to filter tasks by owner.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    user_id: String,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }

    /// Decode the `userId` claim from a JWT.
    pub fn from_token(token: impl Into<String>) -> Result<Self, SessionError> {
        let token: String = token.into();
        let token = token.trim().to_string();
        let user_id = decode_user_id(&token)?;
        Ok(Self { token, user_id })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

fn decode_user_id(token: &str) -> Result<String, SessionError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(_), None) if !h.is_empty() && !p.is_empty() => p,
        _ => return Err(SessionError::Malformed),
    };

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes)?;

    match claims.get("userId") {
        Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(serde_json::Value::Number(id)) => Ok(id.to_string()),
        _ => Err(SessionError::MissingUserId),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(claims: serde_json::Value) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.signature",
            engine.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            engine.encode(claims.to_string())
        )
    }

    #[test]
    fn decodes_user_id_claim() {
        let token = token_with(json!({ "userId": "u-17", "iat": 1700000000 }));
        let session = Session::from_token(token.clone()).unwrap();
        assert_eq!(session.user_id(), "u-17");
        assert_eq!(session.token(), token);
    }

    #[test]
    fn numeric_user_id_becomes_string() {
        let session = Session::from_token(token_with(json!({ "userId": 42 }))).unwrap();
        assert_eq!(session.user_id(), "42");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let token = format!("  {}\n", token_with(json!({ "userId": "a" })));
        let session = Session::from_token(token).unwrap();
        assert!(!session.token().ends_with('\n'));
    }

    #[test]
    fn missing_claim_is_rejected() {
        let err = Session::from_token(token_with(json!({ "sub": "u-17" }))).unwrap_err();
        assert!(matches!(err, SessionError::MissingUserId));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(matches!(
            Session::from_token("not-a-jwt"),
            Err(SessionError::Malformed)
        ));
        assert!(matches!(
            Session::from_token("a.b.c.d"),
            Err(SessionError::Malformed)
        ));
        assert!(matches!(
            Session::from_token("a.!!!.c"),
            Err(SessionError::Encoding(_))
        ));
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::new("secret-token", "u1");
        assert!(!format!("{session:?}").contains("secret-token"));
    }
}
