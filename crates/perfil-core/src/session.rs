//! Session — the authentication capability handed to the form.
//!
//! A session is an explicit value (token + authenticated flag) rather than
//! ambient state, so the form stays a function of its inputs.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims read from the token payload. The signature is *not* verified; the
/// service does that. These are for display and expiry only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Claims {
  pub sub:  Option<String>,
  #[serde(alias = "rol")]
  pub role: Option<String>,
  /// Expiry, seconds since the Unix epoch.
  pub exp:  Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
  token:  Option<String>,
  claims: Option<Claims>,
}

impl Session {
  /// A session with no credentials.
  pub fn anonymous() -> Self { Self::default() }

  /// Wrap a bearer token. Blank tokens yield an anonymous session.
  pub fn from_token(token: impl Into<String>) -> Self {
    let token = token.into();
    let token = token.trim();
    if token.is_empty() {
      return Self::anonymous();
    }
    Self {
      claims: decode_claims(token),
      token:  Some(token.to_string()),
    }
  }

  pub fn token(&self) -> Option<&str> { self.token.as_deref() }

  pub fn claims(&self) -> Option<&Claims> { self.claims.as_ref() }

  /// The user name carried by the token, if it could be decoded.
  pub fn subject(&self) -> Option<&str> {
    self.claims.as_ref().and_then(|c| c.sub.as_deref())
  }

  pub fn role(&self) -> Option<&str> {
    self.claims.as_ref().and_then(|c| c.role.as_deref())
  }

  pub fn expires_at(&self) -> Option<DateTime<Utc>> {
    self
      .claims
      .as_ref()
      .and_then(|c| c.exp)
      .and_then(|exp| DateTime::from_timestamp(exp, 0))
  }

  pub fn is_authenticated(&self) -> bool { self.is_authenticated_at(Utc::now()) }

  /// A token is usable unless its `exp` claim lies at or before `now`.
  /// Opaque (undecodable) tokens are taken at face value.
  pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
    if self.token.is_none() {
      return false;
    }
    match self.expires_at() {
      Some(exp) => exp > now,
      None => true,
    }
  }
}

/// Decode the payload segment of a JWT (`header.payload.signature`).
fn decode_claims(token: &str) -> Option<Claims> {
  let payload = token.split('.').nth(1)?;
  let bytes = B64URL.decode(payload.trim_end_matches('=')).ok()?;
  serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  fn jwt(payload: serde_json::Value) -> String {
    let header = B64URL.encode(br#"{"alg":"HS512"}"#);
    let body = B64URL.encode(payload.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
  }

  #[test]
  fn anonymous_is_not_authenticated() {
    assert!(!Session::anonymous().is_authenticated());
    assert!(Session::anonymous().token().is_none());
  }

  #[test]
  fn blank_token_is_anonymous() {
    let s = Session::from_token("   ");
    assert!(s.token().is_none());
    assert!(!s.is_authenticated());
  }

  #[test]
  fn opaque_token_is_accepted() {
    let s = Session::from_token("not-a-jwt");
    assert_eq!(s.token(), Some("not-a-jwt"));
    assert!(s.claims().is_none());
    assert!(s.is_authenticated());
  }

  #[test]
  fn claims_are_decoded() {
    let s = Session::from_token(jwt(json!({
      "sub": "ana",
      "role": "INTEGRANTE",
      "exp": 1_900_000_000
    })));
    assert_eq!(s.subject(), Some("ana"));
    assert_eq!(s.role(), Some("INTEGRANTE"));
    assert_eq!(s.expires_at().unwrap().timestamp(), 1_900_000_000);
  }

  #[test]
  fn expired_token_is_not_authenticated() {
    let s = Session::from_token(jwt(json!({ "sub": "ana", "exp": 1_000 })));
    assert!(s.token().is_some());
    assert!(!s.is_authenticated());
  }

  #[test]
  fn expiry_is_exclusive() {
    let s = Session::from_token(jwt(json!({ "exp": 2_000 })));
    let at = |secs| Utc.timestamp_opt(secs, 0).unwrap();
    assert!(s.is_authenticated_at(at(1_999)));
    assert!(!s.is_authenticated_at(at(2_000)));
  }
}
