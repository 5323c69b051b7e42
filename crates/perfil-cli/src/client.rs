//! Async HTTP client for the profile service.
//!
//! Every failure is reduced here to a [`RequestFailed`]: a one-line summary for
//! the user and a [`Diagnostic`] for the operator log.

use std::time::Duration;

use anyhow::{Context, Result};
use perfil_core::{
  Diagnostic, RequestFailed,
  client::ProfileClient,
  profile::{Profile, ProfileUpdate},
  session::Session,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;

/// Connection settings for the profile service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Async HTTP client for the profile REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// The service's error envelope: `{statusCode, datetime, message, details}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
  message: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
  token: Option<String>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// `POST /users/login`
  pub async fn login(
    &self,
    user: &str,
    password: &str,
  ) -> Result<Session, RequestFailed> {
    let req = self
      .client
      .post(self.url("/users/login"))
      .json(&json!({ "user": user, "clave": password }));
    let resp: LoginResponse = self.send(req).await?;

    match resp.token.filter(|t| !t.trim().is_empty()) {
      Some(token) => Ok(Session::from_token(token)),
      None => Err(RequestFailed::new(
        "login succeeded but no token was returned",
        Diagnostic::Message("POST /users/login: response has no `token`".into()),
      )),
    }
  }

  // ── Plumbing ──────────────────────────────────────────────────────────────

  async fn send<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
  ) -> Result<T, RequestFailed> {
    let request = req.build().map_err(|e| {
      RequestFailed::new("could not build request", Diagnostic::Message(e.to_string()))
    })?;
    let method = request.method().to_string();
    let url = request.url().to_string();

    let resp = self
      .client
      .execute(request)
      .await
      .map_err(|e| transport_failure(&e, &method, &url))?;

    if !resp.status().is_success() {
      return Err(status_failure(resp).await);
    }

    let bytes = resp
      .bytes()
      .await
      .map_err(|e| transport_failure(&e, &method, &url))?;
    serde_json::from_slice(&bytes).map_err(|e| {
      RequestFailed::new(
        "unexpected response from the server",
        Diagnostic::Message(format!("decoding {method} {url}: {e}")),
      )
    })
  }
}

impl ProfileClient for ApiClient {
  /// `GET /personas/my-profile`
  async fn fetch_profile(&self, token: &str) -> Result<Profile, RequestFailed> {
    let req = self
      .client
      .get(self.url("/personas/my-profile"))
      .bearer_auth(token);
    self.send(req).await
  }

  /// `PUT /personas/my-profile`
  async fn update_profile(
    &self,
    payload: &ProfileUpdate,
    token: &str,
  ) -> Result<Profile, RequestFailed> {
    let req = self
      .client
      .put(self.url("/personas/my-profile"))
      .bearer_auth(token)
      .json(payload);
    self.send(req).await
  }
}

// ─── Error mapping ────────────────────────────────────────────────────────────

/// No response arrived.
fn transport_failure(e: &reqwest::Error, method: &str, url: &str) -> RequestFailed {
  let summary = if e.is_timeout() {
    "the server did not answer in time"
  } else if e.is_connect() {
    "could not reach the server"
  } else {
    "network error"
  };

  let mut detail = e.to_string();
  let mut source = std::error::Error::source(e);
  while let Some(cause) = source {
    detail.push_str(": ");
    detail.push_str(&cause.to_string());
    source = std::error::Error::source(cause);
  }

  RequestFailed::new(summary, Diagnostic::Request {
    method: method.to_string(),
    url:    url.to_string(),
    detail,
  })
}

/// A response arrived with a non-success status.
async fn status_failure(resp: Response) -> RequestFailed {
  let status = resp.status().as_u16();
  let headers = resp
    .headers()
    .iter()
    .map(|(name, value)| {
      let value = value.to_str().unwrap_or("<non-ascii>");
      (name.to_string(), value.to_string())
    })
    .collect();
  let body = resp.text().await.unwrap_or_default();

  let summary = serde_json::from_str::<ErrorEnvelope>(&body)
    .ok()
    .and_then(|env| env.message)
    .filter(|m| !m.trim().is_empty())
    .map(|m| format!("{m} (status {status})"))
    .unwrap_or_else(|| format!("request failed with status code {status}"));

  RequestFailed::new(summary, Diagnostic::Response {
    status,
    headers,
    body,
  })
}

#[cfg(test)]
mod tests {
  use perfil_core::field::Field;
  use serde_json::Value;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
  };

  use super::*;

  fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig {
      base_url: base_url.to_string(),
      timeout:  Duration::from_secs(5),
    })
    .unwrap()
  }

  fn persona() -> Value {
    json!({
      "idPersona": 3,
      "nombreCompleto": "Rosa Huamán",
      "documento": "72004411",
      "correo": "rosa@example.com",
      "correoInstitucional": null,
      "codigoEstudiante": null,
      "celular": "987000111",
      "pais": "Perú",
      "religion": null,
      "fechaNacimiento": "2000-02-29",
      "foto": null,
      "tipoPersona": "INVITADO",
      "usuario": { "idUsuario": 9, "user": "rosa" }
    })
  }

  #[tokio::test]
  async fn fetch_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/personas/my-profile"))
      .and(header("authorization", "Bearer tok-123"))
      .respond_with(ResponseTemplate::new(200).set_body_json(persona()))
      .expect(1)
      .mount(&server)
      .await;

    let profile = client_for(&server.uri())
      .fetch_profile("tok-123")
      .await
      .unwrap();

    assert_eq!(profile.get(Field::FullName), "Rosa Huamán");
    assert!(profile.is_guest());
  }

  #[tokio::test]
  async fn base_url_trailing_slash_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/personas/my-profile"))
      .respond_with(ResponseTemplate::new(200).set_body_json(persona()))
      .expect(1)
      .mount(&server)
      .await;

    let base = format!("{}/", server.uri());
    assert!(client_for(&base).fetch_profile("t").await.is_ok());
  }

  #[tokio::test]
  async fn update_puts_payload_without_managed_fields() {
    let server = MockServer::start().await;
    let mut stored = persona();
    stored["celular"] = json!("999888777");

    let profile: Profile = serde_json::from_value(persona()).unwrap();
    let mut edited = profile.clone();
    edited.set(Field::Phone, "999888777");
    let payload = edited.to_update();

    Mock::given(method("PUT"))
      .and(path("/personas/my-profile"))
      .and(header("authorization", "Bearer tok"))
      .and(body_json(serde_json::to_value(&payload).unwrap()))
      .respond_with(ResponseTemplate::new(200).set_body_json(stored))
      .expect(1)
      .mount(&server)
      .await;

    let updated = client_for(&server.uri())
      .update_profile(&payload, "tok")
      .await
      .unwrap();
    assert_eq!(updated.get(Field::Phone), "999888777");

    let requests = server.received_requests().await.unwrap();
    let sent: Value = requests[0].body_json().unwrap();
    assert!(sent.get("tipoPersona").is_none());
    assert!(sent.get("usuario").is_none());
  }

  #[tokio::test]
  async fn error_envelope_message_becomes_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/personas/my-profile"))
      .respond_with(ResponseTemplate::new(403).set_body_json(json!({
        "statusCode": 403,
        "datetime": "2026-10-19T10:00:00",
        "message": "Acceso Denegado",
        "details": "/personas/my-profile"
      })))
      .mount(&server)
      .await;

    let err = client_for(&server.uri())
      .fetch_profile("t")
      .await
      .unwrap_err();

    assert_eq!(err.summary, "Acceso Denegado (status 403)");
    match err.diagnostic {
      Diagnostic::Response {
        status,
        headers,
        body,
      } => {
        assert_eq!(status, 403);
        assert!(body.contains("Acceso Denegado"));
        assert!(headers.iter().any(|(k, _)| k == "content-type"));
      }
      other => panic!("expected a response diagnostic, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn bare_status_uses_generic_summary() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let payload = Profile::default().to_update();
    let err = client_for(&server.uri())
      .update_profile(&payload, "t")
      .await
      .unwrap_err();

    assert_eq!(err.summary, "request failed with status code 500");
    assert!(matches!(
      err.diagnostic,
      Diagnostic::Response { status: 500, .. }
    ));
  }

  #[tokio::test]
  async fn undecodable_body_is_a_message_diagnostic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
      .mount(&server)
      .await;

    let err = client_for(&server.uri())
      .fetch_profile("t")
      .await
      .unwrap_err();

    assert_eq!(err.summary, "unexpected response from the server");
    assert!(matches!(err.diagnostic, Diagnostic::Message(_)));
  }

  #[tokio::test]
  async fn unreachable_server_is_a_request_diagnostic() {
    let err = client_for("http://127.0.0.1:1")
      .fetch_profile("t")
      .await
      .unwrap_err();

    match err.diagnostic {
      Diagnostic::Request { method, url, .. } => {
        assert_eq!(method, "GET");
        assert_eq!(url, "http://127.0.0.1:1/personas/my-profile");
      }
      other => panic!("expected a request diagnostic, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn login_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/users/login"))
      .and(body_json(json!({ "user": "rosa", "clave": "secreto" })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "idUsuario": 9,
        "user": "rosa",
        "estado": "ACTIVO",
        "token": "opaque"
      })))
      .expect(1)
      .mount(&server)
      .await;

    let session = client_for(&server.uri())
      .login("rosa", "secreto")
      .await
      .unwrap();
    assert_eq!(session.token(), Some("opaque"));
    assert!(session.is_authenticated());
  }

  #[tokio::test]
  async fn login_without_token_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/users/login"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({ "user": "rosa" })),
      )
      .mount(&server)
      .await;

    let err = client_for(&server.uri())
      .login("rosa", "x")
      .await
      .unwrap_err();
    assert!(matches!(err.diagnostic, Diagnostic::Message(_)));
  }
}
