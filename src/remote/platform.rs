// file: src/remote/platform.rs
// description: note.com draft client with an explicit per-run session
// reference: https://docs.rs/reqwest/latest/reqwest/cookie/index.html

use crate::error::{PipelineError, Result};
use crate::models::{DraftUpdate, NoteDraft};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Draft storage on the publishing platform.
///
/// `login` is called once per run; every later call borrows the returned
/// session, so articles processed concurrently share one authenticated
/// context without any global state.
pub trait PlatformClient: Send + Sync {
    type Session: Send + Sync;

    fn login(&self, credentials: &Credentials)
    -> impl Future<Output = Result<Self::Session>> + Send;

    fn get_draft(
        &self,
        session: &Self::Session,
        note_id: &str,
    ) -> impl Future<Output = Result<NoteDraft>> + Send;

    /// The article as readers see it, for notes that are already public.
    fn get_published(
        &self,
        session: &Self::Session,
        note_id: &str,
    ) -> impl Future<Output = Result<NoteDraft>> + Send;

    fn update_draft(
        &self,
        session: &Self::Session,
        note_id: &str,
        update: &DraftUpdate,
    ) -> impl Future<Output = Result<NoteDraft>> + Send;
}

pub struct NoteSession {
    client: Client,
    /// Cookie-less client; it only ever sees the published revision.
    public_client: Client,
    xsrf_token: Option<String>,
}

impl NoteSession {
    pub fn xsrf_token(&self) -> Option<&str> {
        self.xsrf_token.as_deref()
    }
}

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    note: UpdatePayload<'a>,
}

#[derive(Debug, Serialize)]
struct UpdatePayload<'a> {
    name: &'a str,
    body: &'a str,
    status: &'a str,
    publish_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NoteEnvelope {
    data: NoteData,
}

#[derive(Debug, Deserialize)]
struct NoteData {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl NoteData {
    fn into_draft(self, requested_id: &str) -> NoteDraft {
        let id = match self.id {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => requested_id.to_string(),
        };

        NoteDraft {
            id,
            title: self.name.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            updated_at: self.updated_at,
        }
    }
}

pub struct NoteClient {
    base_url: String,
    timeout: Duration,
}

impl NoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn client_builder(&self) -> reqwest::ClientBuilder {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("note_sync/", env!("CARGO_PKG_VERSION")))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn note_endpoint(&self, note_id: &str) -> String {
        self.endpoint(&format!("/api/v3/notes/{}", note_id))
    }

    async fn parse_draft(response: Response, note_id: &str) -> Result<NoteDraft> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(unable to read error body)".to_string());
            return Err(PipelineError::fetch(
                format!("note {}", note_id),
                format!("status {}: {}", status, body.trim()),
            ));
        }

        let envelope: NoteEnvelope = response.json().await.map_err(|e| {
            PipelineError::Serialization(format!("Invalid draft payload for {}: {}", note_id, e))
        })?;

        Ok(envelope.data.into_draft(note_id))
    }
}

impl PlatformClient for NoteClient {
    type Session = NoteSession;

    async fn login(&self, credentials: &Credentials) -> Result<NoteSession> {
        let jar = Arc::new(Jar::default());
        let client = self.client_builder().cookie_provider(jar.clone()).build()?;
        let public_client = self.client_builder().build()?;

        info!("Signing in to {} as {}", self.base_url, credentials.email);

        let response = client
            .post(self.endpoint("/api/v1/sessions/sign_in"))
            .json(&SignInRequest {
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| PipelineError::AuthFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::AuthFailure(format!(
                "sign in returned status {}",
                response.status()
            )));
        }

        // The XSRF cookie is only issued once the session is used.
        let current_user = self.endpoint("/api/v2/current_user");
        let response = client
            .get(&current_user)
            .send()
            .await
            .map_err(|e| PipelineError::AuthFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::AuthFailure(format!(
                "session check returned status {}",
                response.status()
            )));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| PipelineError::Config(format!("Invalid platform URL: {}", e)))?;
        let xsrf_token = jar
            .cookies(&url)
            .and_then(|header| header.to_str().ok().and_then(xsrf_from_cookie_header));

        if xsrf_token.is_none() {
            debug!("No XSRF cookie issued; updates will be sent without a token");
        }

        Ok(NoteSession {
            client,
            public_client,
            xsrf_token,
        })
    }

    async fn get_draft(&self, session: &NoteSession, note_id: &str) -> Result<NoteDraft> {
        debug!("Fetching draft {}", note_id);

        let response = session
            .client
            .get(self.note_endpoint(note_id))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PipelineError::fetch(format!("note {}", note_id), e.to_string()))?;

        Self::parse_draft(response, note_id).await
    }

    async fn get_published(&self, session: &NoteSession, note_id: &str) -> Result<NoteDraft> {
        debug!("Fetching published note {}", note_id);

        let response = session
            .public_client
            .get(self.note_endpoint(note_id))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PipelineError::fetch(format!("note {}", note_id), e.to_string()))?;

        Self::parse_draft(response, note_id).await
    }

    async fn update_draft(
        &self,
        session: &NoteSession,
        note_id: &str,
        update: &DraftUpdate,
    ) -> Result<NoteDraft> {
        debug!(
            "Updating draft {} ({} bytes, {})",
            note_id,
            update.body.len(),
            update.visibility
        );

        let payload = UpdateRequest {
            note: UpdatePayload {
                name: &update.title,
                body: &update.body,
                status: update.visibility.as_str(),
                publish_at: None,
            },
        };

        let mut request = session
            .client
            .put(self.note_endpoint(note_id))
            .header("Accept", "application/json")
            .json(&payload);

        if let Some(token) = session.xsrf_token() {
            request = request.header("X-XSRF-TOKEN", token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::fetch(format!("note {}", note_id), e.to_string()))?;

        Self::parse_draft(response, note_id).await
    }
}

/// Picks the first cookie whose name mentions `xsrf` out of a `Cookie` header.
pub fn xsrf_from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.to_ascii_lowercase().contains("xsrf"))
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_xsrf_cookie_extraction() {
        assert_eq!(
            xsrf_from_cookie_header("_note_session=abc; XSRF-TOKEN=tok123"),
            Some("tok123".to_string())
        );
        assert_eq!(xsrf_from_cookie_header("_note_session=abc"), None);
        assert_eq!(xsrf_from_cookie_header("XSRF-TOKEN="), None);
    }

    #[test]
    fn test_note_envelope_parsing() {
        let envelope: NoteEnvelope = serde_json::from_str(
            r#"{"data": {"id": 42, "name": "Title", "body": "<p>x</p>", "updated_at": "2026-01-02T03:04:05+09:00"}}"#,
        )
        .unwrap();

        let draft = envelope.data.into_draft("n1");

        assert_eq!(draft.id, "42");
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.body, "<p>x</p>");
        assert_eq!(draft.updated_at.as_deref(), Some("2026-01-02T03:04:05+09:00"));
    }

    #[test]
    fn test_empty_draft_body() {
        let envelope: NoteEnvelope =
            serde_json::from_str(r#"{"data": {"name": "T", "body": null}}"#).unwrap();

        let draft = envelope.data.into_draft("n1");

        assert_eq!(draft.id, "n1");
        assert_eq!(draft.body, "");
    }

    #[test]
    fn test_update_payload_shape() {
        let update = DraftUpdate {
            title: "T".to_string(),
            body: "<p>b</p>".to_string(),
            visibility: Visibility::Draft,
        };
        let payload = UpdateRequest {
            note: UpdatePayload {
                name: &update.title,
                body: &update.body,
                status: update.visibility.as_str(),
                publish_at: None,
            },
        };

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "note": {"name": "T", "body": "<p>b</p>", "status": "draft", "publish_at": null}
            })
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("a@example.com", "hunter2");

        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }

    #[test]
    fn test_endpoints() {
        let client = NoteClient::new("https://note.com/", Duration::from_secs(5));

        assert_eq!(client.note_endpoint("n1"), "https://note.com/api/v3/notes/n1");
    }
}
