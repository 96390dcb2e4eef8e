//! REST adapter for the live-class backend.
//!
//! Every endpoint answers with the envelope `{ success, data?, message? }`.
//! Uses browser `fetch()` via gloo-net for WASM compatibility.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use classroom_core::ports::RemoteSessionStore;
use classroom_types::{
    config::DirectoryConfig,
    session::{chronological, MeetingPlatform, RecordSource, SessionRecord},
    DirectoryError, Result,
};

use crate::timeout::with_timeout;

pub struct HttpSessionStore {
    base_url: String,
    timeout_ms: u64,
}

impl HttpSessionStore {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            base_url: config.api_base.trim().trim_end_matches('/').to_string(),
            timeout_ms: config.request_timeout_ms,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/live-classes{}", self.base_url, path)
    }

    fn session_url(&self, id: &str, suffix: &str) -> String {
        let encoded: String = js_sys::encode_uri_component(id).into();
        self.url(&format!("/{}{}", encoded, suffix))
    }

    /// Send `request` and unwrap the envelope, all under one deadline.
    /// `missing_id` turns a 404 into `NotFound`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: Request,
        missing_id: Option<&str>,
    ) -> Result<Option<T>> {
        let method = request.method();
        let url = request.url();
        log::debug!("{:?} {}", method, url);

        let result = with_timeout(self.timeout_ms, async {
            let response = request
                .send()
                .await
                .map_err(|e| DirectoryError::Network(e.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| DirectoryError::Network(e.to_string()))?;
            decode_envelope(status, &body, missing_id)
        })
        .await;

        if let Err(e) = &result {
            log::warn!("{:?} {} failed: {}", method, url, e);
        }
        result
    }

    async fn list(&self, path: &str) -> Result<Vec<SessionRecord>> {
        let request = Request::get(&self.url(path))
            .header("Accept", "application/json")
            .build()
            .map_err(|e| DirectoryError::Network(e.to_string()))?;
        let data: Option<Vec<ApiSession>> = self.execute(request, None).await?;
        let mut sessions: Vec<SessionRecord> = data
            .unwrap_or_default()
            .into_iter()
            .map(SessionRecord::from)
            .collect();
        sessions.sort_by(chronological);
        Ok(sessions)
    }
}

#[async_trait(?Send)]
impl RemoteSessionStore for HttpSessionStore {
    async fn list_upcoming(&self) -> Result<Vec<SessionRecord>> {
        self.list("/upcoming").await
    }

    async fn list_live(&self) -> Result<Vec<SessionRecord>> {
        self.list("/live").await
    }

    async fn create(&self, draft: &SessionRecord) -> Result<SessionRecord> {
        let request = Request::post(&self.url(""))
            .header("Accept", "application/json")
            .json(&NewSessionBody::from(draft))
            .map_err(|e| DirectoryError::Serialization(e.to_string()))?;
        let created: Option<ApiSession> = self.execute(request, None).await?;
        let created = created.ok_or_else(|| {
            DirectoryError::RemoteRejected("create returned no session".to_string())
        })?;
        Ok(created.into())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = Request::delete(&self.session_url(id, ""))
            .build()
            .map_err(|e| DirectoryError::Network(e.to_string()))?;
        let _: Option<serde_json::Value> = self.execute(request, Some(id)).await?;
        Ok(())
    }

    async fn record_join(&self, id: &str) -> Result<()> {
        let request = Request::post(&self.session_url(id, "/join"))
            .build()
            .map_err(|e| DirectoryError::Network(e.to_string()))?;
        let _: Option<serde_json::Value> = self.execute(request, None).await?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}

// ─── Wire format ─────────────────────────────────────────────

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    success: Option<bool>,
    data: Option<T>,
    message: Option<String>,
}

/// Interpret one response. An absent `success` flag defers to the HTTP
/// status; a non-JSON error page becomes `RemoteRejected("HTTP <status>")`.
pub fn decode_envelope<T: DeserializeOwned>(
    status: u16,
    body: &str,
    missing_id: Option<&str>,
) -> Result<Option<T>> {
    let http_ok = (200..300).contains(&status);

    let envelope: Option<ApiEnvelope<T>> = if body.trim().is_empty() {
        None
    } else {
        match serde_json::from_str(body) {
            Ok(envelope) => Some(envelope),
            Err(e) if http_ok => return Err(e.into()),
            Err(_) => None,
        }
    };

    if status == 404 {
        if let Some(id) = missing_id {
            return Err(DirectoryError::NotFound(id.to_string()));
        }
    }

    let (success, data, message) = match envelope {
        Some(e) => (e.success.unwrap_or(http_ok), e.data, e.message),
        None => (http_ok, None, None),
    };

    if !http_ok || !success {
        return Err(DirectoryError::RemoteRejected(
            message.unwrap_or_else(|| format!("HTTP {}", status)),
        ));
    }
    Ok(data)
}

/// Session as the server reports it. Server-side defaults fill the gaps.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSession {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    course_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    instructor_name: String,
    start_time: DateTime<Utc>,
    #[serde(alias = "duration")]
    duration_minutes: u32,
    #[serde(default)]
    meeting_link: String,
    #[serde(default)]
    meeting_platform: Option<String>,
}

impl From<ApiSession> for SessionRecord {
    fn from(api: ApiSession) -> Self {
        let meeting_platform = parse_platform(api.meeting_platform.as_deref(), &api.meeting_link);
        let title = if api.title.trim().is_empty() {
            api.topic.clone()
        } else {
            api.title
        };
        SessionRecord {
            id: api.id,
            course_id: api.course_id,
            title,
            subject: api.subject,
            topic: api.topic,
            instructor_name: api.instructor_name,
            start_time: api.start_time,
            duration_minutes: api.duration_minutes,
            meeting_link: api.meeting_link,
            meeting_platform,
            source: RecordSource::Remote,
        }
    }
}

/// Accepts `google_meet`, `Google Meet`, `google-meet` and so on; anything
/// unrecognised is inferred from the link host.
fn parse_platform(label: Option<&str>, link: &str) -> MeetingPlatform {
    let folded: String = label
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match folded.as_str() {
        "googlemeet" | "meet" => MeetingPlatform::GoogleMeet,
        "zoom" => MeetingPlatform::Zoom,
        "microsoftteams" | "teams" => MeetingPlatform::MicrosoftTeams,
        _ => MeetingPlatform::from_link(link),
    }
}

/// Create payload: no id and no provenance.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewSessionBody<'a> {
    course_id: &'a str,
    title: &'a str,
    subject: &'a str,
    topic: &'a str,
    instructor_name: &'a str,
    start_time: &'a DateTime<Utc>,
    duration_minutes: u32,
    meeting_link: &'a str,
    meeting_platform: MeetingPlatform,
}

impl<'a> From<&'a SessionRecord> for NewSessionBody<'a> {
    fn from(record: &'a SessionRecord) -> Self {
        Self {
            course_id: &record.course_id,
            title: &record.title,
            subject: &record.subject,
            topic: &record.topic,
            instructor_name: &record.instructor_name,
            start_time: &record.start_time,
            duration_minutes: record.duration_minutes,
            meeting_link: &record.meeting_link,
            meeting_platform: record.meeting_platform,
        }
    }
}

/// Serialized create payload, exposed for inspection.
pub fn create_body(record: &SessionRecord) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(NewSessionBody::from(record))?)
}

/// Parse one server session object.
pub fn parse_session(value: serde_json::Value) -> Result<SessionRecord> {
    let api: ApiSession = serde_json::from_value(value)?;
    Ok(api.into())
}
