use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of client-generated ids that have not round-tripped to the server.
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// A scheduled or past live class instance.
///
/// `status` is never stored; see [`SessionRecord::status_at`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    /// The class/course this session belongs to
    pub course_id: String,
    pub title: String,
    pub subject: String,
    pub topic: String,
    pub instructor_name: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub meeting_link: String,
    pub meeting_platform: MeetingPlatform,
    /// Provenance inside the reconciliation engine. Persisted in the local
    /// cache only; the remote wire format has no such field.
    #[serde(default)]
    pub source: RecordSource,
}

/// Provenance is not part of record identity.
impl PartialEq for SessionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.course_id == other.course_id
            && self.title == other.title
            && self.subject == other.subject
            && self.topic == other.topic
            && self.instructor_name == other.instructor_name
            && self.start_time == other.start_time
            && self.duration_minutes == other.duration_minutes
            && self.meeting_link == other.meeting_link
            && self.meeting_platform == other.meeting_platform
    }
}

impl Eq for SessionRecord {}

impl SessionRecord {
    /// Temporary id derived from the creation instant.
    pub fn temporary_id(created_at: DateTime<Utc>) -> String {
        format!("{}{}", TEMP_ID_PREFIX, created_at.timestamp_millis())
    }

    pub fn is_temporary(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
    }

    /// Exclusive end of the `[start, end)` interval. Saturates at the
    /// latest representable instant, so such a session never completes.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        derive_status(self, now)
    }

    pub fn correlation_key(&self) -> CorrelationKey {
        CorrelationKey {
            topic: self.topic.trim().to_string(),
            start_time: self.start_time,
            instructor_name: self.instructor_name.trim().to_string(),
        }
    }

    pub fn with_source(mut self, source: RecordSource) -> Self {
        self.source = source;
        self
    }

    /// Normalised link ready to hand to a link opener.
    pub fn resolved_link(&self) -> Option<String> {
        normalize_meeting_link(&self.meeting_link)
    }
}

/// Ascending by start time, ties broken by id.
pub fn chronological(a: &SessionRecord, b: &SessionRecord) -> Ordering {
    a.start_time
        .cmp(&b.start_time)
        .then_with(|| a.id.cmp(&b.id))
}

/// Status derived purely from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Upcoming,
    Live,
    Completed,
}

impl SessionStatus {
    pub fn label(&self) -> &str {
        match self {
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::Live => "live",
            SessionStatus::Completed => "completed",
        }
    }
}

pub fn derive_status(record: &SessionRecord, now: DateTime<Utc>) -> SessionStatus {
    if now < record.start_time {
        SessionStatus::Upcoming
    } else if now < record.end_time() {
        SessionStatus::Live
    } else {
        SessionStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordSource {
    #[default]
    Remote,
    LocalPending,
}

/// Business key used to match an optimistic copy with its confirmed record
/// when the ids differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationKey {
    pub topic: String,
    pub start_time: DateTime<Utc>,
    pub instructor_name: String,
}

/// Video-conferencing provider. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPlatform {
    GoogleMeet,
    Zoom,
    MicrosoftTeams,
    #[default]
    Other,
}

impl MeetingPlatform {
    pub fn label(&self) -> &str {
        match self {
            MeetingPlatform::GoogleMeet => "Google Meet",
            MeetingPlatform::Zoom => "Zoom",
            MeetingPlatform::MicrosoftTeams => "Microsoft Teams",
            MeetingPlatform::Other => "Other",
        }
    }

    /// Best guess from the link host.
    pub fn from_link(link: &str) -> Self {
        let host = link_host(link);
        if host == "meet.google.com" {
            MeetingPlatform::GoogleMeet
        } else if host == "zoom.us" || host.ends_with(".zoom.us") {
            MeetingPlatform::Zoom
        } else if host == "teams.microsoft.com" || host == "teams.live.com" {
            MeetingPlatform::MicrosoftTeams
        } else {
            MeetingPlatform::Other
        }
    }
}

fn link_host(link: &str) -> String {
    let trimmed = link.trim();
    let rest = match trimmed.find("://") {
        Some(pos) => &trimmed[pos + 3..],
        None => trimmed.trim_start_matches("//"),
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or("");
    host.split(':').next().unwrap_or("").to_ascii_lowercase()
}

/// Prepends `https://` when the link carries no scheme.
///
/// Returns `None` for an empty or whitespace-only link.
pub fn normalize_meeting_link(link: &str) -> Option<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return None;
    }
    if has_scheme(trimmed) {
        return Some(trimmed.to_string());
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    Some(format!("https://{}", trimmed))
}

fn has_scheme(link: &str) -> bool {
    match link.find("://") {
        Some(pos) if pos > 0 => {
            let scheme = &link[..pos];
            scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Result of a listing operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    pub sessions: Vec<SessionRecord>,
    /// Remote was unavailable and the cache fallback was served
    pub degraded: bool,
}

/// Outcome of a join: the link for the caller to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub session_id: String,
    pub resolved_link: String,
    pub meeting_platform: MeetingPlatform,
}
