//! Pre-flight checks run before any store mutation is attempted.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::session::{MeetingPlatform, RecordSource, SessionRecord};

/// Durations offered by the scheduling form, in minutes.
pub const DEFAULT_DURATIONS: [u32; 5] = [30, 45, 60, 90, 120];

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Form-shaped input from the admin scheduling screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionDraft {
    /// The selected class/course
    pub course_id: String,
    pub title: String,
    pub subject: String,
    pub topic: String,
    pub instructor_name: String,
    /// RFC 3339, or `datetime-local` form input without an offset
    pub start_time: String,
    pub duration_minutes: u32,
    pub meeting_link: Option<String>,
    pub meeting_platform: Option<MeetingPlatform>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingRules {
    pub allowed_durations: Vec<u32>,
    /// Offset applied to start times entered without one
    pub default_utc_offset_minutes: i32,
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            allowed_durations: DEFAULT_DURATIONS.to_vec(),
            default_utc_offset_minutes: 0,
        }
    }
}

/// Validates a draft and turns it into a record carrying a temporary id.
///
/// Fields are checked in form order: course, topic, start time, meeting
/// link, instructor; the duration is checked last.
pub fn validate_for_scheduling(
    draft: &SessionDraft,
    rules: &SchedulingRules,
    now: DateTime<Utc>,
) -> Result<SessionRecord, ValidationError> {
    let course_id = required(&draft.course_id, "course_id")?;
    let topic = required(&draft.topic, "topic")?;

    let start_input = required(&draft.start_time, "start_time")?;
    let start_time = parse_start_time(&start_input, rules.default_utc_offset_minutes)
        .ok_or_else(|| ValidationError::InvalidStartTime(start_input.clone()))?;

    let meeting_link = match &draft.meeting_link {
        None => return Err(ValidationError::MissingField("meeting_link")),
        Some(link) if link.trim().is_empty() => return Err(ValidationError::InvalidLink),
        Some(link) => link.trim().to_string(),
    };

    let instructor_name = required(&draft.instructor_name, "instructor_name")?;

    if !rules.allowed_durations.contains(&draft.duration_minutes) {
        return Err(ValidationError::InvalidDuration(draft.duration_minutes));
    }

    let title = match draft.title.trim() {
        "" => topic.clone(),
        t => t.to_string(),
    };
    let meeting_platform = draft
        .meeting_platform
        .unwrap_or_else(|| MeetingPlatform::from_link(&meeting_link));

    Ok(SessionRecord {
        id: SessionRecord::temporary_id(now),
        course_id,
        title,
        subject: draft.subject.trim().to_string(),
        topic,
        instructor_name,
        start_time,
        duration_minutes: draft.duration_minutes,
        meeting_link,
        meeting_platform,
        source: RecordSource::LocalPending,
    })
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parses RFC 3339, falling back to offset-less local input.
pub fn parse_start_time(input: &str, default_utc_offset_minutes: i32) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    let offset = FixedOffset::east_opt(default_utc_offset_minutes.checked_mul(60)?)?;
    LOCAL_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(input, fmt).ok()?;
        offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    })
}
