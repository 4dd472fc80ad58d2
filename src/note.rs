use crate::error::{Result, StoreError};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format used for `created_at` when the store stamps a draft itself.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const UNTITLED_PLACEHOLDER: &str = "Untitled Note";

const ACCEPTED_FORMATS: &[&str] = &[CREATED_AT_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub recording_path: String,
}

impl Note {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_PLACEHOLDER
        } else {
            &self.title
        }
    }

    /// Tags split on commas, trimmed, empty labels dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn has_recording(&self) -> bool {
        !self.recording_path.is_empty()
    }

    pub fn created_at_sort_key(&self) -> NaiveDateTime {
        parse_created_at(&self.created_at)
    }
}

/// Parses a stored timestamp. Anything unparsable maps to the oldest
/// representable date so it sorts last.
pub fn parse_created_at(raw: &str) -> NaiveDateTime {
    let raw = raw.trim();
    for format in ACCEPTED_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return parsed;
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.naive_utc();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

pub fn now_created_at() -> String {
    Local::now().format(CREATED_AT_FORMAT).to_string()
}

/// A note as produced by the recording screen, before the store assigns an id.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub recording_path: Option<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_recording_path(mut self, path: impl Into<String>) -> Self {
        self.recording_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }
        Ok(())
    }

    pub(crate) fn into_note(self, id: String) -> Note {
        Note {
            id,
            title: self.title,
            content: self.content,
            created_at: self.created_at.unwrap_or_else(now_created_at),
            tags: self.tags.unwrap_or_default(),
            is_liked: false,
            recording_path: self.recording_path.unwrap_or_default(),
        }
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl NotePatch {
    pub fn tags(tags: impl Into<String>) -> Self {
        Self {
            tags: Some(tags.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }

    /// Returns whether anything changed.
    pub fn apply(&self, note: &mut Note) -> bool {
        let before = note.clone();
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(tags) = &self.tags {
            note.tags = tags.clone();
        }
        *note != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_and_date_only_formats() {
        let full = parse_created_at("2024-06-01 13:45:10");
        assert_eq!(full.to_string(), "2024-06-01 13:45:10");
        let date_only = parse_created_at("2024-01-01");
        assert_eq!(date_only.to_string(), "2024-01-01 00:00:00");
        assert!(full > date_only);
    }

    #[test]
    fn unparsable_timestamp_is_minimum() {
        assert_eq!(parse_created_at("yesterday"), NaiveDateTime::MIN);
        assert_eq!(parse_created_at(""), NaiveDateTime::MIN);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let note: Note = serde_json::from_str(r#"{"id":"3","content":"hi"}"#).unwrap();
        assert_eq!(note.title, "");
        assert_eq!(note.tags, "");
        assert!(!note.is_liked);
        assert_eq!(note.recording_path, "");
    }

    #[test]
    fn tag_list_trims_at_display_time() {
        let note = Note {
            tags: " work , ideas,,".to_string(),
            ..Default::default()
        };
        assert_eq!(note.tag_list(), vec!["work", "ideas"]);
        assert_eq!(note.tags, " work , ideas,,");
    }
}
