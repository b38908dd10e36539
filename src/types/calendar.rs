use serde::{Deserialize, Serialize};

/// Start or end of a calendar event. Timed events carry `dateTime`,
/// all-day events carry only `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// A read-only event from the external calendar feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default)]
    pub html_link: String,
}

impl CalendarEvent {
    pub fn is_all_day(&self) -> bool {
        self.start.date_time.is_none()
    }

    /// The raw start value, preferring the timed form.
    pub fn start_value(&self) -> Option<&str> {
        self.start
            .date_time
            .as_deref()
            .or(self.start.date.as_deref())
    }
}
