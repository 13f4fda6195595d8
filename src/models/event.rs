use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of an event. The only legal transitions are
/// Expected -> Confirmed -> Published, plus the single-step regression
/// Confirmed -> Expected (unconfirm / reject). Published never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Expected,
    Confirmed,
    Published,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Expected => "expected",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Published => "published",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expected" => Ok(EventStatus::Expected),
            "confirmed" => Ok(EventStatus::Confirmed),
            "published" => Ok(EventStatus::Published),
            other => Err(format!("unknown event status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    /// Free-text venue label; denormalized, may differ from a linked venue entity.
    pub venue: String,
    pub start_date: NaiveDate,
    /// Optional time-of-day, HH:MM.
    pub start_time: Option<String>,
    pub status: EventStatus,
    /// True iff status == Published.
    pub is_public: bool,
    /// True iff status == Confirmed and no moderator has acted yet.
    pub awaiting_mod: bool,
    pub author_id: Uuid,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Optimistic-concurrency token; bumped on every store update.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Checks the denormalized flags against the canonical status.
    pub fn flags_consistent(&self) -> bool {
        self.is_public == (self.status == EventStatus::Published)
            && self.awaiting_mod == (self.status == EventStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub start_date: NaiveDate,
    pub start_time: Option<String>,
    pub venue: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            EventStatus::Expected,
            EventStatus::Confirmed,
            EventStatus::Published,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("draft".parse::<EventStatus>().is_err());
    }
}
