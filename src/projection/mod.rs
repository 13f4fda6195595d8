use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::event::{Event, EventStatus};

/// Map-rendered point for an event with known coordinates. Color and radius
/// are a fixed presentation contract keyed on status, kept for visual parity
/// with the calendar UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub event_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub color: &'static str,
    pub radius: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarProjection {
    /// Events grouped by start date, for calendar-cell dot rendering.
    pub by_date: BTreeMap<NaiveDate, Vec<Event>>,
    /// Side-panel list: published first, then confirmed, then expected,
    /// date ascending within each status. Filtered to the selected date
    /// when one is given.
    pub ordered: Vec<Event>,
    /// Only events carrying both coordinates.
    pub markers: Vec<Marker>,
}

pub fn marker_style(status: EventStatus) -> (&'static str, u8) {
    match status {
        EventStatus::Published => ("blue", 8),
        EventStatus::Confirmed => ("green", 7),
        EventStatus::Expected => ("orange", 5),
    }
}

fn status_rank(status: EventStatus) -> u8 {
    match status {
        EventStatus::Published => 0,
        EventStatus::Confirmed => 1,
        EventStatus::Expected => 2,
    }
}

/// Pure read-side transformation; never mutates its input and is safe to
/// re-run on every render tick.
pub fn project(events: &[Event], selected_date: Option<NaiveDate>) -> CalendarProjection {
    let mut by_date: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        by_date
            .entry(event.start_date)
            .or_default()
            .push(event.clone());
    }

    let mut ordered: Vec<Event> = events
        .iter()
        .filter(|e| selected_date.map_or(true, |d| e.start_date == d))
        .cloned()
        .collect();
    ordered.sort_by(|a, b| {
        status_rank(a.status)
            .cmp(&status_rank(b.status))
            .then(a.start_date.cmp(&b.start_date))
    });

    let markers = events
        .iter()
        .filter_map(|e| match (e.lat, e.lng) {
            (Some(lat), Some(lng)) => {
                let (color, radius) = marker_style(e.status);
                Some(Marker {
                    event_id: e.id,
                    lat,
                    lng,
                    color,
                    radius,
                })
            }
            _ => None,
        })
        .collect();

    CalendarProjection {
        by_date,
        ordered,
        markers,
    }
}
