use crate::store::{NoteStore, StoreError};
use crate::todo::now_timestamp;

pub const EVENTS_SUFFIX: &str = "_events";

pub fn events_key(subject: &str) -> String {
    format!("{}{}", subject, EVENTS_SUFFIX)
}

pub fn event_line(timestamp: &str, details: &str) -> String {
    format!("- *{}* {}", timestamp, details).trim_end().to_string()
}

pub fn record_event(store: &NoteStore, subject: &str, details: &str) -> Result<(), StoreError> {
    let key = events_key(subject);
    store.append(&key, &event_line(&now_timestamp(), details), "\n")
}

/// Recorded events for `subject`, latest first.
pub fn read_events(store: &NoteStore, subject: &str) -> Result<Vec<String>, StoreError> {
    let text = store.read(&events_key(subject))?;
    Ok(text.lines().rev().map(str::to_string).collect())
}
