//! Daily notes keyed by date, plus small helpers over note lines.

use chrono::Local;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::store::{NoteStore, StoreError};

pub fn today_key() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Append `text` as a new line of today's note.
pub fn note_that(store: &NoteStore, text: &str) -> Result<String, StoreError> {
    let key = today_key();
    store.append(&key, text, "\n")?;
    Ok(key)
}

pub fn random_line<'a, R: Rng + ?Sized>(text: &'a str, rng: &mut R) -> Option<&'a str> {
    let lines: Vec<&str> = text.lines().collect();
    lines.choose(rng).copied()
}
