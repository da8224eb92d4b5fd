use std::cmp::Reverse;

use crate::store::{NoteEntry, NoteStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewLine {
    Content { number: usize, text: String },
    /// Stands in for line `number` and everything after it.
    Truncated { number: usize },
}

impl PreviewLine {
    pub fn number(&self) -> usize {
        match self {
            PreviewLine::Content { number, .. } | PreviewLine::Truncated { number } => *number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePreview {
    pub key: String,
    pub executable: bool,
    pub lines: Vec<PreviewLine>,
}

/// Most recently created first; ties fall back to key order so output is stable.
pub fn sort_recent(mut entries: Vec<NoteEntry>) -> Vec<NoteEntry> {
    entries.sort_by(|a, b| {
        Reverse(a.created_at)
            .cmp(&Reverse(b.created_at))
            .then_with(|| a.key.cmp(&b.key))
    });
    entries
}

pub fn list_all(store: &NoteStore) -> Result<Vec<NoteEntry>, StoreError> {
    Ok(sort_recent(store.list()?))
}

pub fn preview_lines(text: &str, max_lines: usize) -> Vec<PreviewLine> {
    let mut lines = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if idx >= max_lines {
            lines.push(PreviewLine::Truncated { number: idx + 1 });
            break;
        }
        lines.push(PreviewLine::Content {
            number: idx + 1,
            text: line.trim_end().to_string(),
        });
    }
    lines
}

/// The `limit` most recent notes, each with at most `max_lines` numbered lines.
pub fn list_recent(
    store: &NoteStore,
    limit: usize,
    max_lines: usize,
) -> Result<Vec<NotePreview>, StoreError> {
    list_all(store)?
        .into_iter()
        .take(limit)
        .map(|entry| {
            let text = store.read(&entry.key).map_err(|err| match err {
                StoreError::NotFound(key) => StoreError::Io {
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "note disappeared while listing",
                    ),
                    key,
                },
                other => other,
            })?;
            Ok(NotePreview {
                lines: preview_lines(&text, max_lines),
                key: entry.key,
                executable: entry.executable,
            })
        })
        .collect()
}
