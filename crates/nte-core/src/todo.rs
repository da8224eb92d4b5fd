use chrono::Local;

use crate::store::{NoteStore, StoreError};

/// Document that checklist commands use when no key is given.
pub const DEFAULT_TODO_KEY: &str = "TODOS";

pub const OPEN_MARKER: &str = "- [ ] ";
pub const CLOSED_MARKER: &str = "- [x]";

pub fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

pub fn open_item(task: &str) -> String {
    format!("{}{}", OPEN_MARKER, task)
}

pub fn closed_item(task: &str, completed_at: &str) -> String {
    format!("{} {} (Completed: {})", CLOSED_MARKER, task, completed_at)
}

/// Close the first open item for `task`. Returns `None` when no open item matches.
pub fn mark_done_text(text: &str, task: &str, completed_at: &str) -> Option<String> {
    let open = open_item(task);
    if !text.contains(&open) {
        return None;
    }
    Some(text.replacen(&open, &closed_item(task, completed_at), 1))
}

/// Drops closed items. Blank lines are dropped too.
pub fn clear_completed_text(text: &str) -> String {
    text.lines()
        .filter(|line| !line.is_empty() && !line.starts_with(CLOSED_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops every item whose text after the first `] ` equals `task`. Blank lines are dropped
/// too; lines without a marker are kept.
pub fn remove_task_text(text: &str, task: &str) -> String {
    text.lines()
        .filter(|line| !line.is_empty())
        .filter(|line| match line.split_once("] ") {
            Some((_, item)) => item != task,
            None => true,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn add_task(store: &NoteStore, key: &str, task: &str) -> Result<(), StoreError> {
    store.append(key, &open_item(task), "\n")
}

/// Mark `task` done in the document at `key`.
///
/// When no open item matches and `allow_create` is set, the item is added first and then
/// closed, so the document ends up with a single closed line for it. Without
/// `allow_create` the document is left untouched.
pub fn complete_task(
    store: &NoteStore,
    key: &str,
    task: &str,
    allow_create: bool,
) -> Result<(), StoreError> {
    let existing = match store.read(key) {
        Ok(text) => text,
        Err(StoreError::NotFound(_)) if allow_create => String::new(),
        Err(err) => return Err(err),
    };
    let completed_at = now_timestamp();
    if let Some(updated) = mark_done_text(&existing, task, &completed_at) {
        return store.write(key, &updated, true);
    }
    if !allow_create {
        return Err(StoreError::TaskNotFound {
            task: task.to_string(),
        });
    }
    add_task(store, key, task)?;
    let existing = store.read(key)?;
    let updated = mark_done_text(&existing, task, &completed_at).ok_or_else(|| {
        StoreError::TaskNotFound {
            task: task.to_string(),
        }
    })?;
    store.write(key, &updated, true)
}

pub fn clear_completed(store: &NoteStore, key: &str) -> Result<(), StoreError> {
    let existing = store.read(key)?;
    store.write(key, &clear_completed_text(&existing), true)
}

pub fn remove_task(store: &NoteStore, key: &str, task: &str) -> Result<(), StoreError> {
    let existing = store.read(key)?;
    store.write(key, &remove_task_text(&existing, task), true)
}
