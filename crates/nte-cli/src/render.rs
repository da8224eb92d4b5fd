use colored::Colorize;

use nte_core::listing::{NotePreview, PreviewLine};
use nte_core::store::NoteEntry;

const DEFAULT_WIDTH: usize = 80;

pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width > 3)
        .unwrap_or(DEFAULT_WIDTH)
}

pub fn render_preview(note: &NotePreview, width: usize) -> Vec<String> {
    let header = if note.executable {
        note.key.white().on_green()
    } else {
        note.key.white().on_blue()
    };
    let mut out = vec![header.to_string()];
    let pad = width.saturating_sub(3);
    for line in &note.lines {
        let number = format!(" {} ", line.number()).white().on_yellow();
        let body = match line {
            PreviewLine::Content { text, .. } => format!(" {}", text),
            PreviewLine::Truncated { .. } => " ...".to_string(),
        };
        out.push(format!(
            "{}{}",
            number,
            format!("{:<pad$}", body, pad = pad).black().on_white()
        ));
    }
    out.push(String::new());
    out
}

pub fn render_entry(entry: &NoteEntry) -> String {
    if entry.executable {
        entry.key.green().to_string()
    } else {
        entry.key.clone()
    }
}
