//! Rendering of resolved entries for the terminal.

use std::io::Write;

use chrono::DateTime;
use serde::Serialize;

use backsort_core::{Resolution, SurfaceKind, TimestampSource};
use backsort_host::PresentationSurface;
use backsort_vault::Backlink;

/// One output row: a label and how it resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub timestamp: i64,
    pub date: Option<String>,
    pub source: TimestampSource,
}

impl Row {
    pub fn new(label: &str, resolution: Resolution) -> Self {
        Self {
            label: label.to_string(),
            path: None,
            timestamp: resolution.timestamp,
            date: resolution
                .is_known()
                .then(|| format_date(resolution.timestamp))
                .flatten(),
            source: resolution.source,
        }
    }

    pub fn with_path(mut self, path: String) -> Self {
        self.path = Some(path);
        self
    }
}

/// `YYYY-MM-DD` of a millisecond timestamp, in UTC.
pub fn format_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp).map(|dt| dt.format("%Y-%m-%d").to_string())
}

fn source_name(source: TimestampSource) -> String {
    match source {
        TimestampSource::LongFormTitle => "title".to_string(),
        TimestampSource::EmbeddedLongForm => "embedded title date".to_string(),
        TimestampSource::IsoTitle => "iso title".to_string(),
        TimestampSource::Frontmatter(field) => format!("frontmatter {field}"),
        TimestampSource::LastModified => "last modified".to_string(),
        TimestampSource::DailyNoteModified => "daily note modified".to_string(),
        TimestampSource::Unknown => "unknown".to_string(),
    }
}

/// Format rows as an aligned `label | date | source` table.
pub fn format_table(rows: &[Row]) -> String {
    let headers = ["label", "date", "source"];
    let cells: Vec<[String; 3]> = rows
        .iter()
        .map(|row| {
            [
                row.label.clone(),
                row.date.clone().unwrap_or_else(|| "-".to_string()),
                source_name(row.source),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let line = |cols: [&str; 3]| {
        cols.iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };
    output.push_str(&line(headers));
    output.push('\n');
    output.push_str(&widths.map(|w| "-".repeat(w)).join("-+-"));
    output.push('\n');
    for row in &cells {
        output.push_str(&line([&row[0], &row[1], &row[2]]));
        output.push('\n');
    }
    output
}

/// Presentation surface that prints the backlink list every time an order
/// is applied.
pub struct PrintSurface<W> {
    kind: SurfaceKind,
    entries: Vec<Backlink>,
    out: W,
}

impl<W: Write> PrintSurface<W> {
    pub fn new(kind: SurfaceKind, entries: Vec<Backlink>, out: W) -> Self {
        Self { kind, entries, out }
    }

    /// Replace the list, as a host does when it re-renders after a change.
    pub fn refresh(&mut self, entries: Vec<Backlink>) {
        self.entries = entries;
    }

    /// Print the current list.
    pub fn print(&mut self) {
        let mut text = String::new();
        for (idx, backlink) in self.entries.iter().enumerate() {
            text.push_str(&format!("{:>3}. {}\n", idx + 1, backlink.label));
        }
        text.push('\n');
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to print backlinks");
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PresentationSurface for PrintSurface<W> {
    type Entry = Backlink;

    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn entries(&self) -> Vec<Backlink> {
        self.entries.clone()
    }

    fn apply_order(&mut self, order: Vec<Backlink>) {
        self.entries = order;
        self.print();
    }
}
