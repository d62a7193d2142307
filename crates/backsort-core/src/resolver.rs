//! Timestamp resolution for backlink labels.
//!
//! A label is mapped to one point in time by walking a fixed chain of
//! sources, most specific first. Each stage either produces a timestamp
//! or declines; the first success wins. Labels nothing can date resolve
//! to [`UNKNOWN_TIMESTAMP`].
//!
//! | # | Source | Example |
//! |---|--------|---------|
//! | 1 | whole label is a long-form date | `December 4th, 2025` |
//! | 2 | label embeds `[[<long-form date>]]` | `# [[August 12th, 2025]] call` |
//! | 3 | whole label is an ISO date | `2025-10-07` |
//! | 4 | `edited`, then `created` frontmatter of the named note | `edited: 2025-10-07` |
//! | 5 | last-modified time of the named note | |
//! | 6 | last-modified time of `<daily notes>/<label>.md` | |
//! | 7 | unknown | `0` |

use serde::Serialize;

use crate::config::{Settings, DEFAULT_DAILY_NOTES_FOLDER};
use crate::metadata::{MetadataLookup, MetadataRecord};
use crate::temporal::{find_embedded_long_form, midnight_millis, parse_iso_date, parse_long_form};

/// Sentinel for "no date could be determined". Sorts as the oldest instant.
pub const UNKNOWN_TIMESTAMP: i64 = 0;

/// Suffix appended to a label to form a document reference.
pub const NOTE_EXTENSION: &str = ".md";

/// Frontmatter fields consulted, in priority order.
pub const FRONTMATTER_DATE_FIELDS: [&str; 2] = ["edited", "created"];

/// Which stage of the chain produced a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    LongFormTitle,
    EmbeddedLongForm,
    IsoTitle,
    /// Frontmatter field, `edited` or `created`.
    Frontmatter(&'static str),
    LastModified,
    DailyNoteModified,
    Unknown,
}

/// A resolved timestamp together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Milliseconds since the Unix epoch, or [`UNKNOWN_TIMESTAMP`].
    pub timestamp: i64,
    pub source: TimestampSource,
}

impl Resolution {
    const fn new(timestamp: i64, source: TimestampSource) -> Self {
        Self { timestamp, source }
    }

    const fn unknown() -> Self {
        Self::new(UNKNOWN_TIMESTAMP, TimestampSource::Unknown)
    }

    /// Whether any stage produced a real timestamp.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.source != TimestampSource::Unknown
    }
}

/// Resolves labels to timestamps.
///
/// Holds no state between calls: resolving the same label against the
/// same metadata always gives the same answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    daily_notes_folder: String,
    debug: bool,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            daily_notes_folder: DEFAULT_DAILY_NOTES_FOLDER.to_string(),
            debug: false,
        }
    }
}

impl Resolver {
    #[must_use]
    pub fn new(daily_notes_folder: impl Into<String>) -> Self {
        Self {
            daily_notes_folder: daily_notes_folder.into(),
            debug: false,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            daily_notes_folder: settings.daily_notes_folder.clone(),
            debug: settings.debug_mode,
        }
    }

    /// Emit a `debug` trace for every resolution.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn daily_notes_folder(&self) -> &str {
        &self.daily_notes_folder
    }

    /// Resolve a label to a timestamp in milliseconds.
    #[must_use]
    pub fn resolve<L: MetadataLookup + ?Sized>(&self, label: &str, lookup: &L) -> i64 {
        self.resolve_detailed(label, lookup).timestamp
    }

    /// Resolve a label, reporting which stage of the chain matched.
    #[must_use]
    pub fn resolve_detailed<L: MetadataLookup + ?Sized>(
        &self,
        label: &str,
        lookup: &L,
    ) -> Resolution {
        let resolution = self.run_chain(label, lookup);
        if self.debug {
            tracing::debug!(
                label,
                timestamp = resolution.timestamp,
                source = ?resolution.source,
                "resolved backlink timestamp"
            );
        }
        resolution
    }

    fn run_chain<L: MetadataLookup + ?Sized>(&self, label: &str, lookup: &L) -> Resolution {
        if let Some(date) = parse_long_form(label) {
            return Resolution::new(midnight_millis(date), TimestampSource::LongFormTitle);
        }
        if let Some(date) = find_embedded_long_form(label) {
            return Resolution::new(midnight_millis(date), TimestampSource::EmbeddedLongForm);
        }
        if let Some(date) = parse_iso_date(label) {
            return Resolution::new(midnight_millis(date), TimestampSource::IsoTitle);
        }

        // Metadata stages need a name to look up
        if label.is_empty() {
            return Resolution::unknown();
        }

        if let Some(record) = self.find_note(label, lookup) {
            return frontmatter_date(&record).unwrap_or(Resolution::new(
                record.modified_ms,
                TimestampSource::LastModified,
            ));
        }

        let daily = format!("{}/{label}{NOTE_EXTENSION}", self.daily_notes_folder);
        if let Some(record) = lookup.lookup(&daily) {
            return Resolution::new(record.modified_ms, TimestampSource::DailyNoteModified);
        }

        Resolution::unknown()
    }

    fn find_note<L: MetadataLookup + ?Sized>(
        &self,
        label: &str,
        lookup: &L,
    ) -> Option<MetadataRecord> {
        lookup
            .lookup(label)
            .or_else(|| lookup.lookup(&format!("{label}{NOTE_EXTENSION}")))
    }
}

fn frontmatter_date(record: &MetadataRecord) -> Option<Resolution> {
    FRONTMATTER_DATE_FIELDS.iter().find_map(|&field| {
        let date = parse_iso_date(record.field(field)?.trim())?;
        Some(Resolution::new(
            midnight_millis(date),
            TimestampSource::Frontmatter(field),
        ))
    })
}

/// Resolve a label with the default resolver.
#[must_use]
pub fn resolve_timestamp<L: MetadataLookup + ?Sized>(label: &str, lookup: &L) -> i64 {
    Resolver::default().resolve(label, lookup)
}
