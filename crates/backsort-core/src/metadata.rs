//! Metadata records and the lookup seam the resolver reads through.
//!
//! The store behind a [`MetadataLookup`] is owned by someone else (the
//! host application, a vault directory, a test fixture). The resolver only
//! asks it questions by reference name and never writes to it.

use std::collections::{BTreeMap, HashMap};

/// Flattened frontmatter of one document: scalar keys and values as strings.
pub type Frontmatter = BTreeMap<String, String>;

/// Read-only metadata of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Frontmatter fields, if the document has a frontmatter block.
    pub frontmatter: Option<Frontmatter>,
    /// Last-modified instant, milliseconds since the Unix epoch.
    pub modified_ms: i64,
}

impl MetadataRecord {
    /// A record with no frontmatter.
    #[must_use]
    pub fn new(modified_ms: i64) -> Self {
        Self {
            frontmatter: None,
            modified_ms,
        }
    }

    /// Attach a frontmatter field, creating the block if needed.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.frontmatter
            .get_or_insert_with(Frontmatter::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a frontmatter field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|fm| fm.get(key))
            .map(String::as_str)
    }
}

/// Fetches a document's metadata by reference name (a vault-relative path
/// such as `Meeting Notes.md` or `Daily Notes/August 12th, 2025.md`).
///
/// Returning `None` means "no such document"; it is never an error.
pub trait MetadataLookup {
    fn lookup(&self, reference: &str) -> Option<MetadataRecord>;
}

impl<T: MetadataLookup + ?Sized> MetadataLookup for &T {
    fn lookup(&self, reference: &str) -> Option<MetadataRecord> {
        (**self).lookup(reference)
    }
}

impl MetadataLookup for HashMap<String, MetadataRecord> {
    fn lookup(&self, reference: &str) -> Option<MetadataRecord> {
        self.get(reference).cloned()
    }
}

impl MetadataLookup for BTreeMap<String, MetadataRecord> {
    fn lookup(&self, reference: &str) -> Option<MetadataRecord> {
        self.get(reference).cloned()
    }
}

/// A store with no documents. Every lookup declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataLookup for NoMetadata {
    fn lookup(&self, _reference: &str) -> Option<MetadataRecord> {
        None
    }
}

/// Adapts a closure into a [`MetadataLookup`].
pub struct LookupFn<F>(pub F);

impl<F> MetadataLookup for LookupFn<F>
where
    F: Fn(&str) -> Option<MetadataRecord>,
{
    fn lookup(&self, reference: &str) -> Option<MetadataRecord> {
        (self.0)(reference)
    }
}
