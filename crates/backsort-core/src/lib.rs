//! # backsort-core
//!
//! Recency ordering for backlink entries.
//!
//! This crate is the pure engine; it renders nothing and owns no storage:
//! - [`label`]: pull a label (usually a note title) out of a rendered entry
//! - [`resolver`]: map a label to a timestamp through a fixed fallback chain
//! - [`sort`]: stable ordering by timestamp, newest or oldest first
//! - [`order`]: the three steps above as one pass
//! - [`metadata`]: the read-only seam to whatever stores note metadata
//! - [`frontmatter`]: YAML frontmatter parsing for markdown notes
//! - [`config`]: user [`Settings`]
//! - Error hierarchy ([`BacksortError`], [`ConfigError`])

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod label;
pub mod metadata;
pub mod order;
pub mod resolver;
pub mod sort;
pub mod temporal;

pub use config::{Settings, SurfaceKind};
pub use error::{BacksortError, ConfigError, Result};
pub use label::{extract_label, EntryNode, LabelExtractor, NodeRole, TreeLabelExtractor};
pub use metadata::{Frontmatter, LookupFn, MetadataLookup, MetadataRecord, NoMetadata};
pub use order::{order_entries, order_labels};
pub use resolver::{resolve_timestamp, Resolution, Resolver, TimestampSource, UNKNOWN_TIMESTAMP};
pub use sort::sort_entries;
