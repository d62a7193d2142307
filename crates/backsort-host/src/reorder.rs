//! Deciding when to reorder a surface, and doing it.
//!
//! Applying an order to a surface usually makes the host announce that the
//! surface changed. Left alone, that announcement would trigger another
//! pass, which applies another order, and so on. The [`Reorderer`] breaks
//! the loop in two ways:
//! - an in-flight flag: a pass started while another is still running
//!   (re-entrantly from `apply_order`, or from another thread) is skipped;
//! - echo suppression: the first notification after an apply that shows
//!   exactly the order just applied, with every label still resolving to
//!   the same timestamp, is recognized as our own and skipped. A metadata
//!   change under an unchanged order defeats the match.
//!
//! Even without these the loop would settle, since ordering an already
//! ordered list yields the same list and nothing is applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use backsort_core::label::LabelExtractor;
use backsort_core::metadata::MetadataLookup;
use backsort_core::resolver::Resolver;
use backsort_core::sort::sort_entries;
use backsort_core::Settings;

use crate::surface::PresentationSurface;

/// Why a change notification did not lead to a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Sorting is turned off for this kind of surface.
    Disabled,
    /// Another pass is still running.
    InFlight,
    /// The notification was caused by our own previous apply.
    Echo,
}

/// Result of handling one change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    /// Entries were already in order; nothing was applied.
    Unchanged,
    /// A new order was applied. `moved` counts entries whose position changed.
    Applied { moved: usize },
}

/// Per-surface driver that runs ordering passes in response to change
/// notifications.
pub struct Reorderer<X> {
    settings: Settings,
    resolver: Resolver,
    extractor: X,
    in_flight: AtomicBool,
    pending_echo: Mutex<Option<Vec<(String, i64)>>>,
}

impl<X> Reorderer<X> {
    #[must_use]
    pub fn new(settings: Settings, extractor: X) -> Self {
        let resolver = Resolver::from_settings(&settings);
        Self {
            settings,
            resolver,
            extractor,
            in_flight: AtomicBool::new(false),
            pending_echo: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle "the entries on `surface` may have changed".
    pub fn on_change<S, L>(&self, surface: &mut S, lookup: &L) -> Outcome
    where
        S: PresentationSurface,
        X: LabelExtractor<S::Entry>,
        L: MetadataLookup + ?Sized,
    {
        let kind = surface.kind();
        if !self.settings.enabled_for(kind) {
            return Outcome::Skipped(SkipReason::Disabled);
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!(?kind, "reorder already in flight, skipping");
            return Outcome::Skipped(SkipReason::InFlight);
        };

        let entries = surface.entries();
        let observed: Vec<(String, i64)> = entries
            .iter()
            .map(|entry| {
                let label = self.extractor.extract(entry);
                let timestamp = self.resolver.resolve(&label, lookup);
                (label, timestamp)
            })
            .collect();

        if self.take_echo(&observed) {
            tracing::debug!(?kind, "ignoring notification caused by our own reorder");
            return Outcome::Skipped(SkipReason::Echo);
        }

        let resolved = entries
            .into_iter()
            .zip(observed.iter().cloned())
            .map(|(entry, fingerprint)| {
                let timestamp = fingerprint.1;
                ((entry, fingerprint), timestamp)
            })
            .collect();
        let (ordered, applied): (Vec<S::Entry>, Vec<(String, i64)>) =
            sort_entries(resolved, self.settings.sort_descending)
                .into_iter()
                .unzip();

        if applied == observed {
            return Outcome::Unchanged;
        }

        let moved = applied
            .iter()
            .zip(&observed)
            .filter(|(now, before)| now.0 != before.0)
            .count();
        self.set_echo(applied);
        surface.apply_order(ordered);
        tracing::debug!(?kind, moved, "applied backlink order");

        Outcome::Applied { moved }
    }

    /// Consume the pending echo if `observed` matches it label for label
    /// and timestamp for timestamp.
    fn take_echo(&self, observed: &[(String, i64)]) -> bool {
        let mut pending = self
            .pending_echo
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match pending.take() {
            Some(expected) if expected == observed => true,
            // A different observation means the content really changed
            _ => false,
        }
    }

    fn set_echo(&self, applied: Vec<(String, i64)>) {
        let mut pending = self
            .pending_echo
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *pending = Some(applied);
    }
}

/// Holds the in-flight flag for the duration of one pass.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::VecSurface;
    use backsort_core::metadata::{MetadataRecord, NoMetadata};
    use backsort_core::SurfaceKind;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn by_label() -> impl Fn(&String) -> String {
        |s: &String| s.clone()
    }

    fn alphabetical() -> Vec<String> {
        labels(&["August 12th, 2025", "December 4th, 2025", "Meeting Notes"])
    }

    fn store() -> HashMap<String, MetadataRecord> {
        let mut store = HashMap::new();
        store.insert(
            "Meeting Notes.md".to_string(),
            MetadataRecord::new(1).with_field("edited", "2025-10-07"),
        );
        store
    }

    #[test]
    fn applies_newest_first_order() {
        let reorderer = Reorderer::new(Settings::default(), by_label());
        let mut surface = VecSurface::new(SurfaceKind::Document, alphabetical());

        let outcome = reorderer.on_change(&mut surface, &store());

        assert_eq!(outcome, Outcome::Applied { moved: 3 });
        assert_eq!(
            surface.as_slice(),
            labels(&["December 4th, 2025", "Meeting Notes", "August 12th, 2025"])
        );
    }

    #[test]
    fn ascending_setting_is_honored() {
        let settings = Settings {
            sort_descending: false,
            ..Settings::default()
        };
        let reorderer = Reorderer::new(settings, by_label());
        let mut surface = VecSurface::new(
            SurfaceKind::Sidebar,
            labels(&["Meeting Notes", "No Date", "August 12th, 2025"]),
        );

        reorderer.on_change(&mut surface, &store());

        assert_eq!(
            surface.as_slice(),
            labels(&["No Date", "August 12th, 2025", "Meeting Notes"])
        );
    }

    #[test]
    fn disabled_surface_is_left_alone() {
        let settings = Settings {
            sort_in_sidebar: false,
            ..Settings::default()
        };
        let reorderer = Reorderer::new(settings, by_label());
        let mut sidebar = VecSurface::new(SurfaceKind::Sidebar, alphabetical());
        let mut document = VecSurface::new(SurfaceKind::Document, alphabetical());

        assert_eq!(
            reorderer.on_change(&mut sidebar, &store()),
            Outcome::Skipped(SkipReason::Disabled)
        );
        assert_eq!(sidebar.as_slice(), alphabetical());
        assert!(matches!(
            reorderer.on_change(&mut document, &store()),
            Outcome::Applied { .. }
        ));
    }

    #[test]
    fn own_reorder_is_recognized_once_then_settles() {
        let reorderer = Reorderer::new(Settings::default(), by_label());
        let mut surface = VecSurface::new(SurfaceKind::Document, alphabetical());

        reorderer.on_change(&mut surface, &store());
        assert_eq!(surface.applied_count(), 1);

        // The host re-renders and notifies us about our own order
        assert_eq!(
            reorderer.on_change(&mut surface, &store()),
            Outcome::Skipped(SkipReason::Echo)
        );
        // Later notifications run a real pass, which finds nothing to do
        assert_eq!(reorderer.on_change(&mut surface, &store()), Outcome::Unchanged);
        assert_eq!(surface.applied_count(), 1);
    }

    #[test]
    fn metadata_change_under_applied_order_is_not_an_echo() {
        let mut notes = HashMap::new();
        notes.insert(
            "A.md".to_string(),
            MetadataRecord::new(1).with_field("edited", "2025-01-01"),
        );
        notes.insert(
            "B.md".to_string(),
            MetadataRecord::new(1).with_field("edited", "2025-06-01"),
        );
        let reorderer = Reorderer::new(Settings::default(), by_label());
        let mut surface = VecSurface::new(SurfaceKind::Document, labels(&["A", "B"]));

        assert_eq!(
            reorderer.on_change(&mut surface, &notes),
            Outcome::Applied { moved: 2 }
        );
        assert_eq!(surface.as_slice(), labels(&["B", "A"]));

        // A is edited before the host gets around to notifying us
        notes.insert(
            "A.md".to_string(),
            MetadataRecord::new(2).with_field("edited", "2025-12-01"),
        );
        assert_eq!(
            reorderer.on_change(&mut surface, &notes),
            Outcome::Applied { moved: 2 }
        );
        assert_eq!(surface.as_slice(), labels(&["A", "B"]));
    }

    #[test]
    fn new_entries_after_apply_are_sorted_in() {
        let reorderer = Reorderer::new(Settings::default(), by_label());
        let mut surface = VecSurface::new(SurfaceKind::Document, alphabetical());
        reorderer.on_change(&mut surface, &store());

        // Host re-renders alphabetically with a new backlink
        let mut fresh = alphabetical();
        fresh.push("2026-01-05".to_string());
        fresh.sort();
        surface.replace(fresh);

        assert!(matches!(
            reorderer.on_change(&mut surface, &store()),
            Outcome::Applied { .. }
        ));
        assert_eq!(surface.as_slice()[0], "2026-01-05");
    }

    #[test]
    fn already_ordered_surface_is_not_touched() {
        let reorderer = Reorderer::new(Settings::default(), by_label());
        let mut surface = VecSurface::new(
            SurfaceKind::Document,
            labels(&["2025-03-01", "2025-02-01", "undated"]),
        );

        assert_eq!(reorderer.on_change(&mut surface, &NoMetadata), Outcome::Unchanged);
        assert_eq!(surface.applied_count(), 0);
    }

    #[test]
    fn empty_surface_is_unchanged() {
        let reorderer = Reorderer::new(Settings::default(), by_label());
        let mut surface = VecSurface::new(SurfaceKind::Document, Vec::<String>::new());
        assert_eq!(reorderer.on_change(&mut surface, &NoMetadata), Outcome::Unchanged);
    }

    /// Surface whose `apply_order` synchronously notifies the same reorderer,
    /// the way a host's mutation observer would.
    struct ReentrantSurface {
        inner: VecSurface<String>,
        reorderer: Rc<Reorderer<Box<dyn Fn(&String) -> String>>>,
        nested: Rc<RefCell<Vec<Outcome>>>,
    }

    impl PresentationSurface for ReentrantSurface {
        type Entry = String;

        fn kind(&self) -> SurfaceKind {
            self.inner.kind()
        }

        fn entries(&self) -> Vec<String> {
            self.inner.entries()
        }

        fn apply_order(&mut self, order: Vec<String>) {
            self.inner.apply_order(order);
            let mut observer = self.inner.clone();
            let outcome = self.reorderer.on_change(&mut observer, &NoMetadata);
            self.nested.borrow_mut().push(outcome);
        }
    }

    #[test]
    fn reentrant_notification_during_apply_is_skipped() {
        let extractor: Box<dyn Fn(&String) -> String> = Box::new(|s: &String| s.clone());
        let reorderer = Rc::new(Reorderer::new(Settings::default(), extractor));
        let nested = Rc::new(RefCell::new(Vec::new()));
        let mut surface = ReentrantSurface {
            inner: VecSurface::new(
                SurfaceKind::Document,
                labels(&["2024-01-01", "2025-01-01"]),
            ),
            reorderer: Rc::clone(&reorderer),
            nested: Rc::clone(&nested),
        };

        let outcome = reorderer.on_change(&mut surface, &NoMetadata);

        assert_eq!(outcome, Outcome::Applied { moved: 2 });
        assert_eq!(*nested.borrow(), vec![Outcome::Skipped(SkipReason::InFlight)]);
        // The flag is released once the pass finishes
        assert_eq!(
            reorderer.on_change(&mut surface, &NoMetadata),
            Outcome::Skipped(SkipReason::Echo)
        );
    }
}
