//! Capability interface for a presentation area showing backlink entries.

use backsort_core::SurfaceKind;

/// Something that shows an ordered list of entries and can be told to
/// show them in a different order.
pub trait PresentationSurface {
    type Entry: Clone;

    /// Which kind of surface this is; used to honor the per-surface
    /// enable flags.
    fn kind(&self) -> SurfaceKind;

    /// The entries as currently presented, in presentation order.
    fn entries(&self) -> Vec<Self::Entry>;

    /// Present exactly these entries in this order.
    fn apply_order(&mut self, order: Vec<Self::Entry>);
}

/// In-memory surface. Useful for tests and for hosts that render from a
/// plain list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecSurface<E> {
    kind: SurfaceKind,
    entries: Vec<E>,
    applied: usize,
}

impl<E: Clone> VecSurface<E> {
    #[must_use]
    pub fn new(kind: SurfaceKind, entries: Vec<E>) -> Self {
        Self {
            kind,
            entries,
            applied: 0,
        }
    }

    /// Replace the presented entries, as the host does when it re-renders.
    pub fn replace(&mut self, entries: Vec<E>) {
        self.entries = entries;
    }

    /// How many times an order has been applied.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied
    }

    #[must_use]
    pub fn as_slice(&self) -> &[E] {
        &self.entries
    }
}

impl<E: Clone> PresentationSurface for VecSurface<E> {
    type Entry = E;

    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn entries(&self) -> Vec<E> {
        self.entries.clone()
    }

    fn apply_order(&mut self, order: Vec<E>) {
        self.entries = order;
        self.applied += 1;
    }
}
