use crate::identity::Id;

/// The identities of the dependencies a single call resolved.
///
/// Entries are `(slot, identity)` pairs, where the slot is the dependency's
/// index in its function's sorted dependency list. Dependencies that were not
/// bound for a call have no entry. Two fingerprints are equal if the same slots
/// are present and each resolved to the same instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint(Vec<(usize, Id)>);

impl Fingerprint {
    /// Create an empty fingerprint with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Record the identity of the dependency in `slot`.
    ///
    /// Slots must be pushed in increasing order.
    #[inline]
    pub fn push(&mut self, slot: usize, id: Id) {
        debug_assert!(self.0.last().is_none_or(|&(last, _)| last < slot));
        self.0.push((slot, id));
    }

    /// The number of recorded dependencies.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no dependency was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded `(slot, identity)` pairs in slot order.
    pub fn entries(&self) -> &[(usize, Id)] {
        &self.0
    }
}
