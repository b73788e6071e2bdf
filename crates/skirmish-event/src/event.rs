//! Event kinds: opaque identity tokens minted by a factory.
//!
//! Two kinds are the same channel only if one token was cloned from the
//! other. There is no global registry and no name-based lookup, so two
//! subsystems minting kinds with the same label can never collide.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity token for one event channel.
///
/// Cheap to clone; clones compare equal to each other and to nothing else.
/// The label is carried for diagnostics only and never participates in
/// equality: identity is a dedicated allocation minted per `new` call, so
/// even two kinds built from one shared label are distinct.
#[derive(Clone)]
pub struct EventKind {
    label: Arc<str>,
    token: Arc<()>,
}

impl EventKind {
    /// Mint a fresh kind. Every call creates a distinct channel, even with
    /// a label that was used before.
    #[must_use]
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
            token: Arc::new(()),
        }
    }

    /// Get the diagnostic label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.token) as usize
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }
}

impl Eq for EventKind {}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventKind({})", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_are_equal() {
        let kind = EventKind::new("damage");
        let clone = kind.clone();
        assert_eq!(kind, clone);
        assert_eq!(kind.label(), "damage");
    }

    #[test]
    fn test_same_label_distinct_kinds() {
        let a = EventKind::new("damage");
        let b = EventKind::new("damage");
        assert_ne!(a, b);
    }

    #[test]
    fn test_shared_label_allocation_distinct_kinds() {
        // One shared label allocation must not collapse two mints into
        // the same channel.
        let label: Arc<str> = Arc::from("damage");
        let a = EventKind::new(label.clone());
        let b = EventKind::new(label);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_usable_as_map_key() {
        use hashbrown::HashMap;

        let a = EventKind::new("damage");
        let b = EventKind::new("damage");

        let mut map = HashMap::new();
        map.insert(a.clone(), 1);
        map.insert(b, 2);

        assert_eq!(map.len(), 2);
        assert_eq!(map[&a], 1);
    }
}
