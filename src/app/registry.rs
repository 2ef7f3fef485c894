//! Singleton region slots.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::{MessagesTray, Region};

/// A named region slot. Each slot holds at most one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Header,
    Footer,
    MainContent,
    Sidebar,
    Messages,
}

impl Slot {
    /// Slots that must be filled before the layout counts as complete.
    /// The sidebar is optional.
    pub const MANDATORY: [Self; 4] = [Self::Header, Self::Footer, Self::MainContent, Self::Messages];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Footer => "footer",
            Self::MainContent => "main-content",
            Self::Sidebar => "sidebar",
            Self::Messages => "messages",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An instance held in a slot.
///
/// The messages tray keeps its richer interface so `fail()` can reach it.
#[derive(Clone)]
pub enum Registered {
    Region(Arc<dyn Region>),
    Messages(Arc<dyn MessagesTray>),
}

impl Registered {
    /// The instance's own region name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Region(region) => region.region_name(),
            Self::Messages(tray) => tray.region_name(),
        }
    }
}

impl fmt::Debug for Registered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region(_) => f.debug_tuple("Region").field(&self.name()).finish(),
            Self::Messages(_) => f.debug_tuple("Messages").field(&self.name()).finish(),
        }
    }
}

/// Slot → instance table. Last write wins.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    slots: BTreeMap<Slot, Registered>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `instance` in `slot`, returning the instance it replaced.
    pub fn insert(&mut self, slot: Slot, instance: Registered) -> Option<Registered> {
        self.slots.insert(slot, instance)
    }

    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&Registered> {
        self.slots.get(&slot)
    }

    #[must_use]
    pub fn is_registered(&self, slot: Slot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// True when every mandatory slot is filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        Slot::MANDATORY.iter().all(|slot| self.is_registered(*slot))
    }

    /// Filled slots in declaration order.
    #[must_use]
    pub fn registered_slots(&self) -> Vec<Slot> {
        self.slots.keys().copied().collect()
    }

    /// Empties the registry, handing back what was registered so the
    /// caller decides where it gets dropped.
    #[must_use]
    pub fn take(&mut self) -> ComponentRegistry {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Region for Named {
        fn region_name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn insert_returns_replaced_instance() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.insert(Slot::Header, Registered::Region(Arc::new(Named("first")))).is_none());

        let previous = registry.insert(Slot::Header, Registered::Region(Arc::new(Named("second"))));
        assert_eq!(previous.map(|p| p.name().to_string()).as_deref(), Some("first"));
        assert_eq!(registry.get(Slot::Header).map(Registered::name), Some("second"));
    }

    #[test]
    fn sidebar_is_not_mandatory() {
        let mut registry = ComponentRegistry::new();
        for slot in [Slot::Header, Slot::Footer, Slot::MainContent] {
            registry.insert(slot, Registered::Region(Arc::new(Named(slot.as_str()))));
        }
        assert!(!registry.is_complete());

        registry.insert(Slot::Messages, Registered::Region(Arc::new(Named("messages"))));
        assert!(registry.is_complete());
        assert!(!registry.is_registered(Slot::Sidebar));
    }

    #[test]
    fn take_leaves_an_empty_registry() {
        let mut registry = ComponentRegistry::new();
        registry.insert(Slot::Footer, Registered::Region(Arc::new(Named("footer"))));

        let released = registry.take();
        assert_eq!(released.registered_slots(), vec![Slot::Footer]);
        assert!(registry.registered_slots().is_empty());
    }
}
