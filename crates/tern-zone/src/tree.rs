//! Zone Tree - Hierarchical Zone Lookup

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use tern_proto::Name;

use crate::error::{Result, ZoneError};
use crate::zone::Zone;

/// The set of zones served, keyed by origin.
///
/// Distinct zones are independent; updating one never waits on another.
#[derive(Debug, Default)]
pub struct ZoneTree {
    /// Zones indexed by their apex name.
    zones: DashMap<Name, Arc<dyn Zone>>,
}

impl ZoneTree {
    /// Creates a new empty zone tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a zone, refusing a second zone with the same origin.
    pub fn insert(&self, zone: Arc<dyn Zone>) -> Result<()> {
        match self.zones.entry(zone.origin().clone()) {
            Entry::Occupied(entry) => Err(ZoneError::ZoneExists {
                name: entry.key().to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(zone);
                Ok(())
            }
        }
    }

    /// Removes a zone from the tree.
    pub fn remove(&self, origin: &Name) -> Option<Arc<dyn Zone>> {
        self.zones.remove(origin).map(|(_, zone)| zone)
    }

    /// Gets a zone by its exact origin.
    pub fn get(&self, origin: &Name) -> Option<Arc<dyn Zone>> {
        self.zones.get(origin).map(|entry| Arc::clone(entry.value()))
    }

    /// Finds the most specific zone that contains `name`.
    pub fn find_zone(&self, name: &Name) -> Option<Arc<dyn Zone>> {
        let mut current = name.clone();
        loop {
            if let Some(zone) = self.get(&current) {
                return Some(zone);
            }
            current = current.parent()?;
        }
    }

    /// Returns the number of zones in the tree.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Returns the origins of all zones.
    pub fn zone_names(&self) -> Vec<Name> {
        self.zones.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::InMemoryZone;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn zone(origin: &str) -> Arc<dyn Zone> {
        Arc::new(InMemoryZone::empty(name(origin)))
    }

    #[test]
    fn test_zone_tree() {
        let tree = ZoneTree::new();
        tree.insert(zone("example.com")).unwrap();
        tree.insert(zone("sub.example.com")).unwrap();
        assert_eq!(tree.len(), 2);

        let found = tree.find_zone(&name("www.example.com")).unwrap();
        assert_eq!(found.origin(), &name("example.com"));

        let found = tree.find_zone(&name("a.b.SUB.example.com")).unwrap();
        assert_eq!(found.origin(), &name("sub.example.com"));

        assert!(tree.find_zone(&name("example.org")).is_none());
        assert!(tree.get(&name("www.example.com")).is_none());
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let tree = ZoneTree::new();
        tree.insert(zone("example.com")).unwrap();
        assert!(matches!(
            tree.insert(zone("EXAMPLE.com")),
            Err(ZoneError::ZoneExists { .. })
        ));

        assert!(tree.remove(&name("example.com")).is_some());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_root_zone_catches_all() {
        let tree = ZoneTree::new();
        tree.insert(zone(".")).unwrap();
        let found = tree.find_zone(&name("anything.example")).unwrap();
        assert!(found.origin().is_root());
    }
}
