//! Expansion and cache key derivation.
//!
//! ```text
//! expansion_key = lowercase(child_entity_name) + "-" + parent_entity_id
//! cache_key     = expansion_key + "-" + lowercase(child_entity_name or "items")
//! ```
//!
//! Both strings must stay byte-for-byte stable: they index the expanded flags
//! and the child cache independently.

use std::fmt;

/// Entity name used when a level has no named child type.
pub const DEFAULT_CHILD_NAME: &str = "items";

pub fn expansion_key(child_entity_name: Option<&str>, parent_entity_id: impl fmt::Display) -> String {
    format!(
        "{}-{}",
        child_entity_name.unwrap_or(DEFAULT_CHILD_NAME).to_lowercase(),
        parent_entity_id
    )
}

pub fn cache_key(expansion_key: &str, child_entity_name: Option<&str>) -> String {
    format!(
        "{}-{}",
        expansion_key,
        child_entity_name.unwrap_or(DEFAULT_CHILD_NAME).to_lowercase()
    )
}

/// Identity of one expandable node: which child type under which parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    expansion: String,
    cache: String,
    child_type: String,
    parent_id: String,
}

impl NodeKey {
    pub fn new(child_entity_name: Option<&str>, parent_entity_id: impl fmt::Display) -> Self {
        let parent_id = parent_entity_id.to_string();
        let expansion = expansion_key(child_entity_name, &parent_id);
        let cache = cache_key(&expansion, child_entity_name);
        Self {
            expansion,
            cache,
            child_type: child_entity_name.unwrap_or(DEFAULT_CHILD_NAME).to_string(),
            parent_id,
        }
    }

    pub fn expansion_key(&self) -> &str {
        &self.expansion
    }

    pub fn cache_key(&self) -> &str {
        &self.cache
    }

    /// Child entity name as given by the caller (original case).
    pub fn child_type(&self) -> &str {
        &self.child_type
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expansion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_keys() {
        let key = NodeKey::new(Some("Floor"), 5);
        assert_eq!(key.expansion_key(), "floor-5");
        assert_eq!(key.cache_key(), "floor-5-floor");
        assert_eq!(key.child_type(), "Floor");
        assert_eq!(key.parent_id(), "5");
    }

    #[test]
    fn test_free_functions_agree() {
        let exp = expansion_key(Some("ParkingSpace"), "F-12");
        assert_eq!(exp, "parkingspace-F-12");
        assert_eq!(cache_key(&exp, Some("ParkingSpace")), "parkingspace-F-12-parkingspace");
    }

    #[test]
    fn test_unnamed_child_falls_back_to_items() {
        let key = NodeKey::new(None, 3);
        assert_eq!(key.expansion_key(), "items-3");
        assert_eq!(key.cache_key(), "items-3-items");
    }

    #[test]
    fn test_distinct_parents_distinct_keys() {
        assert_ne!(NodeKey::new(Some("Area"), 1), NodeKey::new(Some("Area"), 10));
        assert_ne!(NodeKey::new(Some("Area"), 1), NodeKey::new(Some("Floor"), 1));
    }
}
