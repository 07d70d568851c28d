use super::node::NodeId;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Children of one node, in insertion order.
///
/// Each child is classified as plain or redirecting when it is added and keeps that
/// classification. `children()` lists every plain child before every redirecting one; the
/// merged list is cached until the next `add`. Adding requires `&mut self`, so the cache can
/// never be invalidated while someone is reading it.
#[derive(Debug, Default)]
pub struct ChildRegistry {
    plain: Vec<NodeId>,
    redirecting: Vec<NodeId>,
    by_name: FxHashMap<String, NodeId>,
    merged: OnceLock<Vec<NodeId>>,
}

impl ChildRegistry {
    /// Returns `false` without changing anything if `name` is already taken.
    pub(super) fn add(&mut self, name: &str, child: NodeId, redirecting: bool) -> bool {
        if self.by_name.contains_key(name) {
            return false;
        }
        self.by_name.insert(name.to_string(), child);
        if redirecting {
            self.redirecting.push(child);
        } else {
            self.plain.push(child);
        }
        self.merged.take();
        true
    }

    pub fn children(&self) -> &[NodeId] {
        self.merged.get_or_init(|| {
            self.plain
                .iter()
                .chain(self.redirecting.iter())
                .copied()
                .collect()
        })
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True until `children()` has been computed after the last `add`.
    pub fn is_dirty(&self) -> bool {
        self.merged.get().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> NodeId {
        NodeId(index)
    }

    #[test]
    fn plain_children_come_first() {
        let mut registry = ChildRegistry::default();
        assert!(registry.add("a", id(1), true));
        assert!(registry.add("b", id(2), false));
        assert!(registry.add("c", id(3), true));
        assert!(registry.add("d", id(4), false));
        assert_eq!(registry.children(), &[id(2), id(4), id(1), id(3)]);
    }

    #[test]
    fn cache_is_invalidated_on_add() {
        let mut registry = ChildRegistry::default();
        registry.add("a", id(1), false);
        assert!(registry.is_dirty());
        assert_eq!(registry.children(), &[id(1)]);
        assert!(!registry.is_dirty());

        registry.add("b", id(2), false);
        assert!(registry.is_dirty());
        assert_eq!(registry.children(), &[id(1), id(2)]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ChildRegistry::default();
        assert!(registry.add("a", id(1), false));
        assert!(!registry.add("a", id(2), false));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a"), Some(id(1)));
    }
}
