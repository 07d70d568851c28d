use crate::commands::{
    error::TreeError,
    finalize::TreeFinalizer,
    node::{CommandNode, Executor, NodeBuilder, NodeId},
};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Arena holding every node of one command tree. Nodes refer to each other only through
/// `NodeId` handles; children are owned by their parent, redirects are plain handles.
pub struct CommandTree {
    nodes: Vec<CommandNode>,
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![CommandNode::root()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn get(&self, id: NodeId) -> Option<&CommandNode> {
        self.nodes.get(id.index())
    }

    pub(super) fn get_mut(&mut self, id: NodeId) -> Result<&mut CommandNode, TreeError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TreeError::UnknownNode(id))
    }

    /// Panics if `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    fn check(&self, id: NodeId) -> Result<&CommandNode, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Builds `builder` and its subtree without attaching it anywhere.
    pub fn build(&mut self, builder: NodeBuilder) -> Result<NodeId, TreeError> {
        if builder.redirect.is_some() && !builder.children.is_empty() {
            return Err(TreeError::RedirectWithChildren {
                name: builder.name().to_string(),
            });
        }
        if let Some(target) = builder.redirect {
            self.check(target)?;
        }

        let (node, children) = builder.into_parts();
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);

        for child in children {
            let child_id = self.build(child)?;
            self.add_child(id, child_id)?;
        }
        Ok(id)
    }

    /// Builds `builder` and attaches it under `parent`.
    pub fn attach(&mut self, parent: NodeId, builder: NodeBuilder) -> Result<NodeId, TreeError> {
        let id = self.build(builder)?;
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Attaches a top-level command under the root.
    pub fn register(&mut self, command: NodeBuilder) -> Result<NodeId, TreeError> {
        let name = command.name().to_string();
        let id = self.attach(self.root(), command)?;
        debug!("Registered command '{}'", name);
        Ok(id)
    }

    /// Attaches an already built, detached node. The child is classified as plain or
    /// redirecting by the redirect it has right now.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if child == self.root() {
            return Err(TreeError::RootAsChild);
        }
        let child_node = self.check(child)?;
        let name = child_node.name().to_string();
        let redirecting = child_node.redirect().is_some();
        if child_node.parent.is_some() {
            return Err(TreeError::AlreadyAttached { name });
        }

        let parent_node = self.check(parent)?;
        if parent_node.redirect.is_some() {
            return Err(TreeError::RedirectWithChildren {
                name: parent_node.name().to_string(),
            });
        }
        let parent_name = parent_node.name().to_string();

        if !self
            .get_mut(parent)?
            .children
            .add(&name, child, redirecting)
        {
            return Err(TreeError::DuplicateNode {
                parent: parent_name,
                name,
            });
        }
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    pub fn redirect(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(CommandNode::redirect)
    }

    pub fn can_force_redirect(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(CommandNode::can_force_redirect)
    }

    pub fn finalizer(&mut self) -> TreeFinalizer<'_> {
        TreeFinalizer::new(self)
    }

    /// Generic lookup by child names, starting at the root.
    pub fn find(&self, path: &[&str]) -> Option<NodeId> {
        let mut current = self.root();
        for name in path {
            current = self.node(current).children.get(name)?;
        }
        Some(current)
    }

    /// The chain of ancestors from the root down to `id`, both included.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(|node| node.parent) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// The command that runs when input ends at `id`.
    ///
    /// A forced redirect reroutes the node entirely; otherwise the node's own (explicit, then
    /// forced) executor is used, falling back to the command of an explicit redirect target.
    pub fn resolve_command(&self, id: NodeId) -> Option<&Executor> {
        let mut seen = FxHashSet::default();
        let mut current = id;
        loop {
            if !seen.insert(current) {
                return None;
            }
            let node = self.get(current)?;
            if let Some(command) = &node.forced_command {
                return Some(command);
            }
            if let Some(target) = node.forced_redirect() {
                current = target;
                continue;
            }
            if let Some(executor) = node.command() {
                return Some(executor);
            }
            current = node.redirect?;
        }
    }

    /// Children as offered for completion. Zero-width children are replaced by what their
    /// redirect target (or, without one, they themselves) offer, and a redirect target is always
    /// listed before the nodes redirecting to it.
    pub fn children_for_suggestions(&self, id: NodeId) -> Vec<NodeId> {
        let mut visiting = FxHashSet::default();
        self.suggestion_children(id, &mut visiting)
    }

    fn suggestion_children(&self, id: NodeId, visiting: &mut FxHashSet<NodeId>) -> Vec<NodeId> {
        if !visiting.insert(id) {
            return Vec::new();
        }

        let mut flattened = Vec::new();
        for &child in self.children(id) {
            let node = self.node(child);
            let spliced = if node.is_zero_width() {
                let source = node.redirect().unwrap_or(child);
                self.suggestion_children(source, visiting)
            } else {
                vec![child]
            };
            for candidate in spliced {
                if !flattened.contains(&candidate) {
                    flattened.push(candidate);
                }
            }
        }

        visiting.remove(&id);
        self.order_redirect_targets_first(flattened)
    }

    fn order_redirect_targets_first(&self, nodes: Vec<NodeId>) -> Vec<NodeId> {
        let mut ordered = Vec::with_capacity(nodes.len());
        let mut placed = FxHashSet::default();
        for &id in &nodes {
            self.place(id, &nodes, &mut placed, &mut ordered);
        }
        ordered
    }

    fn place(
        &self,
        id: NodeId,
        candidates: &[NodeId],
        placed: &mut FxHashSet<NodeId>,
        ordered: &mut Vec<NodeId>,
    ) {
        if !placed.insert(id) {
            return;
        }
        if let Some(target) = self.redirect(id) {
            if candidates.contains(&target) {
                self.place(target, candidates, placed, ordered);
            }
        }
        ordered.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{argument::ArgumentType, error::TreeError};

    fn literal(name: &str) -> NodeBuilder {
        CommandNode::literal(name)
    }

    #[test]
    fn children_lists_plain_before_redirecting() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let target = tree.register(literal("target")).unwrap();
        let alias = tree.register(literal("alias").redirect(target)).unwrap();
        let other = tree.register(literal("other")).unwrap();
        assert_eq!(tree.children(root), &[target, other, alias]);
    }

    #[test]
    fn duplicate_siblings_are_rejected() {
        let mut tree = CommandTree::new();
        tree.register(literal("foo")).unwrap();
        assert_eq!(
            tree.register(literal("foo")).err(),
            Some(TreeError::DuplicateNode {
                parent: String::new(),
                name: "foo".to_string()
            })
        );
    }

    #[test]
    fn redirect_and_children_are_exclusive() {
        let mut tree = CommandTree::new();
        let target = tree.register(literal("target")).unwrap();
        let err = tree
            .register(literal("both").redirect(target).then(literal("child")))
            .unwrap_err();
        assert!(matches!(err, TreeError::RedirectWithChildren { .. }));

        let redirecting = tree.register(literal("alias").redirect(target)).unwrap();
        let child = tree.build(literal("child")).unwrap();
        assert!(tree.add_child(redirecting, child).is_err());
    }

    #[test]
    fn suggestion_order_puts_targets_first() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let first = tree.register(literal("first")).unwrap();
        let later = tree.build(literal("later")).unwrap();
        let alias = tree.register(literal("alias").redirect(later)).unwrap();
        tree.add_child(root, later).unwrap();

        let late = tree.register(literal("late")).unwrap();
        tree.finalizer().force_redirect(late, first).unwrap();

        let order = tree.children_for_suggestions(root);
        let position = |id| order.iter().position(|&n| n == id).unwrap();
        assert!(position(later) < position(alias));
        assert!(position(first) < position(late));
    }

    #[test]
    fn redirect_target_moves_ahead_of_redirecting_sibling() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        // `b` is plain when added and only afterwards forced to redirect to `a`,
        // so `children()` keeps b before a.
        let b = tree.register(literal("b")).unwrap();
        let a = tree.register(literal("a")).unwrap();
        let c = tree.register(literal("c")).unwrap();
        tree.finalizer().force_redirect(b, a).unwrap();

        assert_eq!(tree.children(root), &[b, a, c]);
        assert_eq!(tree.children_for_suggestions(root), vec![a, b, c]);
    }

    #[test]
    fn zero_width_children_are_flattened() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let execute = tree
            .register(literal("execute").then(literal("run")).then(literal("as")))
            .unwrap();
        let menu = tree
            .register(
                literal("menu")
                    .then(literal("open"))
                    .then(CommandNode::argument("confirm", ArgumentType::marker()).redirect(execute))
                    .then(
                        CommandNode::argument("hidden", ArgumentType::marker())
                            .then(literal("inner")),
                    ),
            )
            .unwrap();

        let names: Vec<&str> = tree
            .children_for_suggestions(menu)
            .into_iter()
            .map(|id| tree.node(id).name())
            .collect();
        assert_eq!(names, vec!["open", "inner", "run", "as"]);
        assert!(tree.find(&["menu", "confirm"]).is_some());
        assert_eq!(tree.children_for_suggestions(root).len(), 2);
    }

    #[test]
    fn zero_width_cycles_terminate() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        tree.register(literal("a")).unwrap();
        tree.register(CommandNode::argument("loop", ArgumentType::marker()).redirect(root))
            .unwrap();
        let names: Vec<&str> = tree
            .children_for_suggestions(root)
            .into_iter()
            .map(|id| tree.node(id).name())
            .collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn path_and_lookup() {
        let mut tree = CommandTree::new();
        tree.register(literal("a").then(literal("b").then(literal("c"))))
            .unwrap();
        let c = tree.find(&["a", "b", "c"]).unwrap();
        let names: Vec<&str> = tree
            .path_to(c)
            .into_iter()
            .map(|id| tree.node(id).name())
            .collect();
        assert_eq!(names, vec!["", "a", "b", "c"]);
        assert!(tree.find(&["a", "missing"]).is_none());
    }
}
