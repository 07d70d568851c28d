use crate::commands::{
    argument::{ArgumentParser, CompletionType},
    node::{NodeId, NodeKind},
    parser,
    tree::CommandTree,
    CommandSource,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

pub type WireId = i32;

pub const ASK_SERVER: &str = "minecraft:ask_server";

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct CommandFlags: u32 {
        const ROOT = 0x0;
        const LITERAL = 0x1;
        const ARGUMENT = 0x2;
        const EXECUTABLE = 0x4;
        const REDIRECT = 0x8;
        const HAS_SUGGESTIONS_TYPE = 0x10;
    }
}

/// One node of the completion tree. Carries only what a client needs to complete input,
/// plus the node of the command tree it was derived from.
#[derive(Debug, Clone)]
pub struct SuggestionNode {
    pub flags: CommandFlags,
    pub children: Vec<WireId>,
    pub redirect: Option<WireId>,
    pub name: Option<String>,
    pub parser: Option<CompletionType>,
    pub suggestions_type: Option<&'static str>,
    pub fork: bool,
    pub origin: NodeId,
    /// Set on the node that starts an argument's chain; only those offer argument suggestions.
    pub first_link: bool,
}

impl SuggestionNode {
    pub fn is_literal(&self) -> bool {
        self.flags.contains(CommandFlags::LITERAL)
    }

    pub fn is_executable(&self) -> bool {
        self.flags.contains(CommandFlags::EXECUTABLE)
    }
}

/// The completion tree mirrored from a command tree.
pub struct SuggestionTree {
    nodes: Vec<SuggestionNode>,
    root: WireId,
    public: FxHashMap<NodeId, WireId>,
}

impl SuggestionTree {
    pub fn build(tree: &CommandTree) -> Self {
        let mut builder = SuggestionTreeBuilder::new(tree);
        builder.build_tree();
        builder.finish()
    }

    /// Builds the tree and adds configured aliases as root literals. Aliases are resolved by
    /// parsing their expansion as `source`.
    pub fn build_with_aliases(
        tree: &CommandTree,
        aliases: &[(String, String)],
        source: &dyn CommandSource,
    ) -> Self {
        let mut builder = SuggestionTreeBuilder::new(tree);
        builder.build_tree();
        for (alias, replacement) in aliases {
            builder.build_custom_alias(source, alias, replacement);
        }
        builder.finish()
    }

    pub fn root(&self) -> WireId {
        self.root
    }

    pub fn nodes(&self) -> &[SuggestionNode] {
        &self.nodes
    }

    pub fn node(&self, id: WireId) -> Option<&SuggestionNode> {
        usize::try_from(id).ok().and_then(|index| self.nodes.get(index))
    }

    /// The wire node a command tree node is published as. For arguments spanning several slots
    /// this is the first link of the chain.
    pub fn lookup(&self, origin: NodeId) -> Option<WireId> {
        self.public.get(&origin).copied()
    }

    pub fn child_by_name(&self, parent: WireId, name: &str) -> Option<WireId> {
        self.node(parent)?.children.iter().copied().find(|&child| {
            self.node(child)
                .is_some_and(|node| node.name.as_deref() == Some(name))
        })
    }

    /// Children of `id` as seen after following its redirects. An alias of a redirecting
    /// node needs two hops.
    pub fn continuation(&self, id: WireId) -> &[WireId] {
        let mut target = id;
        for _ in 0..self.nodes.len() {
            match self.node(target).and_then(|node| node.redirect) {
                Some(next) => target = next,
                None => break,
            }
        }
        self.node(target)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> JsonValue {
        let nodes: Vec<JsonValue> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                json!({
                    "id": index,
                    "flags": node.flags.iter_names().map(|(name, _)| name).collect::<Vec<_>>(),
                    "name": node.name,
                    "parser": node.parser.map(|parser| parser.identifier()),
                    "suggestions_type": node.suggestions_type,
                    "redirect": node.redirect,
                    "fork": node.fork,
                    "children": node.children,
                })
            })
            .collect();
        json!({ "root": self.root, "nodes": nodes })
    }
}

struct SuggestionTreeBuilder<'t> {
    tree: &'t CommandTree,
    nodes: Vec<SuggestionNode>,
    public: FxHashMap<NodeId, WireId>,
    pending_redirects: Vec<(WireId, NodeId)>,
}

impl<'t> SuggestionTreeBuilder<'t> {
    fn new(tree: &'t CommandTree) -> Self {
        Self {
            tree,
            nodes: Vec::new(),
            public: FxHashMap::default(),
            pending_redirects: Vec::new(),
        }
    }

    fn build_tree(&mut self) {
        self.build_node(self.tree.root());
        self.patch_redirects();
    }

    fn finish(self) -> SuggestionTree {
        debug!("Built suggestion tree with {} nodes", self.nodes.len());
        SuggestionTree {
            nodes: self.nodes,
            root: 0,
            public: self.public,
        }
    }

    fn push(&mut self, node: SuggestionNode) -> WireId {
        let id = self.nodes.len() as WireId;
        self.nodes.push(node);
        id
    }

    fn blank(&self, origin: NodeId, flags: CommandFlags, name: Option<String>) -> SuggestionNode {
        SuggestionNode {
            flags,
            children: Vec::new(),
            redirect: None,
            name,
            parser: None,
            suggestions_type: None,
            fork: false,
            origin,
            first_link: true,
        }
    }

    /// Emits the wire nodes for `id` and, below them, its suggestion children. Returns the
    /// published node. Nodes are allocated before their children so that cycles through
    /// zero-width redirects resolve to the already allocated node. Zero-width nodes are never
    /// published and yield `None`.
    fn build_node(&mut self, id: NodeId) -> Option<WireId> {
        if let Some(&wire) = self.public.get(&id) {
            return Some(wire);
        }

        let tree = self.tree;
        let node = tree.node(id);
        let mut flags = CommandFlags::empty();
        if tree.resolve_command(id).is_some() {
            flags |= CommandFlags::EXECUTABLE;
        }

        let links: Vec<WireId> = match node.kind() {
            NodeKind::Root => vec![self.push(self.blank(id, CommandFlags::ROOT | flags, None))],
            NodeKind::Literal(literal) | NodeKind::FlagLiteral { literal, .. } => {
                let name = Some(literal.name().to_string());
                let wire = self.blank(id, flags | CommandFlags::LITERAL, name);
                vec![self.push(wire)]
            }
            NodeKind::Argument(argument) => {
                let types = argument.parser().completion_types();
                if types.is_empty() {
                    return None;
                }
                let last = types.len() - 1;
                types
                    .iter()
                    .enumerate()
                    .map(|(index, completion)| {
                        let name = if index == 0 {
                            argument.name().to_string()
                        } else {
                            format!("{}_{}", argument.name(), index)
                        };
                        let mut link_flags = CommandFlags::ARGUMENT;
                        if index == last {
                            link_flags |= flags;
                        }
                        let mut wire = self.blank(id, link_flags, Some(name));
                        wire.parser = Some(*completion);
                        wire.first_link = index == 0;
                        if index == 0 && completion.is_plain_string() {
                            wire.flags |= CommandFlags::HAS_SUGGESTIONS_TYPE;
                            wire.suggestions_type = Some(ASK_SERVER);
                        }
                        self.push(wire)
                    })
                    .collect()
            }
        };

        let first = links[0];
        let last = links[links.len() - 1];
        self.public.insert(id, first);
        for pair in links.windows(2) {
            self.nodes[pair[0] as usize].children.push(pair[1]);
        }

        let mut children = Vec::new();
        for child in tree.children_for_suggestions(id) {
            let Some(wire) = self.build_node(child) else {
                continue;
            };
            children.push(wire);
            if let Some(literal) = tree.node(child).as_literal() {
                for alias in literal.aliases() {
                    children.push(self.build_alias_node(child, alias, wire));
                }
            }
        }

        let wire = &mut self.nodes[last as usize];
        wire.children = children;
        wire.fork = node.is_fork();
        if let Some(target) = node.redirect() {
            self.pending_redirects.push((last, target));
        }
        Some(first)
    }

    fn build_alias_node(&mut self, origin: NodeId, alias: &str, target: WireId) -> WireId {
        let mut wire = self.blank(
            origin,
            CommandFlags::LITERAL | CommandFlags::REDIRECT,
            Some(alias.to_string()),
        );
        wire.redirect = Some(target);
        self.push(wire)
    }

    /// Redirects are resolved once every reachable node has been published, so a redirect may
    /// point at a node that was built after the redirecting one.
    fn patch_redirects(&mut self) {
        while let Some((wire, target)) = self.pending_redirects.pop() {
            match self.resolve_target(target) {
                Some(resolved) => {
                    let node = &mut self.nodes[wire as usize];
                    node.redirect = Some(resolved);
                    node.flags |= CommandFlags::REDIRECT;
                }
                None => warn!(
                    "Dropping redirect of suggestion node {} to unresolvable node {:?}",
                    wire, target
                ),
            }
        }
    }

    fn resolve_target(&mut self, target: NodeId) -> Option<WireId> {
        let mut seen = FxHashSet::default();
        let mut current = target;
        loop {
            if let Some(&wire) = self.public.get(&current) {
                return Some(wire);
            }
            if !seen.insert(current) {
                return None;
            }
            let node = self.tree.get(current)?;
            if node.is_zero_width() {
                current = node.redirect()?;
                continue;
            }
            // Not reachable from the root; publish it on its own.
            return self.build_node(current);
        }
    }

    /// Publishes a configured alias (such as `//wand` for `/wand`) as a root literal that
    /// redirects to wherever its expansion ends in the command tree.
    fn build_custom_alias(&mut self, source: &dyn CommandSource, alias: &str, replacement: &str) {
        let replacement = match replacement.find("{}") {
            Some(pos) => replacement[..pos].trim(),
            None => replacement,
        };
        let results = parser::parse(self.tree, replacement, source);
        let Some(target) = results
            .context()
            .nodes()
            .last()
            .map(|parsed| parsed.node)
            .and_then(|node| self.public.get(&node).copied())
        else {
            warn!(
                "Custom alias replacement '{}' did not match any command",
                replacement
            );
            return;
        };
        let origin = self.nodes[target as usize].origin;
        let alias = self.build_alias_node(origin, alias, target);
        self.nodes[0].children.push(alias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{argument::ArgumentType, node::CommandNode};

    fn names(tree: &SuggestionTree, ids: &[WireId]) -> Vec<String> {
        ids.iter()
            .map(|&id| tree.node(id).unwrap().name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn multi_slot_arguments_become_chains() {
        let mut tree = CommandTree::new();
        let home = tree.register(CommandNode::literal("home")).unwrap();
        tree.register(
            CommandNode::literal("warp").then(
                CommandNode::argument("destination", ArgumentType::location())
                    .then(CommandNode::literal("now"))
                    .executes(|_| Ok(1)),
            ),
        )
        .unwrap();
        tree.register(
            CommandNode::literal("go").then(
                CommandNode::argument("where", ArgumentType::location()).redirect(home),
            ),
        )
        .unwrap();

        let suggestions = SuggestionTree::build(&tree);
        let destination = tree.find(&["warp", "destination"]).unwrap();
        let first = suggestions.lookup(destination).unwrap();
        let first_node = suggestions.node(first).unwrap();
        assert_eq!(first_node.name.as_deref(), Some("destination"));
        assert_eq!(first_node.suggestions_type, Some(ASK_SERVER));
        assert!(!first_node.is_executable());
        assert_eq!(first_node.children.len(), 1);

        let second = suggestions.node(first_node.children[0]).unwrap();
        assert_eq!(second.name.as_deref(), Some("destination_1"));
        assert_eq!(second.parser, Some(CompletionType::Vec3));
        assert_eq!(second.suggestions_type, None);
        assert!(!second.first_link);
        assert!(second.is_executable());
        assert_eq!(names(&suggestions, &second.children), vec!["now"]);

        let where_ = tree.find(&["go", "where"]).unwrap();
        let first = suggestions.node(suggestions.lookup(where_).unwrap()).unwrap();
        assert_eq!(first.redirect, None);
        let last = suggestions.node(first.children[0]).unwrap();
        assert_eq!(last.redirect, suggestions.lookup(home));
        assert!(last.flags.contains(CommandFlags::REDIRECT));
    }

    #[test]
    fn zero_width_nodes_are_not_published() {
        let mut tree = CommandTree::new();
        let execute = tree
            .register(
                CommandNode::literal("execute")
                    .then(CommandNode::literal("run"))
                    .then(CommandNode::literal("as")),
            )
            .unwrap();
        let menu = tree
            .register(
                CommandNode::literal("menu").then(
                    CommandNode::argument("confirm", ArgumentType::marker()).redirect(execute),
                ),
            )
            .unwrap();
        let suggestions = SuggestionTree::build(&tree);
        let confirm = tree.find(&["menu", "confirm"]).unwrap();
        assert_eq!(suggestions.lookup(confirm), None);

        let menu = suggestions.node(suggestions.lookup(menu).unwrap()).unwrap();
        assert_eq!(names(&suggestions, &menu.children), vec!["run", "as"]);
    }

    #[test]
    fn forward_redirects_are_patched() {
        let mut tree = CommandTree::new();
        let target = tree.build(CommandNode::literal("later")).unwrap();
        let early = tree
            .register(CommandNode::literal("early").redirect(target))
            .unwrap();
        tree.add_child(tree.root(), target).unwrap();

        let suggestions = SuggestionTree::build(&tree);
        let early = suggestions.node(suggestions.lookup(early).unwrap()).unwrap();
        assert_eq!(early.redirect, suggestions.lookup(target));
    }

    #[test]
    fn detached_redirect_targets_are_published() {
        let mut tree = CommandTree::new();
        let hidden = tree
            .build(CommandNode::literal("hidden").then(CommandNode::literal("inner")))
            .unwrap();
        let door = tree
            .register(CommandNode::literal("door").redirect(hidden))
            .unwrap();

        let suggestions = SuggestionTree::build(&tree);
        let door = suggestions.lookup(door).unwrap();
        assert_eq!(names(&suggestions, suggestions.continuation(door)), vec!["inner"]);
    }

    #[test]
    fn aliases_redirect_to_their_literal() {
        let mut tree = CommandTree::new();
        let teleport = tree
            .register(CommandNode::literal("teleport").alias("tp"))
            .unwrap();
        let suggestions = SuggestionTree::build(&tree);
        let root = suggestions.node(suggestions.root()).unwrap();
        assert_eq!(names(&suggestions, &root.children), vec!["teleport", "tp"]);
        let tp = suggestions.child_by_name(suggestions.root(), "tp").unwrap();
        assert_eq!(
            suggestions.node(tp).unwrap().redirect,
            suggestions.lookup(teleport)
        );
    }

    #[test]
    fn json_dump_lists_every_node() {
        let mut tree = CommandTree::new();
        tree.register(CommandNode::literal("list").executes(|_| Ok(0)))
            .unwrap();
        let suggestions = SuggestionTree::build(&tree);
        let dump = suggestions.to_json();
        assert_eq!(dump["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(dump["nodes"][1]["name"], "list");
        assert_eq!(dump["nodes"][1]["flags"], json!(["LITERAL", "EXECUTABLE"]));
    }
}
