use crate::commands::{CommandNode, CommandTree, NodeId, RuntimeError, TreeError};
use crate::config::CmdConfig;
use tracing::{debug, info, warn};

/// Name of the shared leaf every locked branch is rerouted to.
pub const INSUFFICIENT_PERMISSION_NODE: &str = "insufficient-permission";

#[derive(Debug)]
enum PathSegment {
    WildCard,
    Named(String),
}

#[derive(Debug)]
struct PermissionNode {
    path: Vec<PathSegment>,
    value: bool,
}

impl PermissionNode {
    fn matches(&self, str: &str) -> bool {
        let mut segments = str.split('.');
        for expected in &self.path {
            match expected {
                PathSegment::WildCard => return true,
                PathSegment::Named(name) => match segments.next() {
                    Some(segment) if segment == name => {}
                    _ => return false,
                },
            }
        }
        segments.next().is_none()
    }
}

/// Ordered permission patterns such as `cmdtree.*` or `-cmdtree.teleport`. The first pattern
/// matching a permission decides its value.
#[derive(Debug, Default)]
pub struct PermissionSet {
    nodes: Vec<PermissionNode>,
}

impl PermissionSet {
    /// A leading `-` denies what the rest of the pattern matches.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            match pattern.strip_prefix('-') {
                Some(denied) => set.insert(denied, false),
                None => set.insert(pattern, true),
            }
        }
        set
    }

    pub fn get_node_val(&self, name: &str) -> Option<bool> {
        for node in &self.nodes {
            if node.matches(name) {
                return Some(node.value);
            }
        }
        None
    }

    /// Permissions not mentioned by any pattern are not granted.
    pub fn has(&self, name: &str) -> bool {
        self.get_node_val(name).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, name: &str, value: bool) {
        let path = name
            .split('.')
            .map(|s| match s {
                "*" => PathSegment::WildCard,
                s => PathSegment::Named(s.to_owned()),
            })
            .collect();
        self.nodes.push(PermissionNode { path, value });
    }
}

/// What the finalize pass changes in a freshly registered tree.
#[derive(Debug, Default)]
pub struct OverrideSettings {
    /// Branches guarded by a matching permission answer with "insufficient permission".
    pub locked: PermissionSet,
    /// Root literal whose command runs for an empty line.
    pub root_command: Option<String>,
}

impl OverrideSettings {
    pub fn from_config(config: &CmdConfig) -> Self {
        Self {
            locked: PermissionSet::from_patterns(&config.locked_permissions),
            root_command: Some(config.root_command.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }
}

/// Rewires a built tree according to `settings`. Returns the number of rerouted nodes.
///
/// Every childless node below a node whose permissions are locked is force-redirected to one
/// shared leaf that never matches on its own and fails with
/// [`RuntimeError::InsufficientPermission`]. Nodes in such a branch that have children keep
/// parsing them, but their own command is replaced by the leaf's.
pub fn apply_overrides(
    tree: &mut CommandTree,
    settings: &OverrideSettings,
) -> Result<usize, TreeError> {
    let mut rerouted = 0;

    if !settings.locked.is_empty() {
        let locked: Vec<NodeId> = tree
            .ids()
            .filter(|&id| {
                tree.node(id)
                    .permissions()
                    .iter()
                    .any(|permission| settings.locked.get_node_val(permission) == Some(true))
            })
            .collect();

        if !locked.is_empty() {
            let leaf = tree.build(
                CommandNode::literal(INSUFFICIENT_PERMISSION_NODE)
                    .requires(|_| false)
                    .executes(|_| Err(RuntimeError::InsufficientPermission.into())),
            )?;

            let mut targets = Vec::new();
            let mut branches = Vec::new();
            for &id in &locked {
                collect_reroutes(tree, id, &mut targets, &mut branches);
            }
            targets.sort();
            targets.dedup();
            branches.sort();
            branches.dedup();

            let denied = tree.node(leaf).command().cloned();
            let mut finalizer = tree.finalizer();
            for target in targets {
                finalizer.force_redirect(target, leaf)?;
                rerouted += 1;
            }
            if let Some(denied) = denied {
                for branch in branches {
                    finalizer.force_command(branch, denied.clone())?;
                    rerouted += 1;
                }
            }
            info!(
                "Rerouted {} nodes below {} locked commands",
                rerouted,
                locked.len()
            );
        }
    }

    if let Some(name) = &settings.root_command {
        let command = tree
            .find(&[name.as_str()])
            .and_then(|id| tree.resolve_command(id))
            .cloned();
        match command {
            Some(command) => {
                let root = tree.root();
                tree.finalizer().force_executor(root, command)?;
                debug!("Using '{}' as the root command", name);
            }
            None => warn!("Root command '{}' does not name a runnable command", name),
        }
    }

    Ok(rerouted)
}

/// Childless nodes go to `leaves`. Nodes with children that would run a command of their own go
/// to `branches`, since a forced redirect can not apply to them.
fn collect_reroutes(
    tree: &CommandTree,
    id: NodeId,
    leaves: &mut Vec<NodeId>,
    branches: &mut Vec<NodeId>,
) {
    let children = tree.children(id);
    if children.is_empty() {
        leaves.push(id);
        return;
    }
    if tree.resolve_command(id).is_some() {
        branches.push(id);
    }
    for &child in children {
        collect_reroutes(tree, child, leaves, branches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ArgumentType;

    #[test]
    fn wildcards_match_remaining_segments() {
        let set = PermissionSet::from_patterns(["-cmdtree.teleport", "cmdtree.*"]);
        assert_eq!(set.get_node_val("cmdtree.teleport"), Some(false));
        assert_eq!(set.get_node_val("cmdtree.gamemode"), Some(true));
        assert_eq!(set.get_node_val("cmdtree.gamemode.other"), Some(true));
        assert_eq!(set.get_node_val("other.gamemode"), None);
    }

    #[test]
    fn patterns_do_not_match_longer_or_shorter_names() {
        let set = PermissionSet::from_patterns(["cmdtree.teleport"]);
        assert!(set.has("cmdtree.teleport"));
        assert!(!set.has("cmdtree"));
        assert!(!set.has("cmdtree.teleport.others"));
    }

    #[test]
    fn locked_branches_are_rerouted() {
        let mut tree = CommandTree::new();
        tree.register(
            CommandNode::literal("ban")
                .require_permission("cmdtree.ban")
                .then(CommandNode::argument("player", ArgumentType::player()).executes(|_| Ok(1))),
        )
        .unwrap();
        tree.register(CommandNode::literal("list").executes(|_| Ok(1)))
            .unwrap();

        let settings = OverrideSettings {
            locked: PermissionSet::from_patterns(["cmdtree.ban"]),
            root_command: Some("list".to_string()),
        };
        assert_eq!(apply_overrides(&mut tree, &settings).unwrap(), 1);

        let player = tree.find(&["ban", "player"]).unwrap();
        let leaf = tree.redirect(player).unwrap();
        assert_eq!(tree.node(leaf).name(), INSUFFICIENT_PERMISSION_NODE);
        assert!(tree.node(leaf).parent().is_none());
        assert!(tree.resolve_command(tree.root()).is_some());
    }

    #[test]
    fn locked_branches_lose_their_own_command() {
        let mut tree = CommandTree::new();
        let ban = tree
            .register(
                CommandNode::literal("ban")
                    .require_permission("cmdtree.ban")
                    .executes(|_| Ok(42))
                    .then(
                        CommandNode::argument("player", ArgumentType::player())
                            .executes(|_| Ok(1)),
                    ),
            )
            .unwrap();

        let settings = OverrideSettings {
            locked: PermissionSet::from_patterns(["cmdtree.ban"]),
            root_command: None,
        };
        assert_eq!(apply_overrides(&mut tree, &settings).unwrap(), 2);

        let player = tree.find(&["ban", "player"]).unwrap();
        let leaf = tree.redirect(player).unwrap();
        let denied = tree.resolve_command(leaf).unwrap();
        assert!(std::sync::Arc::ptr_eq(tree.resolve_command(ban).unwrap(), denied));
        assert_eq!(tree.children(ban), &[player]);
    }
}
