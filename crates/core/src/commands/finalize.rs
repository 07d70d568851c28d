use crate::commands::{
    error::TreeError,
    node::{Executor, NodeId},
    tree::CommandTree,
};
use tracing::{debug, warn};

/// Post-registration overrides. These are applied after every command has been registered and
/// take priority over what the nodes were built with.
pub struct TreeFinalizer<'a> {
    tree: &'a mut CommandTree,
}

impl<'a> TreeFinalizer<'a> {
    pub(super) fn new(tree: &'a mut CommandTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &CommandTree {
        self.tree
    }

    /// True for every node except the root that has no children.
    pub fn can_force_redirect(&self, id: NodeId) -> bool {
        self.tree.can_force_redirect(id)
    }

    /// Makes a childless node behave as a redirect to `target`.
    ///
    /// Forcing a redirect on the root is ignored. If the node later gains children the override
    /// stops applying and the node reports no redirect.
    pub fn force_redirect(&mut self, id: NodeId, target: NodeId) -> Result<(), TreeError> {
        self.tree.get(target).ok_or(TreeError::UnknownNode(target))?;
        let node = self.tree.get_mut(id)?;
        if node.is_root() {
            warn!("Ignoring forced redirect on the root node");
            return Ok(());
        }
        if !node.children.is_empty() {
            return Err(TreeError::InvalidShape {
                name: node.name().to_string(),
            });
        }
        debug!("Forcing redirect of '{}' to {:?}", node.name(), target);
        node.forced_redirect = Some(target);
        Ok(())
    }

    /// Gives the node a command to run when input ends there. A command the node was built
    /// with is never replaced.
    pub fn force_executor(&mut self, id: NodeId, executor: Executor) -> Result<(), TreeError> {
        let node = self.tree.get_mut(id)?;
        if node.executor.is_some() {
            debug!(
                "'{}' has an explicit executor, it takes precedence over the forced one",
                node.name()
            );
        }
        node.forced_executor = Some(executor);
        Ok(())
    }

    /// Replaces whatever would run when input ends at this node, including the executor it was
    /// built with and any redirect. Children are still parsed as usual. Ignored on the root.
    pub fn force_command(&mut self, id: NodeId, executor: Executor) -> Result<(), TreeError> {
        let node = self.tree.get_mut(id)?;
        if node.is_root() {
            warn!("Ignoring forced command on the root node");
            return Ok(());
        }
        debug!("Forcing command of '{}'", node.name());
        node.forced_command = Some(executor);
        Ok(())
    }
}
