use super::{argument_set::ArgumentSet, CommandSource, SourceRef};
use crate::commands::{
    error::{CommandResult, RuntimeError},
    flag::{FlagInvocation, FlagSource},
    node::{NodeId, Subcommand},
    registry::CommandRegistry,
};
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNode {
    pub node: NodeId,
    pub range: Range<usize>,
}

/// Everything recorded while walking one command line.
#[derive(Clone, Default)]
pub struct ParseContext {
    pub(super) arguments: ArgumentSet,
    nodes: Vec<ParsedNode>,
    current: Option<NodeId>,
    target_command: Option<Arc<Subcommand>>,
    flags: Vec<FlagInvocation>,
    redirects: Vec<NodeId>,
}

impl ParseContext {
    pub fn arguments(&self) -> &ArgumentSet {
        &self.arguments
    }

    /// Nodes that consumed input, with the byte range each consumed.
    pub fn nodes(&self) -> &[ParsedNode] {
        &self.nodes
    }

    /// The last node reached, including nodes that consumed nothing.
    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    /// The subcommand of the nearest enclosing literal that carries one.
    pub fn target_command(&self) -> Option<&Arc<Subcommand>> {
        self.target_command.as_ref()
    }

    pub fn flags(&self) -> &[FlagInvocation] {
        &self.flags
    }

    pub fn flag_source(&self, flag: &str) -> Option<FlagSource> {
        self.flags
            .iter()
            .find(|invocation| invocation.flag == flag)
            .map(|invocation| invocation.source)
    }

    /// Nodes whose redirect was followed, in order.
    pub fn redirects(&self) -> &[NodeId] {
        &self.redirects
    }

    pub(super) fn record_range(&mut self, node: NodeId, range: Range<usize>) {
        self.nodes.push(ParsedNode { node, range });
    }

    pub(super) fn set_current(&mut self, node: NodeId) {
        self.current = Some(node);
    }

    pub(super) fn set_target_command(&mut self, subcommand: Arc<Subcommand>) {
        self.target_command = Some(subcommand);
    }

    pub(super) fn record_flag(&mut self, flag: &str, source: FlagSource) {
        if self.flag_source(flag).is_none() {
            self.flags.push(FlagInvocation {
                flag: flag.to_string(),
                source,
            });
        }
    }

    pub(super) fn record_redirect(&mut self, node: NodeId) {
        self.redirects.push(node);
    }
}

/// What an executor sees: who ran it, what was parsed, and the registry it ran in.
pub struct ExecutionContext<'a> {
    source: SourceRef,
    parsed: &'a ParseContext,
    input: &'a str,
    registry: &'a CommandRegistry,
}

impl<'a> ExecutionContext<'a> {
    pub(super) fn new(
        source: SourceRef,
        parsed: &'a ParseContext,
        input: &'a str,
        registry: &'a CommandRegistry,
    ) -> Self {
        Self {
            source,
            parsed,
            input,
            registry,
        }
    }

    pub fn args(&self) -> &ArgumentSet {
        &self.parsed.arguments
    }

    pub fn source(&self) -> &dyn CommandSource {
        self.source.as_ref()
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source
    }

    pub fn input(&self) -> &str {
        self.input
    }

    pub fn parsed(&self) -> &ParseContext {
        self.parsed
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.registry
    }

    pub fn target_command(&self) -> Option<&Arc<Subcommand>> {
        self.parsed.target_command()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.parsed.flag_source(flag).is_some()
    }

    pub fn flag_source(&self, flag: &str) -> Option<FlagSource> {
        self.parsed.flag_source(flag)
    }

    pub fn reply(&self, message: &str) -> CommandResult<()> {
        self.source.send_message(message);
        Ok(())
    }

    pub fn error(&self, message: &str) -> CommandResult<()> {
        self.source.send_error(message);
        Ok(())
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.source.has_permission(permission)
    }

    pub fn require_permission(&self, permission: &str) -> CommandResult<()> {
        if !self.has_permission(permission) {
            return Err(RuntimeError::PermissionDenied {
                permission: permission.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
