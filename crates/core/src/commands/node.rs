use crate::commands::{
    argument::{ArgumentParser, ArgumentType},
    children::ChildRegistry,
    context::{ExecutionContext, ParseContext},
    error::{CommandResult, SyntaxError, SyntaxErrorKind},
    flag::{FlagDefinition, FlagSource},
    reader::StringReader,
    value::Value,
    CommandSource, SourceRef,
};
use std::sync::Arc;

/// Stable handle of a node inside a `CommandTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) u32);

impl NodeId {
    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

pub type Executor = Arc<dyn Fn(&mut ExecutionContext<'_>) -> CommandResult<i32> + Send + Sync>;
pub type Requirement = Arc<dyn Fn(&dyn CommandSource) -> bool + Send + Sync>;
pub type RedirectModifier =
    Arc<dyn Fn(&ParseContext, &SourceRef) -> CommandResult<Vec<SourceRef>> + Send + Sync>;
pub type SuggestionProvider = Arc<dyn Fn(&dyn CommandSource, &str) -> Vec<String> + Send + Sync>;
pub type ValueModifier =
    Arc<dyn Fn(Value, &ParseContext) -> Result<Value, SyntaxError> + Send + Sync>;

/// The command a literal stands for, as reported to executors and help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcommand {
    pub name: String,
    pub description: Option<String>,
}

impl Subcommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub struct LiteralNode {
    pub(super) name: String,
    pub(super) aliases: Vec<String>,
    pub(super) subcommand: Option<Arc<Subcommand>>,
}

impl LiteralNode {
    fn new(name: String) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            subcommand: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| alias == token)
    }

    fn parse(&self, reader: &mut StringReader<'_>) -> Result<(), SyntaxError> {
        let start = reader.cursor();
        let token = reader.read_token();
        if self.matches(token) {
            Ok(())
        } else {
            reader.set_cursor(start);
            Err(reader.error(SyntaxErrorKind::ExpectedLiteral(self.name.clone())))
        }
    }
}

pub struct ArgumentNode {
    pub(super) name: String,
    pub(super) key: String,
    pub(super) parser: ArgumentType,
    pub(super) completer: Option<SuggestionProvider>,
    pub(super) modifier: Option<ValueModifier>,
}

impl ArgumentNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the parsed value is stored. Defaults to the name.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn parser(&self) -> &ArgumentType {
        &self.parser
    }

    pub fn list_suggestions(&self, source: &dyn CommandSource, prefix: &str) -> Vec<String> {
        if let Some(completer) = &self.completer {
            return completer(source, prefix);
        }
        let mut suggestions = self.parser.list_suggestions(prefix);
        if matches!(self.parser, ArgumentType::Player) {
            suggestions.extend(source.online_players());
        }
        suggestions
    }

    fn parse(
        &self,
        id: NodeId,
        reader: &mut StringReader<'_>,
        context: &mut ParseContext,
    ) -> Result<(), SyntaxError> {
        let start = reader.cursor();
        let value = self
            .parser
            .parse(reader, context)
            .map_err(|err| err.with_examples(self.parser.examples()))?;

        if self.parser.reads_no_input() {
            return Ok(());
        }

        if let Some(value) = value {
            let value = match &self.modifier {
                Some(modifier) => modifier(value, context)?,
                None => value,
            };
            context.arguments.insert(&self.key, value);
        }
        context.record_range(id, start..reader.cursor());
        Ok(())
    }
}

pub enum NodeKind {
    Root,
    Literal(LiteralNode),
    Argument(ArgumentNode),
    FlagLiteral {
        literal: LiteralNode,
        flag: FlagDefinition,
    },
}

pub struct CommandNode {
    pub(super) kind: NodeKind,
    pub(super) children: ChildRegistry,
    pub(super) parent: Option<NodeId>,
    pub(super) executor: Option<Executor>,
    pub(super) forced_executor: Option<Executor>,
    pub(super) forced_command: Option<Executor>,
    pub(super) requirements: Vec<Requirement>,
    pub(super) permissions: Vec<String>,
    pub(super) redirect: Option<NodeId>,
    pub(super) forced_redirect: Option<NodeId>,
    pub(super) modifier: Option<RedirectModifier>,
    pub(super) fork: bool,
}

impl CommandNode {
    pub(super) fn root() -> Self {
        Self::from_kind(NodeKind::Root)
    }

    fn from_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            children: ChildRegistry::default(),
            parent: None,
            executor: None,
            forced_executor: None,
            forced_command: None,
            requirements: Vec::new(),
            permissions: Vec::new(),
            redirect: None,
            forced_redirect: None,
            modifier: None,
            fork: false,
        }
    }

    pub fn literal(name: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Literal(LiteralNode::new(name.into())))
    }

    pub fn argument(name: impl Into<String>, arg_type: impl Into<ArgumentType>) -> NodeBuilder {
        let name = name.into();
        NodeBuilder::new(NodeKind::Argument(ArgumentNode {
            key: name.clone(),
            name,
            parser: arg_type.into(),
            completer: None,
            modifier: None,
        }))
    }

    pub fn flag(flag: FlagDefinition) -> NodeBuilder {
        let mut literal = LiteralNode::new(flag.literal());
        literal.aliases.extend(flag.short_literal());
        NodeBuilder::new(NodeKind::FlagLiteral { literal, flag })
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Root => "",
            NodeKind::Literal(literal) | NodeKind::FlagLiteral { literal, .. } => &literal.name,
            NodeKind::Argument(argument) => &argument.name,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    pub fn as_literal(&self) -> Option<&LiteralNode> {
        match &self.kind {
            NodeKind::Literal(literal) | NodeKind::FlagLiteral { literal, .. } => Some(literal),
            _ => None,
        }
    }

    pub fn as_argument(&self) -> Option<&ArgumentNode> {
        match &self.kind {
            NodeKind::Argument(argument) => Some(argument),
            _ => None,
        }
    }

    pub fn flag_definition(&self) -> Option<&FlagDefinition> {
        match &self.kind {
            NodeKind::FlagLiteral { flag, .. } => Some(flag),
            _ => None,
        }
    }

    pub fn subcommand(&self) -> Option<&Arc<Subcommand>> {
        self.as_literal()
            .and_then(|literal| literal.subcommand.as_ref())
    }

    /// An argument that consumes nothing from the input, so no separator follows it.
    pub fn reads_no_input(&self) -> bool {
        self.as_argument()
            .is_some_and(|argument| argument.parser.reads_no_input())
    }

    /// An argument that never occupies a slot in the completion tree: it either reads no input
    /// or has no client-side completion type.
    pub fn is_zero_width(&self) -> bool {
        self.as_argument().is_some_and(|argument| {
            argument.parser.reads_no_input() || argument.parser.completion_types().is_empty()
        })
    }

    pub fn children(&self) -> &[NodeId] {
        self.children.children()
    }

    pub fn child_registry(&self) -> &ChildRegistry {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The redirect in effect: a forced redirect while the node is childless, otherwise the
    /// redirect it was built with.
    pub fn redirect(&self) -> Option<NodeId> {
        self.forced_redirect().or(self.redirect)
    }

    pub(super) fn forced_redirect(&self) -> Option<NodeId> {
        self.forced_redirect
            .filter(|_| self.children.is_empty())
    }

    pub fn can_force_redirect(&self) -> bool {
        !self.is_root() && self.children.is_empty()
    }

    /// The explicit executor, or the forced one if there is none.
    pub fn command(&self) -> Option<&Executor> {
        self.executor.as_ref().or(self.forced_executor.as_ref())
    }

    pub fn modifier(&self) -> Option<&RedirectModifier> {
        self.modifier.as_ref()
    }

    pub fn is_fork(&self) -> bool {
        self.fork
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn can_use(&self, source: &dyn CommandSource) -> bool {
        self.requirements
            .iter()
            .all(|requirement| requirement(source))
    }

    /// Single-step parse of this node at the reader's position.
    pub(super) fn parse(
        &self,
        id: NodeId,
        reader: &mut StringReader<'_>,
        context: &mut ParseContext,
    ) -> Result<(), SyntaxError> {
        let start = reader.cursor();
        match &self.kind {
            NodeKind::Root => Ok(()),
            NodeKind::Literal(literal) => {
                literal.parse(reader)?;
                context.record_range(id, start..reader.cursor());
                if let Some(subcommand) = &literal.subcommand {
                    context.set_target_command(subcommand.clone());
                }
                Ok(())
            }
            NodeKind::FlagLiteral { literal, flag } => {
                literal.parse(reader)?;
                context.record_range(id, start..reader.cursor());
                context.record_flag(&flag.long, FlagSource::Explicit);
                Ok(())
            }
            NodeKind::Argument(argument) => argument.parse(id, reader, context),
        }
    }
}

/// Registration-time description of a node and its subtree.
pub struct NodeBuilder {
    pub(super) kind: NodeKind,
    pub(super) children: Vec<NodeBuilder>,
    pub(super) executor: Option<Executor>,
    pub(super) requirements: Vec<Requirement>,
    pub(super) permissions: Vec<String>,
    pub(super) redirect: Option<NodeId>,
    pub(super) modifier: Option<RedirectModifier>,
    pub(super) fork: bool,
}

impl NodeBuilder {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            executor: None,
            requirements: Vec::new(),
            permissions: Vec::new(),
            redirect: None,
            modifier: None,
            fork: false,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Root => "",
            NodeKind::Literal(literal) | NodeKind::FlagLiteral { literal, .. } => &literal.name,
            NodeKind::Argument(argument) => &argument.name,
        }
    }

    pub fn then(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn executes<F>(mut self, executor: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_>) -> CommandResult<i32> + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn executes_with(mut self, executor: Executor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let NodeKind::Literal(literal) = &mut self.kind else {
            panic!("Can not create alias for non-literal command nodes")
        };
        literal.aliases.push(alias.into());
        self
    }

    pub fn subcommand(mut self, subcommand: Subcommand) -> Self {
        let NodeKind::Literal(literal) = &mut self.kind else {
            panic!("Only literal command nodes can describe a subcommand")
        };
        literal.subcommand = Some(Arc::new(subcommand));
        self
    }

    /// Stores the parsed value under `key` instead of the node's name.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        let NodeKind::Argument(argument) = &mut self.kind else {
            panic!("Only argument command nodes have a value key")
        };
        argument.key = key.into();
        self
    }

    pub fn suggests<F>(mut self, completer: F) -> Self
    where
        F: Fn(&dyn CommandSource, &str) -> Vec<String> + Send + Sync + 'static,
    {
        let NodeKind::Argument(argument) = &mut self.kind else {
            panic!("Only argument command nodes can have a completer")
        };
        argument.completer = Some(Arc::new(completer));
        self
    }

    pub fn map_value<F>(mut self, modifier: F) -> Self
    where
        F: Fn(Value, &ParseContext) -> Result<Value, SyntaxError> + Send + Sync + 'static,
    {
        let NodeKind::Argument(argument) = &mut self.kind else {
            panic!("Only argument command nodes can modify their value")
        };
        argument.modifier = Some(Arc::new(modifier));
        self
    }

    pub fn requires<F>(mut self, requirement: F) -> Self
    where
        F: Fn(&dyn CommandSource) -> bool + Send + Sync + 'static,
    {
        self.requirements.push(Arc::new(requirement));
        self
    }

    pub fn require_permission(mut self, permission: impl Into<String>) -> Self {
        let permission = permission.into();
        self.permissions.push(permission.clone());
        self.requires(move |source| source.has_permission(&permission))
    }

    pub fn redirect(mut self, target: NodeId) -> Self {
        self.redirect = Some(target);
        self
    }

    pub fn redirect_with<F>(mut self, target: NodeId, modifier: F) -> Self
    where
        F: Fn(&ParseContext, &SourceRef) -> CommandResult<Vec<SourceRef>> + Send + Sync + 'static,
    {
        self.redirect = Some(target);
        self.modifier = Some(Arc::new(modifier));
        self
    }

    /// Like `redirect_with`, but each resulting source continues independently.
    pub fn fork<F>(self, target: NodeId, modifier: F) -> Self
    where
        F: Fn(&ParseContext, &SourceRef) -> CommandResult<Vec<SourceRef>> + Send + Sync + 'static,
    {
        let mut builder = self.redirect_with(target, modifier);
        builder.fork = true;
        builder
    }

    pub(super) fn into_parts(self) -> (CommandNode, Vec<NodeBuilder>) {
        let mut node = CommandNode::from_kind(self.kind);
        node.executor = self.executor;
        node.requirements = self.requirements;
        node.permissions = self.permissions;
        node.redirect = self.redirect;
        node.modifier = self.modifier;
        node.fork = self.fork;
        (node, self.children)
    }
}
