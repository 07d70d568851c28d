use crate::commands::{
    context::ParseContext,
    error::{SyntaxError, SyntaxErrorKind},
    node::NodeId,
    reader::StringReader,
    tree::CommandTree,
    CommandSource,
};
use rustc_hash::FxHashSet;

/// Outcome of walking one command line through the tree.
#[derive(Clone)]
pub struct ParseResults<'a> {
    context: ParseContext,
    reader: StringReader<'a>,
    errors: Vec<(NodeId, SyntaxError)>,
}

impl<'a> ParseResults<'a> {
    pub fn context(&self) -> &ParseContext {
        &self.context
    }

    pub(super) fn into_context(self) -> ParseContext {
        self.context
    }

    pub fn reader(&self) -> &StringReader<'a> {
        &self.reader
    }

    /// Input left over after the deepest successful walk.
    pub fn remaining(&self) -> &'a str {
        self.reader.remaining()
    }

    pub fn is_complete(&self) -> bool {
        !self.reader.can_read()
    }

    /// Failures of the nodes that were tried at the position the walk stopped.
    pub fn errors(&self) -> &[(NodeId, SyntaxError)] {
        &self.errors
    }

    /// The failure to report when input is left over.
    pub fn syntax_error(&self) -> Option<SyntaxError> {
        if self.is_complete() {
            return None;
        }
        if let [(_, error)] = self.errors.as_slice() {
            return Some(error.clone());
        }
        let kind = if self.context.nodes().is_empty() {
            SyntaxErrorKind::UnknownCommand
        } else {
            SyntaxErrorKind::UnknownArgument
        };
        Some(self.reader.error(kind))
    }
}

/// Walks `input` from the root. Literal siblings are preferred over argument siblings,
/// redirects are followed while input remains, and nodes the source may not use are skipped
/// as if they did not exist.
pub fn parse<'a>(tree: &CommandTree, input: &'a str, source: &dyn CommandSource) -> ParseResults<'a> {
    let mut context = ParseContext::default();
    context.set_current(tree.root());
    let mut walk = Walk {
        tree,
        source,
        visiting: FxHashSet::default(),
    };
    walk.parse_nodes(tree.root(), StringReader::new(input), context)
}

struct Walk<'t> {
    tree: &'t CommandTree,
    source: &'t dyn CommandSource,
    /// `(node, cursor)` pairs on the current path; zero-width redirects could otherwise loop.
    visiting: FxHashSet<(NodeId, usize)>,
}

impl<'t> Walk<'t> {
    fn parse_nodes<'a>(
        &mut self,
        node: NodeId,
        original: StringReader<'a>,
        context: ParseContext,
    ) -> ParseResults<'a> {
        let key = (node, original.cursor());
        if !self.visiting.insert(key) {
            return ParseResults {
                context,
                reader: original,
                errors: Vec::new(),
            };
        }

        let mut errors = Vec::new();
        let mut potentials: Vec<ParseResults<'a>> = Vec::new();

        for child in self.relevant_nodes(node, &original) {
            let child_node = self.tree.node(child);
            if !child_node.can_use(self.source) {
                continue;
            }

            let mut context = context.clone();
            let mut reader = original.clone();
            if let Err(err) = child_node.parse(child, &mut reader, &mut context) {
                errors.push((child, err));
                continue;
            }
            if !child_node.reads_no_input() && reader.can_read() {
                if reader.peek() != Some(' ') {
                    errors.push((child, reader.error(SyntaxErrorKind::ExpectedSeparator)));
                    continue;
                }
                reader.skip();
            }
            context.set_current(child);

            if !reader.can_read() {
                potentials.push(ParseResults {
                    context,
                    reader,
                    errors: Vec::new(),
                });
                continue;
            }

            let next = match child_node.redirect() {
                Some(target) => {
                    context.record_redirect(child);
                    target
                }
                None => child,
            };
            potentials.push(self.parse_nodes(next, reader, context));
        }

        self.visiting.remove(&key);

        // Prefer walks that consumed everything, then walks without errors.
        potentials.sort_by_key(|result| (result.reader.can_read(), !result.errors.is_empty()));
        match potentials.into_iter().next() {
            Some(best) => best,
            None => ParseResults {
                context,
                reader: original,
                errors,
            },
        }
    }

    fn relevant_nodes(&self, node: NodeId, reader: &StringReader<'_>) -> Vec<NodeId> {
        let children = self.tree.children(node);
        let token = reader.peek_token();
        let literal = children.iter().copied().find(|&child| {
            self.tree
                .node(child)
                .as_literal()
                .is_some_and(|literal| literal.matches(token))
        });
        match literal {
            Some(literal) => vec![literal],
            None => children
                .iter()
                .copied()
                .filter(|&child| self.tree.node(child).as_argument().is_some())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{
        argument::{ArgumentParser, ArgumentType, CompletionType},
        flag::{FlagDefinition, FlagSource},
        node::{CommandNode, Subcommand},
        value::{PlayerSelector, Value},
        SourceRef,
    };
    use std::sync::Arc;

    struct Console;

    impl CommandSource for Console {
        fn name(&self) -> &str {
            "console"
        }

        fn has_permission(&self, permission: &str) -> bool {
            permission != "denied"
        }

        fn send_message(&self, _message: &str) {}

        fn send_error(&self, _message: &str) {}
    }

    fn console() -> SourceRef {
        Arc::new(Console)
    }

    fn teleport_tree() -> CommandTree {
        let mut tree = CommandTree::new();
        tree.register(
            CommandNode::literal("tp")
                .subcommand(Subcommand::new("teleport"))
                .then(
                    CommandNode::argument("target", ArgumentType::player())
                        .key("who")
                        .then(
                            CommandNode::argument("x", ArgumentType::any_double())
                                .key("where")
                                .executes(|_| Ok(1)),
                        ),
                ),
        )
        .unwrap();
        tree
    }

    #[test]
    fn arguments_are_stored_under_their_key() {
        let tree = teleport_tree();
        let source = console();
        let results = parse(&tree, "tp Steve 10", source.as_ref());
        assert!(results.is_complete());

        let context = results.context();
        assert_eq!(
            context.arguments().get("who").unwrap(),
            &Value::Player(PlayerSelector::Named("Steve".to_string()))
        );
        assert_eq!(context.arguments().get("where").unwrap(), &Value::Double(10.0));
        assert_eq!(context.target_command().unwrap().name, "teleport");
        assert_eq!(context.nodes().len(), 3);
        assert_eq!(context.nodes()[1].range, 3..8);
    }

    #[test]
    fn unknown_command_and_argument() {
        let tree = teleport_tree();
        let source = console();

        let results = parse(&tree, "teleport Steve", source.as_ref());
        assert_eq!(
            results.syntax_error().unwrap().kind,
            SyntaxErrorKind::UnknownCommand
        );

        let results = parse(&tree, "tp Steve 10 extra", source.as_ref());
        assert_eq!(results.remaining(), "extra");
        assert_eq!(
            results.syntax_error().unwrap().kind,
            SyntaxErrorKind::UnknownArgument
        );
    }

    #[test]
    fn single_failure_is_reported_as_is() {
        let tree = teleport_tree();
        let source = console();
        let results = parse(&tree, "tp Steve up", source.as_ref());
        let error = results.syntax_error().unwrap();
        assert_eq!(error.kind, SyntaxErrorKind::InvalidDouble("up".to_string()));
        assert_eq!(error.cursor(), 9);
    }

    #[test]
    fn denied_nodes_look_like_unknown_commands() {
        let mut tree = CommandTree::new();
        tree.register(CommandNode::literal("secret").require_permission("denied"))
            .unwrap();
        let source = console();
        let results = parse(&tree, "secret", source.as_ref());
        assert_eq!(
            results.syntax_error().unwrap().kind,
            SyntaxErrorKind::UnknownCommand
        );
    }

    #[test]
    fn literals_win_over_arguments() {
        let mut tree = CommandTree::new();
        tree.register(
            CommandNode::literal("give")
                .then(CommandNode::literal("all"))
                .then(CommandNode::argument("player", ArgumentType::word())),
        )
        .unwrap();
        let source = console();
        let results = parse(&tree, "give all", source.as_ref());
        assert!(results.context().arguments().is_empty());
        assert_eq!(
            results.context().current_node(),
            tree.find(&["give", "all"])
        );
    }

    #[test]
    fn redirects_continue_at_target() {
        let mut tree = CommandTree::new();
        let execute = tree
            .register(CommandNode::literal("execute").then(CommandNode::literal("run")))
            .unwrap();
        let alias = tree
            .register(CommandNode::literal("x").redirect(execute))
            .unwrap();
        let source = console();
        let results = parse(&tree, "x run", source.as_ref());
        assert!(results.is_complete());
        assert_eq!(results.context().redirects(), &[alias]);
        assert_eq!(
            results.context().current_node(),
            tree.find(&["execute", "run"])
        );
    }

    #[test]
    fn zero_width_nodes_consume_nothing() {
        let mut tree = CommandTree::new();
        let execute = tree
            .register(CommandNode::literal("execute").then(CommandNode::literal("run")))
            .unwrap();
        tree.register(
            CommandNode::literal("menu").then(
                CommandNode::argument("confirm", ArgumentType::marker()).redirect(execute),
            ),
        )
        .unwrap();
        let source = console();
        let results = parse(&tree, "menu run", source.as_ref());
        assert!(results.is_complete());
        assert_eq!(results.context().nodes().len(), 2);
    }

    #[test]
    fn zero_width_loops_terminate() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        tree.register(CommandNode::argument("loop", ArgumentType::marker()).redirect(root))
            .unwrap();
        let source = console();
        let results = parse(&tree, "anything", source.as_ref());
        assert!(!results.is_complete());
    }

    #[test]
    fn flags_are_recorded_separately_from_arguments() {
        let mut tree = CommandTree::new();
        tree.register(
            CommandNode::literal("save")
                .then(CommandNode::flag(FlagDefinition::new("quiet").short('q'))),
        )
        .unwrap();
        let source = console();

        let results = parse(&tree, "save --quiet", source.as_ref());
        assert!(results.context().arguments().is_empty());
        assert_eq!(
            results.context().flag_source("quiet"),
            Some(FlagSource::Explicit)
        );

        let results = parse(&tree, "save -q", source.as_ref());
        assert_eq!(
            results.context().flag_source("quiet"),
            Some(FlagSource::Explicit)
        );
    }

    /// Reads one token but has nothing to advertise for completion.
    struct Opaque;

    impl ArgumentParser for Opaque {
        fn parse(
            &self,
            reader: &mut StringReader<'_>,
            _context: &ParseContext,
        ) -> Result<Option<Value>, SyntaxError> {
            match reader.read_token() {
                "" => Err(reader.error(SyntaxErrorKind::ExpectedWord)),
                token => Ok(Some(Value::String(token.to_string()))),
            }
        }

        fn completion_types(&self) -> Vec<CompletionType> {
            Vec::new()
        }
    }

    #[test]
    fn arguments_without_completion_types_still_need_a_separator() {
        let mut tree = CommandTree::new();
        tree.register(
            CommandNode::literal("cmd").then(
                CommandNode::argument("a", ArgumentType::custom(Opaque))
                    .then(CommandNode::argument("b", ArgumentType::word()).executes(|_| Ok(1))),
            ),
        )
        .unwrap();
        let source = console();

        let results = parse(&tree, "cmd foo bar", source.as_ref());
        assert!(results.is_complete());
        assert!(results.errors().is_empty());
        let arguments = results.context().arguments();
        assert_eq!(arguments.get("a").unwrap(), &Value::String("foo".to_string()));
        assert_eq!(arguments.get("b").unwrap(), &Value::String("bar".to_string()));
    }

    #[test]
    fn nearest_literal_names_the_subcommand() {
        let mut tree = CommandTree::new();
        tree.register(
            CommandNode::literal("a")
                .subcommand(Subcommand::new("A"))
                .executes(|_| Ok(1))
                .then(
                    CommandNode::literal("b")
                        .executes(|_| Ok(2))
                        .then(
                            CommandNode::literal("c")
                                .subcommand(Subcommand::new("C"))
                                .executes(|_| Ok(3)),
                        ),
                ),
        )
        .unwrap();
        let source = console();
        let target = |input: &str| {
            parse(&tree, input, source.as_ref())
                .context()
                .target_command()
                .map(|subcommand| subcommand.name.clone())
        };

        assert_eq!(target("a").as_deref(), Some("A"));
        assert_eq!(target("a b").as_deref(), Some("A"));
        assert_eq!(target("a b c").as_deref(), Some("C"));
    }
}
