use crate::commands::{
    context::{ExecutionContext, ParseContext},
    error::{CommandError, CommandResult, InternalError, SyntaxError, SyntaxErrorKind},
    flag::FlagSource,
    node::NodeId,
    parser::{self, ParseResults},
    registry::CommandRegistry,
    usage, SourceRef,
};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

impl CommandRegistry {
    pub fn parse<'a>(&self, command_line: &'a str, source: &SourceRef) -> ParseResults<'a> {
        parser::parse(self.tree(), command_line, source.as_ref())
    }

    /// Parses and runs one command line. Returns the executor's result, or the number of
    /// successful branches when a fork was passed.
    pub fn dispatch(&self, command_line: &str, source: SourceRef) -> CommandResult<i32> {
        let command_line = self.expand_custom_aliases(command_line.trim());
        if command_line.is_empty() {
            return self.run_root_command(source);
        }
        let results = self.parse(&command_line, &source);
        self.execute(results, source)
    }

    /// Runs a line and reports failures to the source the way a console user sees them.
    /// Only internal errors are returned.
    pub fn handle_command(&self, command_line: &str, source: SourceRef) -> Result<(), InternalError> {
        let command_line = self.expand_custom_aliases(command_line.trim());
        if command_line.is_empty() {
            return self.report(self.run_root_command(source.clone()), &source, None);
        }

        let results = self.parse(&command_line, &source);
        let path = results
            .context()
            .current_node()
            .map(|node| self.tree().path_to(node))
            .unwrap_or_default();
        let outcome = self.execute(results, source.clone());
        self.report(outcome, &source, Some(path.as_slice()))
    }

    fn report(
        &self,
        outcome: CommandResult<i32>,
        source: &SourceRef,
        path: Option<&[NodeId]>,
    ) -> Result<(), InternalError> {
        match outcome {
            Ok(result) => {
                debug!("Command by {} returned {}", source.name(), result);
                Ok(())
            }
            Err(CommandError::Syntax(err)) => {
                source.send_error(&err.to_string());
                if let Some(path) = path.filter(|path| path.len() > 1) {
                    let usage = usage::generate_usage(self.tree(), path);
                    source.send_message(&format!("Usage: {}", usage));
                    let base_name = usage::generate_base_name(self.tree(), path);
                    source.send_message(&format!(
                        "Run /help {} for more information.",
                        base_name.trim_start_matches('/')
                    ));
                }
                Ok(())
            }
            Err(CommandError::Runtime(err)) => {
                source.send_error(&err.to_string());
                Ok(())
            }
            Err(CommandError::Internal(err)) => Err(err),
        }
    }

    /// Runs a parsed line: applies redirect modifiers, records defaulted flags and calls the
    /// resolved command once per resulting source.
    pub fn execute(&self, results: ParseResults<'_>, source: SourceRef) -> CommandResult<i32> {
        if let Some(err) = results.syntax_error() {
            return Err(err.into());
        }

        let input = results.reader().input();
        let mut context = results.into_context();
        let node = context.current_node().unwrap_or(self.tree().root());
        let Some(command) = self.tree().resolve_command(node) else {
            let err = SyntaxError::new(SyntaxErrorKind::IncompleteCommand, input, input.len());
            return Err(err.into());
        };
        self.record_defaulted_flags(&mut context);

        let mut sources = vec![source];
        let mut forked = false;
        for &redirect in context.redirects() {
            let node = self.tree().node(redirect);
            forked |= node.is_fork();
            let Some(modifier) = node.modifier() else {
                continue;
            };
            let mut next = Vec::new();
            for source in &sources {
                match modifier(&context, source) {
                    Ok(results) => next.extend(results),
                    Err(err) if forked => {
                        warn!("Skipping fork branch for {}: {}", source.name(), err);
                    }
                    Err(err) => return Err(err),
                }
            }
            sources = next;
        }

        let mut result = 0;
        let mut successes = 0;
        for source in sources {
            let mut ctx = ExecutionContext::new(source.clone(), &context, input, self);
            match command(&mut ctx) {
                Ok(value) => {
                    result += value;
                    successes += 1;
                }
                Err(CommandError::Runtime(err)) if forked => {
                    source.send_error(&err.to_string());
                }
                Err(err) if forked => {
                    warn!("Fork branch for {} failed: {}", source.name(), err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(if forked { successes } else { result })
    }

    /// The root's forced command, if any, serves an empty line.
    fn run_root_command(&self, source: SourceRef) -> CommandResult<i32> {
        let root = self.tree().root();
        let Some(command) = self.tree().resolve_command(root) else {
            return Ok(0);
        };
        let mut context = ParseContext::default();
        context.set_current(root);
        let mut ctx = ExecutionContext::new(source, &context, "", self);
        command(&mut ctx)
    }

    /// Every `default_on` flag offered along the parsed path but not passed is recorded as
    /// defaulted.
    fn record_defaulted_flags(&self, context: &mut ParseContext) {
        let tree = self.tree();
        let mut offering: Vec<NodeId> = vec![tree.root()];
        offering.extend(context.nodes().iter().map(|parsed| parsed.node));
        offering.extend(context.current_node());
        offering.extend(context.redirects().iter().filter_map(|&node| tree.redirect(node)));

        let mut seen = FxHashSet::default();
        let mut defaulted = Vec::new();
        for node in offering {
            if !seen.insert(node) {
                continue;
            }
            for &child in tree.children(node) {
                if let Some(flag) = tree.node(child).flag_definition() {
                    if flag.default_on && context.flag_source(flag.long_name()).is_none() {
                        defaulted.push(flag.long_name().to_string());
                    }
                }
            }
        }
        for flag in defaulted {
            context.record_flag(&flag, FlagSource::Defaulted);
        }
    }
}
