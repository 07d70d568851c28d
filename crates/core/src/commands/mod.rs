mod argument;
mod argument_parser;
mod argument_set;
mod autocomplete;
mod builtin;
mod children;
mod context;
mod error;
mod executor;
mod finalize;
mod flag;
mod node;
mod parser;
mod reader;
mod registry;
mod suggest;
mod tree;
mod usage;
mod value;

pub use argument::{ArgumentParser, ArgumentType, CompletionType, StringKind};
pub use argument_set::ArgumentSet;
pub use autocomplete::{CommandFlags, SuggestionNode, SuggestionTree, WireId, ASK_SERVER};
pub use children::ChildRegistry;
pub use context::{ExecutionContext, ParseContext, ParsedNode};
pub use error::{
    CommandError, CommandResult, InternalError, RuntimeError, SyntaxError, SyntaxErrorKind,
    TreeError,
};
pub use finalize::TreeFinalizer;
pub use flag::{FlagDefinition, FlagInvocation, FlagSource};
pub use node::{
    ArgumentNode, CommandNode, Executor, LiteralNode, NodeBuilder, NodeId, NodeKind,
    RedirectModifier, Requirement, Subcommand, SuggestionProvider, ValueModifier,
};
pub use parser::{parse, ParseResults};
pub use reader::StringReader;
pub use registry::CommandRegistry;
pub use tree::CommandTree;
pub use usage::{generate_base_name, generate_flag_details, generate_usage};
pub use value::{BlockPos, ColumnPos, Location, PlayerSelector, RelativeCoord, Value, Vec3};

pub use builtin::{builtin_aliases, register_commands};

use std::sync::Arc;

/// Whoever runs a command: the console, a player, or a source derived from one by a redirect.
pub trait CommandSource: Send + Sync {
    fn name(&self) -> &str;

    fn has_permission(&self, permission: &str) -> bool;

    fn send_message(&self, message: &str);

    fn send_error(&self, message: &str);

    /// Player names this source can see; used by selectors and completion.
    fn online_players(&self) -> Vec<String> {
        Vec::new()
    }
}

pub type SourceRef = Arc<dyn CommandSource>;
