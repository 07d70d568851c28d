mod core;

use crate::commands::{
    argument::ArgumentType,
    context::ExecutionContext,
    error::{CommandResult, TreeError},
    node::CommandNode,
    parser,
    tree::CommandTree,
    usage,
};
use tracing::debug;

/// Registers the builtin console commands and applies their own finalize-time wiring.
pub fn register_commands(tree: &mut CommandTree) -> Result<(), TreeError> {
    core::register_commands(tree)?;
    register_help(tree)?;
    debug!("Registered builtin commands");
    Ok(())
}

/// Aliases shipped with the builtin commands, as `(prefix, replacement)` pairs.
pub fn builtin_aliases() -> Vec<(String, String)> {
    [("gmc", "gamemode creative"), ("gmsp", "gamemode spectator")]
        .into_iter()
        .map(|(alias, replacement)| (alias.to_string(), replacement.to_string()))
        .collect()
}

fn register_help(tree: &mut CommandTree) -> Result<(), TreeError> {
    fn exec_help_command(ctx: &mut ExecutionContext<'_>) -> CommandResult<i32> {
        let command = if ctx.args().contains("command") {
            ctx.args().get_greedy("command")?
        } else {
            String::new()
        };
        let command = command.trim();
        let tree = ctx.registry().tree();

        if command.is_empty() {
            let mut commands = Vec::new();
            for &child in tree.children(tree.root()) {
                let node = tree.node(child);
                if !node.can_use(ctx.source()) {
                    continue;
                }
                let Some(literal) = node.as_literal() else {
                    continue;
                };
                let mut line = format!("/{}", literal.name());
                if !literal.aliases().is_empty() {
                    line.push_str(&format!(" (Aliases: {})", literal.aliases().join(", ")));
                }
                if let Some(description) = node
                    .subcommand()
                    .and_then(|subcommand| subcommand.description.as_deref())
                {
                    line.push_str(&format!(" - {}", description));
                }
                commands.push(line);
            }

            commands.sort();
            ctx.reply("Run /help <command> for more information.")?;
            ctx.reply("Available commands:")?;
            for cmd in &commands {
                ctx.reply(&format!(" {}", cmd))?;
            }
            return Ok(commands.len() as i32);
        }

        let results = parser::parse(tree, command, ctx.source());
        let Some(current) = results
            .context()
            .current_node()
            .filter(|_| !results.context().nodes().is_empty())
        else {
            ctx.reply(&format!("Command not found: {}", command))?;
            return Ok(0);
        };

        let path = tree.path_to(current);
        ctx.reply(&format!("Usage: {}", usage::generate_usage(tree, &path)))?;
        let flag_details = usage::generate_flag_details(tree, current);
        if !flag_details.is_empty() {
            ctx.reply("Available flags:")?;
            for flag_detail in flag_details {
                ctx.reply(&format!(" {flag_detail}"))?;
            }
        }
        Ok(1)
    }

    tree.register(
        CommandNode::literal("help")
            .executes(exec_help_command)
            .then(
                CommandNode::argument("command", ArgumentType::greedy_string())
                    .executes(exec_help_command),
            ),
    )?;
    Ok(())
}
