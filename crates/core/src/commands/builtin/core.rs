use crate::commands::error::{CommandResult, RuntimeError, TreeError};
use crate::commands::{
    argument::ArgumentType,
    context::ExecutionContext,
    flag::FlagDefinition,
    node::{CommandNode, Subcommand},
    tree::CommandTree,
    CommandSource, SourceRef,
};
use std::sync::Arc;
use tracing::debug;

pub(super) fn register_commands(tree: &mut CommandTree) -> Result<(), TreeError> {
    register_echo(tree)?;

    tree.register(
        CommandNode::literal("teleport")
            .alias("tp")
            .subcommand(Subcommand::new("teleport").with_description("Move a player"))
            .require_permission("cmdtree.teleport")
            .then(
                CommandNode::argument("target", ArgumentType::player())
                    .then(
                        CommandNode::argument("position", ArgumentType::vec3()).executes(|ctx| {
                            let position = ctx.args().get_vec3("position")?;
                            let (x, y, z) = position.resolve((0.0, 0.0, 0.0));
                            teleport(ctx, &format!("({}, {}, {})", x, y, z))
                        }),
                    )
                    .then(
                        CommandNode::argument("destination", ArgumentType::location()).executes(
                            |ctx| {
                                let location = ctx.args().get_location("destination")?;
                                let (x, y, z) = location.position.resolve((0.0, 0.0, 0.0));
                                teleport(ctx, &format!("({}, {}, {}) in {}", x, y, z, location.world))
                            },
                        ),
                    ),
            ),
    )?;

    tree.register(
        CommandNode::literal("gamemode")
            .subcommand(Subcommand::new("gamemode").with_description("Change your game mode"))
            .require_permission("cmdtree.gamemode")
            .then(
                CommandNode::argument(
                    "mode",
                    ArgumentType::choice(["survival", "creative", "adventure", "spectator"]),
                )
                .executes(|ctx| {
                    let mode = ctx.args().get_string("mode")?;
                    ctx.reply(&format!("Set own game mode to {}", mode))?;
                    Ok(1)
                }),
            ),
    )?;

    tree.register(
        CommandNode::literal("list")
            .subcommand(Subcommand::new("list").with_description("Show who is online"))
            .executes(|ctx| {
                let players = ctx.source().online_players();
                ctx.reply(&format!(
                    "There are {} players online: {}",
                    players.len(),
                    players.join(", ")
                ))?;
                Ok(players.len() as i32)
            }),
    )?;

    let root = tree.root();
    tree.register(
        CommandNode::literal("as")
            .subcommand(Subcommand::new("as").with_description("Run a command as other players"))
            .require_permission("cmdtree.as")
            .then(CommandNode::argument("targets", ArgumentType::player()).fork(
                root,
                |parsed, source| {
                    let targets = parsed.arguments().get_player("targets")?;
                    let names = targets.resolve(source.as_ref());
                    if names.is_empty() {
                        return Err(RuntimeError::NoPlayerFound.into());
                    }
                    Ok(names
                        .into_iter()
                        .map(|name| Impersonated::wrap(name, source))
                        .collect())
                },
            )),
    )?;

    Ok(())
}

fn register_echo(tree: &mut CommandTree) -> Result<(), TreeError> {
    let echo = tree.register(
        CommandNode::literal("echo")
            .subcommand(Subcommand::new("echo").with_description("Print a message"))
            .executes(|ctx| {
                if !ctx.has_flag("quiet") {
                    ctx.reply("")?;
                }
                Ok(0)
            })
            .then(CommandNode::flag(
                FlagDefinition::new("quiet")
                    .short('q')
                    .description("Do not print anything"),
            ))
            .then(CommandNode::flag(
                FlagDefinition::new("loud")
                    .short('l')
                    .description("Print in upper case"),
            ))
            .then(
                CommandNode::argument("message", ArgumentType::greedy_string()).executes(|ctx| {
                    let mut message = ctx.args().get_greedy("message")?;
                    if ctx.has_flag("loud") {
                        message = message.to_uppercase();
                    }
                    if ctx.has_flag("quiet") {
                        debug!("Suppressed echo of '{}'", message);
                    } else {
                        ctx.reply(&message)?;
                    }
                    Ok(1)
                }),
            ),
    )?;

    // Flags loop back to `echo` so they can be combined and followed by the message.
    let mut finalizer = tree.finalizer();
    for flag in ["--quiet", "--loud"] {
        let Some(node) = finalizer.tree().find(&["echo", flag]) else {
            continue;
        };
        finalizer.force_redirect(node, echo)?;
    }
    Ok(())
}

fn teleport(ctx: &mut ExecutionContext<'_>, destination: &str) -> CommandResult<i32> {
    let targets = ctx.args().get_player("target")?.resolve(ctx.source());
    if targets.is_empty() {
        return Err(RuntimeError::NoPlayerFound.into());
    }
    for target in &targets {
        ctx.reply(&format!("Teleporting {} to {}", target, destination))?;
    }
    Ok(targets.len() as i32)
}

/// A source acting under another player's name, with the permissions of whoever ran `as`.
struct Impersonated {
    name: String,
    inner: SourceRef,
}

impl Impersonated {
    fn wrap(name: String, inner: &SourceRef) -> SourceRef {
        Arc::new(Self {
            name,
            inner: inner.clone(),
        })
    }
}

impl CommandSource for Impersonated {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.inner.has_permission(permission)
    }

    fn send_message(&self, message: &str) {
        self.inner.send_message(&format!("[{}] {}", self.name, message));
    }

    fn send_error(&self, message: &str) {
        self.inner.send_error(&format!("[{}] {}", self.name, message));
    }

    fn online_players(&self) -> Vec<String> {
        self.inner.online_players()
    }
}
