#![deny(rust_2018_idioms)]

#[macro_use]
extern crate bitflags;

pub mod commands;
pub mod config;
pub mod permissions;

use anyhow::{Context, Result};
use commands::{CommandRegistry, CommandTree};
use config::CmdConfig;
use permissions::OverrideSettings;

/// Registers the builtin commands, runs the permissions finalize pass and freezes the result.
pub fn build_registry(config: &CmdConfig) -> Result<CommandRegistry> {
    let mut tree = CommandTree::new();
    commands::register_commands(&mut tree).context("Failed to register builtin commands")?;
    permissions::apply_overrides(&mut tree, &OverrideSettings::from_config(config))
        .context("Failed to apply permission overrides")?;

    let mut aliases = commands::builtin_aliases();
    aliases.extend(config.aliases());
    Ok(CommandRegistry::with_aliases(tree, aliases))
}
