use anyhow::{Context, Result};
use clap::Parser;
use cmdtree_core::commands::{CommandRegistry, CommandSource};
use cmdtree_core::config::{self, CmdConfig};
use cmdtree_core::permissions::PermissionSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file; missing keys are filled in with their defaults.
    #[arg(long, default_value = "Config.toml")]
    config: PathBuf,

    /// Run a single command line and exit.
    #[arg(short, long)]
    command: Option<String>,

    /// Print the client suggestion tree as JSON and exit.
    #[arg(long)]
    dump_suggestions: bool,
}

/// The operator typing into this terminal.
struct ConsoleSource {
    permissions: PermissionSet,
    players: Vec<String>,
}

impl ConsoleSource {
    fn new(config: &CmdConfig) -> Self {
        Self {
            permissions: PermissionSet::from_patterns(&config.permissions),
            players: config.players.clone(),
        }
    }
}

impl CommandSource for ConsoleSource {
    fn name(&self) -> &str {
        "Console"
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.has(permission)
    }

    fn send_message(&self, message: &str) {
        println!("{}", message);
    }

    fn send_error(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn online_players(&self) -> Vec<String> {
        self.players.clone()
    }
}

fn main() {
    // Setup logging
    let logfile = tracing_appender::rolling::daily("./logs", "cmdtree.log");
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("CMDTREE_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(logfile.and(std::io::stdout))
        .with_env_filter(env_filter)
        .init();

    if let Err(err) = run(Args::parse()) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::init(&args.config)?;
    let registry = cmdtree_core::build_registry(config)?;

    if args.dump_suggestions {
        let json = serde_json::to_string_pretty(&registry.suggestion_tree().to_json())?;
        println!("{}", json);
        return Ok(());
    }

    let console: Arc<dyn CommandSource> = Arc::new(ConsoleSource::new(config));
    if let Some(line) = args.command {
        registry.handle_command(&line, console)?;
        return Ok(());
    }

    repl(&registry, console, &config.prompt)
}

/// Reads lines until EOF. A line starting with `?` lists completions instead of running.
fn repl(registry: &CommandRegistry, console: Arc<dyn CommandSource>, prompt: &str) -> Result<()> {
    info!("Reading commands from stdin");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", prompt);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        if let Some(partial) = line.strip_prefix('?') {
            let suggestions = registry.suggest(partial, console.as_ref());
            if suggestions.is_empty() {
                println!("(no suggestions)");
            } else {
                println!("{}", suggestions.join("  "));
            }
            continue;
        }

        if let Err(err) = registry.handle_command(&line, console.clone()) {
            error!("{}", err);
        }
    }
    Ok(())
}
