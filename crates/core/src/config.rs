use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use toml_edit::{value, Array, DocumentMut, Item, Table};

static CONFIG: OnceCell<CmdConfig> = OnceCell::new();

/// Loads `path` (filling in and writing back missing keys) and makes it the global config.
pub fn init(path: impl AsRef<Path>) -> Result<&'static CmdConfig> {
    let config = CmdConfig::load(path.as_ref())?;
    CONFIG
        .set(config)
        .map_err(|_| anyhow!("Tried to init config more than once"))?;
    Ok(get())
}

/// The global config, or the defaults if `init` was never called.
pub fn get() -> &'static CmdConfig {
    CONFIG.get_or_init(CmdConfig::default)
}

trait ConfigSerializeDefault {
    fn fix_config(self, name: &str, doc: &mut DocumentMut);
}

macro_rules! impl_simple_default {
    ( $( $type:ty ),* ) => {
        $(
            impl ConfigSerializeDefault for $type {
                fn fix_config(self, name: &str, doc: &mut DocumentMut) {
                    doc.entry(name).or_insert_with(|| value(self));
                }
            }
        )*
    }
}

impl_simple_default!(String, i64, bool);

impl ConfigSerializeDefault for Vec<String> {
    fn fix_config(self, name: &str, doc: &mut DocumentMut) {
        doc.entry(name)
            .or_insert_with(|| value(self.into_iter().collect::<Array>()));
    }
}

impl ConfigSerializeDefault for IndexMap<String, String> {
    fn fix_config(self, name: &str, doc: &mut DocumentMut) {
        doc.entry(name).or_insert_with(|| {
            let mut table = Table::new();
            for (key, replacement) in self {
                table.insert(&key, value(replacement));
            }
            Item::Table(table)
        });
    }
}

macro_rules! gen_config {
    (
        $( $(#[$doc:meta])* $name:ident: $type:ty = $default:expr ),*
    ) => {
        #[derive(Debug, Serialize, Deserialize)]
        pub struct CmdConfig {
            $(
                $(#[$doc])*
                pub $name: $type,
            )*
        }

        impl Default for CmdConfig {
            fn default() -> Self {
                Self {
                    $( $name: $default, )*
                }
            }
        }

        impl CmdConfig {
            pub fn load(config_file: &Path) -> Result<CmdConfig> {
                let str = fs::read_to_string(config_file).unwrap_or_default();
                let mut doc = str
                    .parse::<DocumentMut>()
                    .with_context(|| format!("Failed to parse {}", config_file.display()))?;

                $(
                    <$type as ConfigSerializeDefault>::fix_config($default, stringify!($name), &mut doc);
                )*

                let patched = doc.to_string();
                if str != patched {
                    let mut file = fs::OpenOptions::new()
                        .create(true)
                        .write(true)
                        .truncate(true)
                        .open(config_file)
                        .with_context(|| format!("Failed to open {}", config_file.display()))?;
                    write!(file, "{}", patched)?;
                }

                toml::from_str(&patched)
                    .with_context(|| format!("Invalid config in {}", config_file.display()))
            }
        }
    };
}

gen_config! {
    /// Shown before every line read from the console.
    prompt: String = "> ".to_string(),
    /// Root literal that runs for an empty line; empty disables it.
    root_command: String = String::new(),
    /// Patterns granted to the console.
    permissions: Vec<String> = vec!["cmdtree.*".to_string()],
    /// Patterns whose commands answer with "insufficient permission" for everyone.
    locked_permissions: Vec<String> = Vec::new(),
    /// Players the console knows about.
    players: Vec<String> = vec!["Steve".to_string(), "Alex".to_string()],
    command_aliases: IndexMap<String, String> = IndexMap::new()
}

impl CmdConfig {
    pub fn aliases(&self) -> Vec<(String, String)> {
        self.command_aliases
            .iter()
            .map(|(alias, replacement)| (alias.clone(), replacement.clone()))
            .collect()
    }
}
