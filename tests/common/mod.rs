#![allow(dead_code)]

use cmdtree_core::commands::{CommandRegistry, CommandSource, CommandTree};
use cmdtree_core::config::CmdConfig;
use cmdtree_core::permissions::PermissionSet;
use std::sync::{Arc, Mutex};

/// A source that records everything it is told.
pub struct TestSource {
    name: String,
    permissions: PermissionSet,
    players: Vec<String>,
    messages: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl TestSource {
    pub fn new(permissions: &[&str]) -> Arc<TestSource> {
        Arc::new(TestSource {
            name: "Tester".to_string(),
            permissions: PermissionSet::from_patterns(permissions),
            players: vec!["Steve".to_string(), "Alex".to_string()],
            messages: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        })
    }

    pub fn operator() -> Arc<TestSource> {
        TestSource::new(&["cmdtree.*"])
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl CommandSource for TestSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.has(permission)
    }

    fn send_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn send_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn online_players(&self) -> Vec<String> {
        self.players.clone()
    }
}

/// The registry the console binary would build from `config`.
pub fn builtin_registry(config: CmdConfig) -> CommandRegistry {
    cmdtree_core::build_registry(&config).unwrap()
}

pub fn default_registry() -> CommandRegistry {
    builtin_registry(CmdConfig::default())
}

pub fn registry_from(tree: CommandTree) -> CommandRegistry {
    CommandRegistry::new(tree)
}
