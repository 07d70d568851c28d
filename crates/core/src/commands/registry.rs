use super::{autocomplete::SuggestionTree, suggest, tree::CommandTree, CommandSource};
use tracing::info;

/// A finalized command tree together with the completion tree derived from it. Nothing in a
/// registry changes after construction, so it can be shared between threads freely.
pub struct CommandRegistry {
    tree: CommandTree,
    suggestions: SuggestionTree,
    custom_aliases: Vec<(String, String)>,
}

/// Resolves alias expansions while building the completion tree; sees every command.
struct AliasResolver;

impl CommandSource for AliasResolver {
    fn name(&self) -> &str {
        "alias resolver"
    }

    fn has_permission(&self, _permission: &str) -> bool {
        true
    }

    fn send_message(&self, _message: &str) {}

    fn send_error(&self, _message: &str) {}
}

impl CommandRegistry {
    pub fn new(tree: CommandTree) -> Self {
        Self::with_aliases(tree, Vec::new())
    }

    /// `aliases` are `(prefix, replacement)` pairs. A `{}` in the replacement is substituted
    /// with whatever followed the prefix; otherwise the rest is appended.
    pub fn with_aliases(tree: CommandTree, aliases: Vec<(String, String)>) -> Self {
        let custom_aliases: Vec<(String, String)> = aliases
            .into_iter()
            .map(|(alias, replacement)| (alias.trim().to_string(), replacement.trim().to_string()))
            .collect();
        let suggestions = SuggestionTree::build_with_aliases(&tree, &custom_aliases, &AliasResolver);
        info!(
            "Command registry ready: {} nodes, {} suggestion nodes",
            tree.len(),
            suggestions.nodes().len()
        );
        Self {
            tree,
            suggestions,
            custom_aliases,
        }
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn suggestion_tree(&self) -> &SuggestionTree {
        &self.suggestions
    }

    pub fn get_custom_aliases(&self) -> &[(String, String)] {
        &self.custom_aliases
    }

    /// Completions for the last token of `line`. An alias is only expanded once its token is
    /// complete, so the alias itself can still be completed.
    pub fn suggest(&self, line: &str, source: &dyn CommandSource) -> Vec<String> {
        let line = line.trim_start();
        let line = if line.contains(' ') {
            self.expand_custom_aliases(line)
        } else {
            line.to_string()
        };
        suggest::suggest(&self.tree, &self.suggestions, &line, source)
    }

    pub(super) fn expand_custom_aliases(&self, command_line: &str) -> String {
        for (alias, expansion) in self.get_custom_aliases() {
            let Some(rest) = command_line.strip_prefix(alias.as_str()) else {
                continue;
            };
            if !rest.is_empty() && !rest.starts_with(' ') {
                continue;
            }
            if expansion.contains("{}") {
                return expansion.replace("{}", rest.trim_start());
            }
            return format!("{}{}", expansion, rest);
        }

        command_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::node::CommandNode;

    fn registry() -> CommandRegistry {
        let mut tree = CommandTree::new();
        tree.register(
            CommandNode::literal("gamemode")
                .then(CommandNode::literal("creative"))
                .then(CommandNode::literal("spectator")),
        )
        .unwrap();
        CommandRegistry::with_aliases(
            tree,
            vec![
                ("gmc".to_string(), "gamemode creative".to_string()),
                ("say".to_string(), "echo [{}]".to_string()),
            ],
        )
    }

    #[test]
    fn aliases_expand_on_token_boundaries() {
        let registry = registry();
        assert_eq!(registry.expand_custom_aliases("gmc"), "gamemode creative");
        assert_eq!(registry.expand_custom_aliases("gmc now"), "gamemode creative now");
        assert_eq!(registry.expand_custom_aliases("gmcx"), "gmcx");
        assert_eq!(registry.expand_custom_aliases("say hi there"), "echo [hi there]");
    }

    #[test]
    fn aliases_are_published_as_root_literals() {
        let registry = registry();
        let suggestions = registry.suggestion_tree();
        let gmc = suggestions
            .child_by_name(suggestions.root(), "gmc")
            .unwrap();
        let creative = registry.tree().find(&["gamemode", "creative"]).unwrap();
        assert_eq!(
            suggestions.node(gmc).unwrap().redirect,
            suggestions.lookup(creative)
        );
        // `echo` does not exist, so `say` is not published.
        assert!(suggestions.child_by_name(suggestions.root(), "say").is_none());
    }
}
