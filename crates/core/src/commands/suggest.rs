use crate::commands::{
    autocomplete::{SuggestionNode, SuggestionTree, WireId},
    tree::CommandTree,
    CommandSource,
};
use indexmap::IndexSet;

/// Completions for the last token of `line`, in tree order and without duplicates.
pub(super) fn suggest(
    tree: &CommandTree,
    suggestions: &SuggestionTree,
    line: &str,
    source: &dyn CommandSource,
) -> Vec<String> {
    let (completed, last): (Vec<&str>, &str) = match line.rsplit_once(' ') {
        Some((head, last)) => (head.split(' ').filter(|t| !t.is_empty()).collect(), last),
        None => (Vec::new(), line),
    };

    let walk = SuggestWalk {
        tree,
        suggestions,
        source,
        prefix: last.to_lowercase(),
    };
    let mut found = IndexSet::new();
    walk.walk(suggestions.root(), &completed, last, &mut found);
    found.into_iter().collect()
}

struct SuggestWalk<'a> {
    tree: &'a CommandTree,
    suggestions: &'a SuggestionTree,
    source: &'a dyn CommandSource,
    prefix: String,
}

impl SuggestWalk<'_> {
    fn visible(&self, node: &SuggestionNode) -> bool {
        self.tree
            .get(node.origin)
            .is_some_and(|origin| origin.can_use(self.source))
    }

    fn walk(&self, at: WireId, tokens: &[&str], last: &str, found: &mut IndexSet<String>) {
        let children = self.suggestions.continuation(at);
        if tokens.is_empty() {
            for &child in children {
                self.collect(child, last, found);
            }
            return;
        }

        for &child in children {
            let Some(node) = self.suggestions.node(child) else {
                continue;
            };
            if !self.visible(node) {
                continue;
            }
            if node.is_literal() {
                if node.name.as_deref() == Some(tokens[0]) {
                    self.walk(child, &tokens[1..], last, found);
                }
                continue;
            }
            let Some(parser) = node.parser else {
                continue;
            };
            // A greedy slot swallows the rest of the line.
            let Some(width) = parser.token_width() else {
                continue;
            };
            if tokens.len() >= width && parser.accepts(&tokens[..width]) {
                self.walk(child, &tokens[width..], last, found);
            }
        }
    }

    fn collect(&self, child: WireId, last: &str, found: &mut IndexSet<String>) {
        let Some(node) = self.suggestions.node(child) else {
            return;
        };
        if !self.visible(node) {
            return;
        }

        if node.is_literal() {
            if let Some(name) = &node.name {
                self.offer(name.clone(), found);
            }
            return;
        }
        if !node.first_link {
            return;
        }
        let Some(argument) = self
            .tree
            .get(node.origin)
            .and_then(|origin| origin.as_argument())
        else {
            return;
        };
        for candidate in argument.list_suggestions(self.source, last) {
            self.offer(candidate, found);
        }
    }

    fn offer(&self, candidate: String, found: &mut IndexSet<String>) {
        if candidate.to_lowercase().starts_with(&self.prefix) {
            found.insert(candidate);
        }
    }
}
