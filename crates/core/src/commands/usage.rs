use super::{
    argument::ArgumentType,
    flag::FlagDefinition,
    node::{NodeId, NodeKind},
    tree::CommandTree,
};
use indexmap::IndexSet;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// Usage line for the command ending at the last node of `path` (root first).
pub fn generate_usage(tree: &CommandTree, path: &[NodeId]) -> String {
    let mut parts = Vec::new();

    for &node in path.iter().skip(1) {
        parts.push(get_display_name(tree, node));
    }

    if let Some(&current_node) = path.last() {
        let suffix = build_usage_suffix(tree, current_node);
        if !suffix.is_empty() {
            parts.push(suffix);
        }
    }

    format!("/{}", parts.join(" "))
}

#[derive(Debug)]
struct UsageStructure {
    content: String,
    trailing_optionals: Vec<String>,
}

fn build_usage_suffix(tree: &CommandTree, node: NodeId) -> String {
    let structure = analyze_structure(tree, node);

    let mut parts = Vec::new();
    if !structure.content.is_empty() {
        parts.push(structure.content);
    }

    for opt in structure.trailing_optionals {
        parts.push(format!("[{}]", opt));
    }

    parts.join(" ")
}

fn analyze_structure(tree: &CommandTree, node: NodeId) -> UsageStructure {
    let children = tree.children(node);
    if children.is_empty() {
        return UsageStructure {
            content: String::new(),
            trailing_optionals: Vec::new(),
        };
    }

    let (optional_children, regular_children): (Vec<NodeId>, Vec<NodeId>) = children
        .iter()
        .partition(|&&child| is_optional(tree, child));

    let mut all_optionals = HashSet::new();
    for &child in &optional_children {
        all_optionals.insert(get_display_name(tree, child));
    }

    let children_optional =
        tree.resolve_command(node).is_some() || !optional_children.is_empty();

    let content = if regular_children.is_empty() {
        String::new()
    } else {
        format_regular_children(tree, &regular_children, children_optional, &mut all_optionals)
    };

    let trailing_optionals = all_optionals.into_iter().sorted().collect_vec();

    UsageStructure {
        content,
        trailing_optionals,
    }
}

fn format_child(tree: &CommandTree, child: NodeId, all_optionals: &mut HashSet<String>) -> String {
    let child_structure = analyze_structure(tree, child);
    all_optionals.extend(child_structure.trailing_optionals);

    let child_name = get_display_name(tree, child);
    if child_structure.content.is_empty() {
        child_name
    } else {
        format!("{} {}", child_name, child_structure.content)
    }
}

fn format_regular_children(
    tree: &CommandTree,
    children: &[NodeId],
    make_optional: bool,
    all_optionals: &mut HashSet<String>,
) -> String {
    let mut groups: HashMap<String, Vec<NodeId>> = HashMap::new();
    for &child in children {
        groups
            .entry(get_display_name(tree, child))
            .or_default()
            .push(child);
    }

    if let [child] = children {
        let result = format_child(tree, *child, all_optionals);
        return if make_optional {
            format!("[{}]", result)
        } else {
            result
        };
    }

    let alternatives = if groups.len() == 1 {
        children
            .iter()
            .map(|&child| get_display_name(tree, child))
            .join(" | ")
    } else {
        children
            .iter()
            .map(|&child| format_child(tree, child, all_optionals))
            .join(" | ")
    };

    if make_optional {
        format!("[{}]", alternatives)
    } else {
        format!("({})", alternatives)
    }
}

/// Greedy arguments and flags never need to be typed.
fn is_optional(tree: &CommandTree, node: NodeId) -> bool {
    match tree.node(node).kind() {
        NodeKind::Argument(argument) => matches!(argument.parser(), ArgumentType::GreedyString),
        NodeKind::FlagLiteral { .. } => true,
        _ => false,
    }
}

fn get_display_name(tree: &CommandTree, node: NodeId) -> String {
    match tree.node(node).kind() {
        NodeKind::Root => String::new(),
        NodeKind::Literal(literal) => literal.name().to_string(),
        NodeKind::FlagLiteral { flag, .. } => flag.literal(),
        NodeKind::Argument(argument) => format!("<{}>", argument.name()),
    }
}

/// One line per flag reachable below `node`, e.g. `-q | --quiet`.
pub fn generate_flag_details(tree: &CommandTree, node: NodeId) -> Vec<String> {
    let mut flags = IndexSet::default();
    get_flag_details_from_node(tree, &mut flags, node);
    flags
        .into_iter()
        .map(|flag| {
            let names = match flag.short_literal() {
                Some(short) => format!("{} | {}", short, flag.literal()),
                None => flag.literal(),
            };
            match flag.get_description() {
                Some(description) => format!("{}: {}", names, description),
                None => names,
            }
        })
        .collect()
}

fn get_flag_details_from_node(
    tree: &CommandTree,
    all_flags: &mut IndexSet<FlagDefinition>,
    node: NodeId,
) {
    if let Some(flag) = tree.node(node).flag_definition() {
        all_flags.insert(flag.clone());
    }
    for &child in tree.children(node) {
        get_flag_details_from_node(tree, all_flags, child);
    }
}

/// The leading literals of `path`, e.g. `/gamemode` for `/gamemode <mode>`.
pub fn generate_base_name(tree: &CommandTree, path: &[NodeId]) -> String {
    let mut parts = Vec::new();

    for &node in path {
        match tree.node(node).kind() {
            NodeKind::Root => {}
            NodeKind::Literal(literal) => parts.push(literal.name()),
            NodeKind::Argument(_) | NodeKind::FlagLiteral { .. } => break,
        }
    }

    format!("/{}", parts.into_iter().join(" "))
}
