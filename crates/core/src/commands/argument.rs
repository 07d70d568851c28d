use super::argument_parser::*;
use crate::commands::{context::ParseContext, error::SyntaxError, reader::StringReader};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Word,
    Phrase,
    Greedy,
}

/// What a client is told about an argument slot. Independent of how the server parses it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionType {
    Bool,
    Integer { min: i32, max: i32 },
    Float { min: f32, max: f32 },
    Double { min: f64, max: f64 },
    String(StringKind),
    Entity { single: bool, players_only: bool },
    Vec3,
    ColumnPos,
    BlockPos,
    ResourceLocation,
}

impl CompletionType {
    pub fn identifier(&self) -> &'static str {
        match self {
            CompletionType::Bool => "brigadier:bool",
            CompletionType::Integer { .. } => "brigadier:integer",
            CompletionType::Float { .. } => "brigadier:float",
            CompletionType::Double { .. } => "brigadier:double",
            CompletionType::String(_) => "brigadier:string",
            CompletionType::Entity { .. } => "minecraft:entity",
            CompletionType::Vec3 => "minecraft:vec3",
            CompletionType::ColumnPos => "minecraft:column_pos",
            CompletionType::BlockPos => "minecraft:block_pos",
            CompletionType::ResourceLocation => "minecraft:resource_location",
        }
    }

    pub fn is_plain_string(&self) -> bool {
        matches!(self, CompletionType::String(_))
    }

    /// How many tokens a client consumes for this slot; `None` means the rest of the line.
    pub fn token_width(&self) -> Option<usize> {
        match self {
            CompletionType::String(StringKind::Greedy) => None,
            CompletionType::Vec3 | CompletionType::BlockPos => Some(3),
            CompletionType::ColumnPos => Some(2),
            _ => Some(1),
        }
    }

    /// Loose client-side validation used when walking the suggestion tree.
    pub fn accepts(&self, tokens: &[&str]) -> bool {
        match self {
            CompletionType::Bool => tokens
                .iter()
                .all(|t| matches!(t.to_lowercase().as_str(), "true" | "false")),
            CompletionType::Integer { min, max } => tokens
                .iter()
                .all(|t| t.parse::<i32>().is_ok_and(|v| (*min..=*max).contains(&v))),
            CompletionType::Float { .. } => tokens.iter().all(|t| t.parse::<f32>().is_ok()),
            CompletionType::Double { .. } => tokens.iter().all(|t| t.parse::<f64>().is_ok()),
            CompletionType::String(_) | CompletionType::Entity { .. } => true,
            CompletionType::Vec3 | CompletionType::ColumnPos => {
                tokens.iter().all(|t| is_coordinate(t, |s| s.parse::<f64>().is_ok()))
            }
            CompletionType::BlockPos => {
                tokens.iter().all(|t| is_coordinate(t, |s| s.parse::<i32>().is_ok()))
            }
            CompletionType::ResourceLocation => tokens.iter().all(|t| is_resource_location(t)),
        }
    }
}

fn is_coordinate(token: &str, number: impl Fn(&str) -> bool) -> bool {
    match token.strip_prefix('~') {
        Some("") => true,
        Some(offset) => number(offset),
        None => number(token),
    }
}

/// Describes how a value is read from input and how its slot is advertised for completion.
///
/// A parser that reads no input must not declare any completion types.
pub trait ArgumentParser: Send + Sync {
    /// Reads one value. Returning `Ok(None)` means the parser produced no value (zero-width).
    fn parse(
        &self,
        reader: &mut StringReader<'_>,
        context: &ParseContext,
    ) -> Result<Option<crate::commands::value::Value>, SyntaxError>;

    /// Wire-level slots this argument occupies, in order.
    fn completion_types(&self) -> Vec<CompletionType>;

    fn reads_no_input(&self) -> bool {
        false
    }

    fn examples(&self) -> &[&'static str] {
        &[]
    }

    /// Suggestions the parser can offer on its own, before prefix filtering.
    fn list_suggestions(&self, _prefix: &str) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Clone)]
pub enum ArgumentType {
    Word,
    Phrase,
    GreedyString,
    Integer { min: i32, max: i32 },
    Float { min: f32, max: f32 },
    Double { min: f64, max: f64 },
    Boolean,
    Player,
    Vec3,
    ColumnPos,
    BlockPos,
    ResourceLocation,
    Location,
    Choice { options: Vec<String> },
    Marker,
    Custom(Arc<dyn ArgumentParser>),
}

impl ArgumentParser for ArgumentType {
    fn parse(
        &self,
        reader: &mut StringReader<'_>,
        context: &ParseContext,
    ) -> ArgumentParseResult {
        match self {
            ArgumentType::Word => parse_word(reader),
            ArgumentType::Phrase => parse_phrase(reader),
            ArgumentType::GreedyString => parse_greedy_string(reader),
            ArgumentType::Integer { min, max } => parse_integer(reader, *min, *max),
            ArgumentType::Float { min, max } => parse_float(reader, *min, *max),
            ArgumentType::Double { min, max } => parse_double(reader, *min, *max),
            ArgumentType::Boolean => parse_boolean(reader),
            ArgumentType::Player => parse_player(reader),
            ArgumentType::Vec3 => parse_vec3(reader),
            ArgumentType::ColumnPos => parse_column_pos(reader),
            ArgumentType::BlockPos => parse_block_pos(reader),
            ArgumentType::ResourceLocation => parse_resource_location(reader),
            ArgumentType::Location => parse_location(reader),
            ArgumentType::Choice { options } => parse_choice(reader, options),
            ArgumentType::Marker => Ok(None),
            ArgumentType::Custom(parser) => parser.parse(reader, context),
        }
    }

    fn completion_types(&self) -> Vec<CompletionType> {
        match self {
            ArgumentType::Word | ArgumentType::Choice { .. } => {
                vec![CompletionType::String(StringKind::Word)]
            }
            ArgumentType::Phrase => vec![CompletionType::String(StringKind::Phrase)],
            ArgumentType::GreedyString => vec![CompletionType::String(StringKind::Greedy)],
            ArgumentType::Integer { min, max } => vec![CompletionType::Integer {
                min: *min,
                max: *max,
            }],
            ArgumentType::Float { min, max } => vec![CompletionType::Float {
                min: *min,
                max: *max,
            }],
            ArgumentType::Double { min, max } => vec![CompletionType::Double {
                min: *min,
                max: *max,
            }],
            ArgumentType::Boolean => vec![CompletionType::Bool],
            ArgumentType::Player => vec![CompletionType::Entity {
                single: true,
                players_only: true,
            }],
            ArgumentType::Vec3 => vec![CompletionType::Vec3],
            ArgumentType::ColumnPos => vec![CompletionType::ColumnPos],
            ArgumentType::BlockPos => vec![CompletionType::BlockPos],
            ArgumentType::ResourceLocation => vec![CompletionType::ResourceLocation],
            ArgumentType::Location => vec![
                CompletionType::String(StringKind::Word),
                CompletionType::Vec3,
            ],
            ArgumentType::Marker => Vec::new(),
            ArgumentType::Custom(parser) => parser.completion_types(),
        }
    }

    fn reads_no_input(&self) -> bool {
        match self {
            ArgumentType::Marker => true,
            ArgumentType::Custom(parser) => parser.reads_no_input(),
            _ => false,
        }
    }

    fn examples(&self) -> &[&'static str] {
        match self {
            ArgumentType::Word => &["word", "words_with_underscores"],
            ArgumentType::Phrase => &["\"quoted phrase\"", "word", "\"\""],
            ArgumentType::GreedyString => &["word", "words with spaces", "\"and symbols\""],
            ArgumentType::Integer { .. } => &["0", "123", "-123"],
            ArgumentType::Float { .. } | ArgumentType::Double { .. } => {
                &["0", "1.2", ".5", "-1", "-.5", "-1234.56"]
            }
            ArgumentType::Boolean => &["true", "false"],
            ArgumentType::Player => &["Player", "@s", "@p", "@a"],
            ArgumentType::Vec3 => &["0 0 0", "~ ~ ~", "0.1 -0.5 .9", "~0.5 ~1 ~-5"],
            ArgumentType::ColumnPos => &["0 0", "~ ~", "~1 ~-2"],
            ArgumentType::BlockPos => &["0 0 0", "-1 64 10"],
            ArgumentType::ResourceLocation => &["foo", "foo:bar", "012"],
            ArgumentType::Location => &["world 0 64 0", "nether ~ ~ ~"],
            ArgumentType::Choice { .. } | ArgumentType::Marker => &[],
            ArgumentType::Custom(parser) => parser.examples(),
        }
    }

    fn list_suggestions(&self, prefix: &str) -> Vec<String> {
        match self {
            ArgumentType::Boolean => vec!["true".to_string(), "false".to_string()],
            ArgumentType::Choice { options } => options.clone(),
            ArgumentType::Player => {
                if prefix.starts_with('@') {
                    ["@s", "@p", "@a"].iter().map(|s| s.to_string()).collect()
                } else {
                    Vec::new()
                }
            }
            ArgumentType::Custom(parser) => parser.list_suggestions(prefix),
            _ => Vec::new(),
        }
    }
}

impl ArgumentType {
    pub fn word() -> Self {
        ArgumentType::Word
    }

    pub fn phrase() -> Self {
        ArgumentType::Phrase
    }

    pub fn greedy_string() -> Self {
        ArgumentType::GreedyString
    }

    pub fn integer(min: i32, max: i32) -> Self {
        ArgumentType::Integer { min, max }
    }

    pub fn float(min: f32, max: f32) -> Self {
        ArgumentType::Float { min, max }
    }

    pub fn double(min: f64, max: f64) -> Self {
        ArgumentType::Double { min, max }
    }

    pub fn any_double() -> Self {
        ArgumentType::Double {
            min: f64::MIN,
            max: f64::MAX,
        }
    }

    pub fn boolean() -> Self {
        ArgumentType::Boolean
    }

    pub fn player() -> Self {
        ArgumentType::Player
    }

    pub fn vec3() -> Self {
        ArgumentType::Vec3
    }

    pub fn column_pos() -> Self {
        ArgumentType::ColumnPos
    }

    pub fn block_pos() -> Self {
        ArgumentType::BlockPos
    }

    pub fn resource_location() -> Self {
        ArgumentType::ResourceLocation
    }

    pub fn location() -> Self {
        ArgumentType::Location
    }

    pub fn choice<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ArgumentType::Choice {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads nothing; used to hang metadata or a redirect on a tree position.
    pub fn marker() -> Self {
        ArgumentType::Marker
    }

    pub fn custom(parser: impl ArgumentParser + 'static) -> Self {
        ArgumentType::Custom(Arc::new(parser))
    }
}
