use super::node::NodeId;
use std::fmt;
use thiserror::Error;

/// How much of the input before the caret is shown in a rendered syntax error.
const CONTEXT_AMOUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("Expected integer")]
    ExpectedInt,
    #[error("Invalid integer '{0}'")]
    InvalidInt(String),
    #[error("Expected float")]
    ExpectedFloat,
    #[error("Invalid float '{0}'")]
    InvalidFloat(String),
    #[error("Expected double")]
    ExpectedDouble,
    #[error("Invalid double '{0}'")]
    InvalidDouble(String),
    #[error("Expected bool")]
    ExpectedBool,
    #[error("Invalid bool, expected true or false but found '{0}'")]
    InvalidBool(String),
    #[error("{kind} must not be less than {min}, found {found}")]
    TooLow {
        kind: &'static str,
        min: String,
        found: String,
    },
    #[error("{kind} must not be more than {max}, found {found}")]
    TooHigh {
        kind: &'static str,
        max: String,
        found: String,
    },
    #[error("Expected a word")]
    ExpectedWord,
    #[error("Expected quote to start a string")]
    ExpectedStartOfQuote,
    #[error("Unclosed quoted string")]
    ExpectedEndOfQuote,
    #[error("Invalid escape sequence '\\{0}' in quoted string")]
    InvalidEscape(char),
    #[error("Incomplete (expected {0} coordinates)")]
    IncompleteCoordinates(usize),
    #[error("Expected whitespace to end one argument, but found trailing data")]
    ExpectedSeparator,
    #[error("Expected literal {0}")]
    ExpectedLiteral(String),
    #[error("Unknown command")]
    UnknownCommand,
    #[error("Incorrect argument for command")]
    UnknownArgument,
    #[error("Unknown or incomplete command")]
    IncompleteCommand,
    #[error("{0}")]
    Invalid(String),
}

/// A malformed token: what went wrong, where, and what would have been accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    input: String,
    cursor: usize,
    examples: Vec<String>,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, input: &str, cursor: usize) -> Self {
        Self {
            kind,
            input: input.to_string(),
            cursor: cursor.min(input.len()),
            examples: Vec::new(),
        }
    }

    pub fn with_examples(mut self, examples: &[&str]) -> Self {
        if self.examples.is_empty() {
            self.examples = examples.iter().map(|e| e.to_string()).collect();
        }
        self
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// The input up to the caret, e.g. `...tp Steve x<--[HERE]`.
    pub fn context(&self) -> String {
        let mut start = self.cursor.saturating_sub(CONTEXT_AMOUNT);
        while !self.input.is_char_boundary(start) {
            start -= 1;
        }
        let prefix = if start > 0 { "..." } else { "" };
        format!("{}{}<--[HERE]", prefix, &self.input[start..self.cursor])
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}: {}", self.kind, self.cursor, self.context())
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Permission denied: {permission}")]
    PermissionDenied { permission: String },
    #[error("You do not have permission to use this command")]
    InsufficientPermission,
    #[error("No player was found")]
    NoPlayerFound,
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error(
        "Internal error: Argument '{name}' not found in ArgumentSet (command registration bug)"
    )]
    MissingArgument { name: String },
    #[error("Internal error: Argument '{name}' has wrong type, expected {expected} (command registration bug)")]
    WrongArgumentType { name: String, expected: String },
    #[error("Internal error (bug): {message}")]
    Message { message: String },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl CommandError {
    pub fn runtime(message: impl Into<String>) -> Self {
        CommandError::Runtime(RuntimeError::Message(message.into()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CommandError::Internal(InternalError::Message {
            message: message.into(),
        })
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Invalid tree shapes, reported synchronously to whoever is registering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("A child named '{name}' is already registered under '{parent}'")]
    DuplicateNode { parent: String, name: String },
    #[error("Node '{name}' cannot both redirect and have children")]
    RedirectWithChildren { name: String },
    #[error("Cannot force a redirect on '{name}': it already has children")]
    InvalidShape { name: String },
    #[error("Node '{name}' is already attached to a parent")]
    AlreadyAttached { name: String },
    #[error("The root node cannot be attached as a child")]
    RootAsChild,
    #[error("Unknown node handle {0:?}")]
    UnknownNode(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_truncated_before_caret() {
        let err = SyntaxError::new(SyntaxErrorKind::UnknownArgument, "teleport Steve nowhere", 15);
        assert_eq!(err.context(), "...ort Steve <--[HERE]");
        assert_eq!(
            err.to_string(),
            "Incorrect argument for command at position 15: ...ort Steve <--[HERE]"
        );
    }

    #[test]
    fn short_input_has_no_ellipsis() {
        let err = SyntaxError::new(SyntaxErrorKind::UnknownCommand, "foo", 0);
        assert_eq!(err.context(), "<--[HERE]");
    }

    #[test]
    fn examples_are_set_once() {
        let err = SyntaxError::new(SyntaxErrorKind::ExpectedInt, "x", 0)
            .with_examples(&["0", "123"])
            .with_examples(&["ignored"]);
        assert_eq!(err.examples(), &["0".to_string(), "123".to_string()]);
    }
}
