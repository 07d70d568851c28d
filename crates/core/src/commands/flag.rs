/// A named switch such as `--quiet` / `-q`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagDefinition {
    pub(super) long: String,
    pub(super) short: Option<char>,
    pub(super) description: Option<String>,
    pub(super) default_on: bool,
}

impl FlagDefinition {
    pub fn new(long: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: None,
            description: None,
            default_on: false,
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Record the flag as defaulted when a command offering it runs without it.
    pub fn default_on(mut self) -> Self {
        self.default_on = true;
        self
    }

    pub fn long_name(&self) -> &str {
        &self.long
    }

    pub fn literal(&self) -> String {
        format!("--{}", self.long)
    }

    pub fn short_literal(&self) -> Option<String> {
        self.short.map(|c| format!("-{}", c))
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSource {
    Explicit,
    Defaulted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagInvocation {
    pub flag: String,
    pub source: FlagSource,
}
