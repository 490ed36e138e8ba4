//! Error types for grammar construction, parsing, and loading.
//!
//! Build-time problems are [`GrammarError`]s and must be fixed by the author
//! of the grammar. Invocation problems are [`ParseError`]s, raised at the
//! first offending token and never retried. [`LoadError`] covers reading a
//! grammar description from disk.

use thiserror::Error;

/// Structurally invalid grammar definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Option or argument name is empty or whitespace-only.
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },
    /// Short alias is not exactly one character.
    #[error("short option `{short}` for `--{option}` must be exactly one character")]
    InvalidShortOption { option: String, short: String },
    /// Two options share a long name.
    #[error("option `--{0}` is already defined")]
    DuplicateOption(String),
    /// Two options share a short alias.
    #[error("short option `-{short}` of `--{option}` is already used by `--{existing}`")]
    DuplicateShortOption {
        option: String,
        short: String,
        existing: String,
    },
    /// A default value is not one of the option's choices.
    #[error("default `{default}` of `--{option}` is not one of its choices")]
    DefaultNotInChoices { option: String, default: String },
    /// A structured description has the wrong shape.
    #[error("invalid grammar structure at `{path}`: {message}")]
    InvalidStructure { path: String, message: String },
}

/// Invalid command-line invocations.
///
/// Every variant carries the name of the command whose grammar rejected the
/// tokens so the caller can render a one-line diagnostic next to the help.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An option token that matches no declared long name or short alias.
    #[error("{command}: unknown option `{token}`{}", suggestion_suffix(.suggestion))]
    UnknownOption {
        command: String,
        token: String,
        suggestion: Option<String>,
    },
    /// Fewer positional values than required arguments.
    #[error("{command}: missing required argument `{argument}`")]
    MissingArgument { command: String, argument: String },
    /// More positional values than declared arguments.
    #[error("{command}: too many arguments, unexpected `{value}`")]
    TooManyArguments { command: String, value: String },
    /// A value outside the declared choices.
    #[error("{command}: `{value}` is not a valid value for {target}, choose one of: {}", .choices.join(", "))]
    InvalidChoice {
        command: String,
        target: String,
        value: String,
        choices: Vec<String>,
    },
    /// A value-taking option appeared last with no value and no default.
    #[error("{command}: option `--{option}` requires a value")]
    MissingOptionValue { command: String, option: String },
    /// An inline `=value` was given to a boolean option.
    #[error("{command}: option `--{option}` is a flag and does not take a value")]
    UnexpectedValue { command: String, option: String },
    /// A subcommand's deferred grammar could not be built.
    #[error("{command}: {source}")]
    Grammar {
        command: String,
        #[source]
        source: GrammarError,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(", did you mean `{s}`?"))
        .unwrap_or_default()
}

impl ParseError {
    /// Name of the command whose grammar produced the error.
    pub fn command(&self) -> &str {
        match self {
            Self::UnknownOption { command, .. }
            | Self::MissingArgument { command, .. }
            | Self::TooManyArguments { command, .. }
            | Self::InvalidChoice { command, .. }
            | Self::MissingOptionValue { command, .. }
            | Self::UnexpectedValue { command, .. }
            | Self::Grammar { command, .. } => command,
        }
    }
}

/// Errors raised while loading a grammar description file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// Convenience alias for build-time results.
pub type Result<T> = std::result::Result<T, GrammarError>;
