//! Value objects describing the pieces of a console grammar.
//!
//! A [`Grammar`](crate::Grammar) is assembled from three kinds of
//! descriptions:
//!
//! - [`OptionSpec`]: a named flag (`--name`, optional `-n` alias).
//! - [`ArgumentSpec`]: a positional slot, matched strictly by position.
//! - [`SubcommandSpec`]: a named nested grammar with its own help text.
//!
//! Resolved option values are carried as [`OptionValue`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::GrammarError;
use crate::grammar::Grammar;

/// A resolved or default option value.
///
/// Options hold at most one value per parse: either a boolean (flags) or a
/// raw string (everything else). Options that resolve to nothing are absent
/// from the result map rather than carrying a null variant.
///
/// # Examples
///
/// ```
/// use console_grammar_core::OptionValue;
///
/// let flag = OptionValue::from(true);
/// assert_eq!(flag.as_bool(), Some(true));
///
/// let value = OptionValue::from("json");
/// assert_eq!(value.as_str(), Some("json"));
/// assert_eq!(value.to_string(), "json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean flag state.
    Bool(bool),
    /// Raw string value as supplied on the command line.
    Str(String),
}

impl OptionValue {
    /// Returns the boolean state, if this is a flag value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(_) => None,
        }
    }

    /// Returns the string value, if this is not a flag value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Bool(_) => None,
            Self::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Description of one named option.
///
/// Use [`OptionSpec::new`] for value-taking options and
/// [`OptionSpec::boolean`] for flags, then chain the `with_*` methods.
///
/// # Examples
///
/// ```
/// use console_grammar_core::OptionSpec;
///
/// let format = OptionSpec::new("format")
///     .with_short("f")
///     .with_help("Output format")
///     .with_default("text")
///     .with_choices(["text", "xml"]);
/// assert!(!format.boolean);
/// assert!(format.accepts("xml"));
/// assert!(!format.accepts("yaml"));
///
/// let force = OptionSpec::boolean("force");
/// assert!(force.boolean);
/// assert!(force.accepts("anything"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Long name, without the leading `--`.
    pub name: String,
    /// Single-character alias, without the leading `-`.
    pub short: Option<String>,
    /// Help text shown in the options table.
    pub help: String,
    /// Flags never consume a following token.
    pub boolean: bool,
    /// Value used when the option is not given.
    pub default: Option<OptionValue>,
    /// Allowed raw values; empty means unconstrained.
    pub choices: Vec<String>,
}

impl OptionSpec {
    /// Creates an option that takes a value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            help: String::new(),
            boolean: false,
            default: None,
            choices: Vec::new(),
        }
    }

    /// Creates a boolean flag.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            boolean: true,
            ..Self::new(name)
        }
    }

    /// Sets the short alias. Validated when the option is added to a grammar.
    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<OptionValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the option as a boolean flag.
    pub fn as_boolean(mut self) -> Self {
        self.boolean = true;
        self
    }

    /// Checks a raw value against the choice constraint.
    pub fn accepts(&self, value: &str) -> bool {
        self.choices.is_empty() || self.choices.iter().any(|c| c == value)
    }

    /// Value resolved when the option is absent from the token list.
    pub(crate) fn resolved_default(&self) -> Option<OptionValue> {
        match (&self.default, self.boolean) {
            (Some(default), _) => Some(default.clone()),
            (None, true) => Some(OptionValue::Bool(false)),
            (None, false) => None,
        }
    }
}

/// Description of one positional argument.
///
/// # Examples
///
/// ```
/// use console_grammar_core::ArgumentSpec;
///
/// let model = ArgumentSpec::required("model").with_help("Model to bake");
/// assert!(model.required);
///
/// let kind = ArgumentSpec::optional("kind").with_choices(["all", "model"]);
/// assert!(!kind.required);
/// assert!(kind.accepts("all"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub help: String,
    pub required: bool,
    /// Allowed raw values; empty means unconstrained.
    pub choices: Vec<String>,
}

impl ArgumentSpec {
    /// Creates an optional positional argument.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            required: false,
            choices: Vec::new(),
        }
    }

    /// Creates a required positional argument.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::optional(name)
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.choices.is_empty() || self.choices.iter().any(|c| c == value)
    }
}

/// Where a subcommand's nested grammar comes from.
#[derive(Debug, Clone)]
pub(crate) enum NestedGrammar {
    Built(Arc<Grammar>),
    /// Declarative structure, converted on first access.
    Deferred {
        spec: serde_json::Value,
        built: OnceLock<Result<Arc<Grammar>, GrammarError>>,
    },
}

/// Description of one subcommand.
///
/// A subcommand may carry its own grammar, supplied already built or as a
/// declarative structure that is converted the first time it is needed.
/// Subcommands without a grammar are listed in help output only.
///
/// # Examples
///
/// ```
/// use console_grammar_core::{Grammar, OptionSpec, SubcommandSpec};
///
/// let nested = Grammar::builder("sub")
///     .option(OptionSpec::boolean("secondary")).unwrap()
///     .build();
/// let sub = SubcommandSpec::new("sub")
///     .with_help("Runs the sub task")
///     .with_grammar(nested);
///
/// let grammar = sub.grammar().unwrap().unwrap();
/// assert!(grammar.option("secondary").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct SubcommandSpec {
    pub name: String,
    pub help: String,
    pub(crate) nested: Option<NestedGrammar>,
}

impl SubcommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            nested: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Attaches an already-built nested grammar.
    pub fn with_grammar(mut self, grammar: impl Into<Arc<Grammar>>) -> Self {
        self.nested = Some(NestedGrammar::Built(grammar.into()));
        self
    }

    /// Attaches a declarative structure, built into a grammar on first access.
    ///
    /// A structure without a `command` key takes the subcommand's name.
    pub fn with_structure(mut self, spec: serde_json::Value) -> Self {
        self.nested = Some(NestedGrammar::Deferred {
            spec,
            built: OnceLock::new(),
        });
        self
    }

    /// Returns `true` when the subcommand carries its own grammar.
    pub fn has_grammar(&self) -> bool {
        self.nested.is_some()
    }

    /// Returns the nested grammar, building a deferred structure if needed.
    ///
    /// `Ok(None)` means the subcommand is help-only.
    ///
    /// # Errors
    ///
    /// Returns the [`GrammarError`] raised while converting a deferred
    /// structure. The outcome is cached, so later calls return the same error.
    pub fn grammar(&self) -> Result<Option<Arc<Grammar>>, GrammarError> {
        match &self.nested {
            None => Ok(None),
            Some(NestedGrammar::Built(grammar)) => Ok(Some(Arc::clone(grammar))),
            Some(NestedGrammar::Deferred { spec, built }) => built
                .get_or_init(|| {
                    Grammar::from_structured_with_name(spec, &self.name).map(Arc::new)
                })
                .clone()
                .map(Some),
        }
    }
}

impl PartialEq for SubcommandSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.help == other.help
    }
}
