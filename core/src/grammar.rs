//! The [`Grammar`] aggregate and its builder.
//!
//! A grammar is assembled once through [`GrammarBuilder`] (or converted from
//! a declarative structure, see [`Grammar::from_structured`]) and is read-only
//! afterwards. Parsing and help rendering only borrow it, so a built grammar
//! can be shared freely, including across threads.

use std::sync::Arc;

use heck::ToSnakeCase;
use tracing::debug;

use crate::error::{GrammarError, Result};
use crate::types::{ArgumentSpec, OptionSpec, SubcommandSpec};

/// Name of the always-present help flag.
pub const HELP_OPTION: &str = "help";
/// Name of the built-in verbose output flag.
pub const VERBOSE_OPTION: &str = "verbose";
/// Name of the built-in quiet output flag.
pub const QUIET_OPTION: &str = "quiet";

/// Converts a capitalized identifier into a command token.
///
/// # Examples
///
/// ```
/// use console_grammar_core::inflect_command_name;
///
/// assert_eq!(inflect_command_name("CommandLine"), "command_line");
/// assert_eq!(inflect_command_name("Bake"), "bake");
/// assert_eq!(inflect_command_name("schema"), "schema");
/// ```
pub fn inflect_command_name(identifier: &str) -> String {
    identifier.to_snake_case()
}

/// Complete description of one command's options, arguments, and
/// subcommands.
///
/// # Examples
///
/// ```
/// use console_grammar_core::{ArgumentSpec, Grammar, OptionSpec, SubcommandSpec};
///
/// let grammar = Grammar::builder("bake")
///     .description("Bake application code")
///     .option(OptionSpec::new("connection").with_short("c").with_default("default"))?
///     .option(OptionSpec::boolean("force").with_short("f"))?
///     .argument(ArgumentSpec::required("name"))
///     .subcommand(SubcommandSpec::new("model").with_help("Bake a model"))
///     .build();
///
/// assert_eq!(grammar.command(), "bake");
/// // help, verbose and quiet are always added first
/// assert_eq!(grammar.options().len(), 5);
/// assert_eq!(grammar.options()[0].name, "help");
/// assert_eq!(grammar.arguments().len(), 1);
/// assert!(grammar.subcommand("model").is_some());
/// # Ok::<(), console_grammar_core::GrammarError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) command: String,
    pub(crate) description: Option<String>,
    pub(crate) epilog: Option<String>,
    pub(crate) options: Vec<OptionSpec>,
    pub(crate) arguments: Vec<ArgumentSpec>,
    pub(crate) subcommands: Vec<SubcommandSpec>,
    pub(crate) default_options: bool,
}

impl Grammar {
    /// Starts a builder for a command with an explicit name.
    pub fn builder(command: impl Into<String>) -> GrammarBuilder {
        GrammarBuilder::new(command)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn epilog(&self) -> Option<&str> {
        self.epilog.as_deref()
    }

    /// Options in declaration order, built-ins first.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Arguments in positional order.
    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn subcommands(&self) -> &[SubcommandSpec] {
        &self.subcommands
    }

    /// Whether the `verbose`/`quiet` built-ins were added.
    pub fn has_default_options(&self) -> bool {
        self.default_options
    }

    /// Finds an option by long name.
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Finds an option by short alias (without the leading dash).
    pub fn short_option(&self, short: &str) -> Option<&OptionSpec> {
        self.options
            .iter()
            .find(|o| o.short.as_deref() == Some(short))
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn subcommand(&self, name: &str) -> Option<&SubcommandSpec> {
        self.subcommands.iter().find(|s| s.name == name)
    }

    /// Whether `name` is one of the options every builder adds.
    pub(crate) fn is_builtin(&self, name: &str) -> bool {
        name == HELP_OPTION
            || (self.default_options && (name == VERBOSE_OPTION || name == QUIET_OPTION))
    }

    /// Returns the nested grammar of a subcommand, if it has one.
    ///
    /// # Errors
    ///
    /// Propagates failures from building a deferred subcommand structure.
    pub fn subcommand_grammar(&self, name: &str) -> Result<Option<Arc<Grammar>>> {
        match self.subcommand(name) {
            Some(sub) => sub.grammar(),
            None => Ok(None),
        }
    }
}

/// Fluent builder for [`Grammar`].
///
/// The built-in `help` option is always present. `verbose` and `quiet` are
/// added unless [`without_default_options`](GrammarBuilder::without_default_options)
/// is called before any user option that would collide with them.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        let mut grammar = Grammar {
            command: command.into(),
            description: None,
            epilog: None,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
            default_options: true,
        };
        grammar.options.push(
            OptionSpec::boolean(HELP_OPTION)
                .with_short("h")
                .with_help("Display this help."),
        );
        grammar.options.push(
            OptionSpec::boolean(VERBOSE_OPTION)
                .with_short("v")
                .with_help("Enable verbose output."),
        );
        grammar.options.push(
            OptionSpec::boolean(QUIET_OPTION)
                .with_short("q")
                .with_help("Enable quiet output."),
        );
        Self { grammar }
    }

    /// Starts a builder whose command name is inflected from a capitalized
    /// identifier (`CommandLine` becomes `command_line`).
    pub fn from_identifier(identifier: &str) -> Self {
        Self::new(inflect_command_name(identifier))
    }

    /// Drops the `verbose`/`quiet` built-ins. Has no effect once they are
    /// already gone, so user options of the same names survive.
    pub fn without_default_options(mut self) -> Self {
        if self.grammar.default_options {
            self.grammar
                .options
                .retain(|o| o.name != VERBOSE_OPTION && o.name != QUIET_OPTION);
            self.grammar.default_options = false;
        }
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.grammar.command = command.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.grammar.description = Some(description.into());
        self
    }

    /// Sets the description from a list of lines joined by newlines.
    pub fn description_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = join_lines(lines);
        self.description(joined)
    }

    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.grammar.epilog = Some(epilog.into());
        self
    }

    /// Sets the epilog from a list of lines joined by newlines.
    pub fn epilog_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = join_lines(lines);
        self.epilog(joined)
    }

    /// Adds an option.
    ///
    /// # Errors
    ///
    /// - [`GrammarError::EmptyName`] for a blank name.
    /// - [`GrammarError::InvalidShortOption`] if the short alias is not
    ///   exactly one character.
    /// - [`GrammarError::DuplicateOption`] / [`GrammarError::DuplicateShortOption`]
    ///   on collisions with an option already in the grammar.
    /// - [`GrammarError::DefaultNotInChoices`] if a string default falls
    ///   outside the declared choices.
    pub fn option(mut self, spec: OptionSpec) -> Result<Self> {
        validate_option(&self.grammar.options, &spec)?;
        self.grammar.options.push(spec);
        Ok(self)
    }

    /// Removes an option by long name. Unknown names are ignored.
    pub fn remove_option(mut self, name: &str) -> Self {
        self.grammar.options.retain(|o| o.name != name);
        self
    }

    /// Appends an argument, or replaces the argument already registered
    /// under the same name in place.
    pub fn argument(mut self, spec: ArgumentSpec) -> Self {
        match self.grammar.arguments.iter().position(|a| a.name == spec.name) {
            Some(index) => self.grammar.arguments[index] = spec,
            None => self.grammar.arguments.push(spec),
        }
        self
    }

    /// Places an argument at an explicit position.
    ///
    /// An argument already at `index` is replaced; an index past the end
    /// appends. An argument with the same name at another position is
    /// removed first, so names stay unique.
    pub fn argument_at(mut self, index: usize, spec: ArgumentSpec) -> Self {
        if let Some(previous) = self
            .grammar
            .arguments
            .iter()
            .position(|a| a.name == spec.name)
            .filter(|&previous| previous != index)
        {
            self.grammar.arguments.remove(previous);
        }
        if index < self.grammar.arguments.len() {
            debug!(
                command = %self.grammar.command,
                index,
                replaced = %self.grammar.arguments[index].name,
                "argument position overwritten"
            );
            self.grammar.arguments[index] = spec;
        } else {
            self.grammar.arguments.push(spec);
        }
        self
    }

    /// Adds a subcommand, replacing one with the same name.
    pub fn subcommand(mut self, spec: SubcommandSpec) -> Self {
        match self
            .grammar
            .subcommands
            .iter()
            .position(|s| s.name == spec.name)
        {
            Some(index) => self.grammar.subcommands[index] = spec,
            None => self.grammar.subcommands.push(spec),
        }
        self
    }

    pub fn remove_subcommand(mut self, name: &str) -> Self {
        self.grammar.subcommands.retain(|s| s.name != name);
        self
    }

    /// Finishes the grammar. All validation happened as pieces were added.
    pub fn build(self) -> Grammar {
        self.grammar
    }
}

fn validate_option(existing: &[OptionSpec], spec: &OptionSpec) -> Result<()> {
    if spec.name.trim().is_empty() {
        return Err(GrammarError::EmptyName { kind: "option" });
    }
    if existing.iter().any(|o| o.name == spec.name) {
        return Err(GrammarError::DuplicateOption(spec.name.clone()));
    }
    if let Some(short) = &spec.short {
        if short.chars().count() != 1 || short == "-" {
            return Err(GrammarError::InvalidShortOption {
                option: spec.name.clone(),
                short: short.clone(),
            });
        }
        if let Some(other) = existing.iter().find(|o| o.short.as_deref() == Some(short)) {
            return Err(GrammarError::DuplicateShortOption {
                option: spec.name.clone(),
                short: short.clone(),
                existing: other.name.clone(),
            });
        }
    }
    if let Some(default) = spec.default.as_ref().and_then(|d| d.as_str()) {
        if !spec.accepts(default) {
            return Err(GrammarError::DefaultNotInChoices {
                option: spec.name.clone(),
                default: default.to_string(),
            });
        }
    }
    Ok(())
}

fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|l| l.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
