//! Token parsing against a [`Grammar`].
//!
//! Parsing is a single left-to-right pass over the tokens:
//!
//! 1. If a subcommand is named explicitly, or the first token names a
//!    subcommand with its own grammar, the whole parse is handed to that
//!    grammar. Parent options are not inherited.
//! 2. `--name`, `--name=value`, `-x`, `-x=value` and clustered `-xyz` tokens
//!    resolve to options. A value-taking option consumes the next token
//!    unconditionally, so values may start with `-`. A lone `--` ends option
//!    processing.
//! 3. Everything else is a positional value.
//!
//! After the scan, absent options resolve to their defaults (`false` for
//! flags). Unless `--help` was given, missing option values, required
//! arguments, the argument count, and choice constraints are then enforced.

use std::collections::BTreeMap;

use serde::Serialize;
use strsim::levenshtein;
use tracing::debug;

use crate::error::ParseError;
use crate::grammar::{Grammar, HELP_OPTION, QUIET_OPTION, VERBOSE_OPTION};
use crate::types::{OptionSpec, OptionValue};

/// Output level requested through the `verbose`/`quiet` built-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Resolved values of one successful parse.
///
/// # Examples
///
/// ```
/// use console_grammar_core::{ArgumentSpec, Grammar, OptionSpec, OptionValue};
///
/// let grammar = Grammar::builder("bake")
///     .option(OptionSpec::new("connection").with_short("c").with_default("default"))?
///     .option(OptionSpec::boolean("force").with_short("f"))?
///     .argument(ArgumentSpec::required("name"))
///     .build();
///
/// let result = grammar.parse(["-f", "Post", "--connection=test"])?;
/// assert_eq!(result.flag("force"), Some(true));
/// assert_eq!(result.value("connection"), Some("test"));
/// assert_eq!(result.arguments(), ["Post"]);
/// assert_eq!(result.get("help"), Some(&OptionValue::Bool(false)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    options: BTreeMap<String, OptionValue>,
    arguments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subcommand: Option<String>,
}

impl ParseResult {
    /// Every option with a value: explicit, defaulted, or `false` for flags.
    pub fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }

    /// Positional values in the order given.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Boolean state of a flag option.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(OptionValue::as_bool)
    }

    /// String value of a value-taking option.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    pub fn help_requested(&self) -> bool {
        self.flag(HELP_OPTION).unwrap_or(false)
    }

    /// Subcommand path the parse was delegated to, if any.
    pub fn subcommand(&self) -> Option<&str> {
        self.subcommand.as_deref()
    }

    /// `quiet` wins over `verbose` when both are set.
    pub fn verbosity(&self) -> Verbosity {
        if self.flag(QUIET_OPTION).unwrap_or(false) {
            Verbosity::Quiet
        } else if self.flag(VERBOSE_OPTION).unwrap_or(false) {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    pub fn into_parts(self) -> (BTreeMap<String, OptionValue>, Vec<String>) {
        (self.options, self.arguments)
    }
}

impl Grammar {
    /// Parses a token list.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered; see the module docs for
    /// the order of checks.
    pub fn parse<I>(&self, tokens: I) -> Result<ParseResult, ParseError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.parse_with_subcommand(tokens, None)
    }

    /// Parses a token list on behalf of an explicitly named subcommand.
    ///
    /// When `subcommand` names a subcommand with its own grammar, all tokens
    /// are parsed by that grammar. Unknown or help-only subcommands fall back
    /// to this grammar.
    pub fn parse_with_subcommand<I>(
        &self,
        tokens: I,
        subcommand: Option<&str>,
    ) -> Result<ParseResult, ParseError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect();

        if let Some(name) = subcommand {
            if let Some(result) = self.delegate(name, &tokens)? {
                return Ok(result);
            }
            debug!(command = %self.command, subcommand = name, "no nested grammar, parsing with parent");
        } else if let Some(first) = tokens.first() {
            if let Some(result) = self.delegate(first, &tokens[1..])? {
                return Ok(result);
            }
        }

        Scan::new(self).run(&tokens)
    }

    fn delegate(&self, name: &str, tokens: &[String]) -> Result<Option<ParseResult>, ParseError> {
        let Some(sub) = self.subcommand(name) else {
            return Ok(None);
        };
        let nested = sub.grammar().map_err(|source| ParseError::Grammar {
            command: self.command.clone(),
            source,
        })?;
        let Some(nested) = nested else {
            return Ok(None);
        };

        debug!(command = %self.command, subcommand = name, "delegating to subcommand grammar");
        let mut result = nested.parse(tokens)?;
        result.subcommand = Some(match result.subcommand.take() {
            Some(inner) => format!("{name} {inner}"),
            None => name.to_string(),
        });
        Ok(Some(result))
    }

    /// Closest long option name within edit distance 2.
    fn suggest_option(&self, name: &str) -> Option<String> {
        self.options
            .iter()
            .map(|o| (levenshtein(name, &o.name), &o.name))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| format!("--{candidate}"))
    }
}

/// Per-call parse state. Nothing here outlives one `parse` call.
struct Scan<'g> {
    grammar: &'g Grammar,
    explicit: BTreeMap<String, OptionValue>,
    positional: Vec<String>,
    /// First option left without a value; raised in `finish` unless help
    /// was requested.
    missing_value: Option<ParseError>,
}

impl<'g> Scan<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            explicit: BTreeMap::new(),
            positional: Vec::new(),
            missing_value: None,
        }
    }

    fn run(mut self, tokens: &[String]) -> Result<ParseResult, ParseError> {
        let mut rest = tokens.iter();
        while let Some(token) = rest.next() {
            if token == "--" {
                self.positional.extend(rest.by_ref().cloned());
                break;
            }
            if let Some(long) = token.strip_prefix("--") {
                self.long_option(long, &mut rest)?;
            } else if token.len() > 1 && token.starts_with('-') {
                self.short_options(token, &mut rest)?;
            } else {
                self.positional.push(token.clone());
            }
        }
        self.finish()
    }

    fn long_option<'t>(
        &mut self,
        body: &str,
        rest: &mut impl Iterator<Item = &'t String>,
    ) -> Result<(), ParseError> {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let grammar = self.grammar;
        let spec = grammar
            .option(name)
            .ok_or_else(|| ParseError::UnknownOption {
                command: grammar.command.clone(),
                token: format!("--{name}"),
                suggestion: grammar.suggest_option(name),
            })?;

        let value = match inline {
            Some(value) => Some(self.inline_value(spec, value)?),
            None => self.take_value(spec, rest),
        };
        if let Some(value) = value {
            self.explicit.insert(spec.name.clone(), value);
        }
        Ok(())
    }

    /// Handles `-x`, clustered `-xyz` and `-x=value`. A cluster is resolved
    /// as a whole before any option is set; only its last letter may take a
    /// value.
    fn short_options<'t>(
        &mut self,
        token: &str,
        rest: &mut impl Iterator<Item = &'t String>,
    ) -> Result<(), ParseError> {
        let grammar = self.grammar;
        let (letters, inline) = match token[1..].split_once('=') {
            Some((letters, value)) => (letters, Some(value)),
            None => (&token[1..], None),
        };
        if letters.is_empty() {
            return Err(ParseError::UnknownOption {
                command: grammar.command.clone(),
                token: token.to_string(),
                suggestion: None,
            });
        }

        let specs = letters
            .chars()
            .map(|letter| {
                grammar
                    .short_option(&letter.to_string())
                    .ok_or_else(|| ParseError::UnknownOption {
                        command: grammar.command.clone(),
                        token: format!("-{letter}"),
                        suggestion: None,
                    })
            })
            .collect::<Result<Vec<&OptionSpec>, _>>()?;

        if specs.len() > 1 {
            debug!(command = %grammar.command, cluster = letters, "expanding short option cluster");
        }
        let last = specs.len() - 1;
        for (i, spec) in specs.into_iter().enumerate() {
            let value = match inline {
                Some(value) if i == last => Some(self.inline_value(spec, value)?),
                _ if spec.boolean => Some(OptionValue::Bool(true)),
                None if i == last => self.take_value(spec, rest),
                _ => {
                    self.record_missing(spec);
                    None
                }
            };
            if let Some(value) = value {
                self.explicit.insert(spec.name.clone(), value);
            }
        }
        Ok(())
    }

    /// Value given as `--name=value` or `-x=value`.
    fn inline_value(&self, spec: &OptionSpec, value: &str) -> Result<OptionValue, ParseError> {
        if spec.boolean {
            return Err(ParseError::UnexpectedValue {
                command: self.grammar.command.clone(),
                option: spec.name.clone(),
            });
        }
        Ok(OptionValue::Str(value.to_string()))
    }

    /// Value of a non-inline option occurrence. The next token is taken as-is,
    /// even when it looks like an option. `None` leaves the option unset.
    fn take_value<'t>(
        &mut self,
        spec: &OptionSpec,
        rest: &mut impl Iterator<Item = &'t String>,
    ) -> Option<OptionValue> {
        if spec.boolean {
            return Some(OptionValue::Bool(true));
        }
        match rest.next() {
            Some(value) => Some(OptionValue::Str(value.clone())),
            None if spec.default.is_some() => spec.default.clone(),
            None => {
                self.record_missing(spec);
                None
            }
        }
    }

    fn record_missing(&mut self, spec: &OptionSpec) {
        if self.missing_value.is_none() {
            self.missing_value = Some(ParseError::MissingOptionValue {
                command: self.grammar.command.clone(),
                option: spec.name.clone(),
            });
        }
    }

    fn finish(mut self) -> Result<ParseResult, ParseError> {
        let grammar = self.grammar;
        let help = self.explicit.get(HELP_OPTION) == Some(&OptionValue::Bool(true));

        if help {
            debug!(command = %grammar.command, "help requested, skipping value and argument checks");
        } else {
            if let Some(err) = self.missing_value.take() {
                return Err(err);
            }
            self.check_option_choices()?;
            self.check_arguments()?;
        }

        let mut options = self.explicit;
        for spec in &grammar.options {
            if !options.contains_key(&spec.name) {
                if let Some(default) = spec.resolved_default() {
                    options.insert(spec.name.clone(), default);
                }
            }
        }

        Ok(ParseResult {
            options,
            arguments: self.positional,
            subcommand: None,
        })
    }

    fn check_option_choices(&self) -> Result<(), ParseError> {
        for spec in &self.grammar.options {
            let Some(OptionValue::Str(value)) = self.explicit.get(&spec.name) else {
                continue;
            };
            if !spec.accepts(value) {
                return Err(ParseError::InvalidChoice {
                    command: self.grammar.command.clone(),
                    target: format!("option `--{}`", spec.name),
                    value: value.clone(),
                    choices: spec.choices.clone(),
                });
            }
        }
        Ok(())
    }

    /// A grammar without declared arguments accepts any positional values.
    fn check_arguments(&self) -> Result<(), ParseError> {
        let declared = &self.grammar.arguments;
        if declared.is_empty() {
            return Ok(());
        }
        if let Some(extra) = self.positional.get(declared.len()) {
            return Err(ParseError::TooManyArguments {
                command: self.grammar.command.clone(),
                value: extra.clone(),
            });
        }
        for (index, spec) in declared.iter().enumerate() {
            match self.positional.get(index) {
                Some(value) if !spec.accepts(value) => {
                    return Err(ParseError::InvalidChoice {
                        command: self.grammar.command.clone(),
                        target: format!("argument `{}`", spec.name),
                        value: value.clone(),
                        choices: spec.choices.clone(),
                    });
                }
                Some(_) => {}
                None if spec.required => {
                    return Err(ParseError::MissingArgument {
                        command: self.grammar.command.clone(),
                        argument: spec.name.clone(),
                    });
                }
                None => {}
            }
        }
        Ok(())
    }
}
