//! Help rendering for grammars.
//!
//! Two outputs are produced from the same [`Grammar`]: word-wrapped text
//! ([`render_text`]) and an XML description ([`render_xml`] /
//! [`xml_document`]). Rendering is a pure function of the grammar and the
//! [`HelpConfig`]; nothing is written anywhere.
//!
//! Passing a subcommand name renders that subcommand's own grammar, with a
//! usage line prefixed by the parent command. Subcommands without a grammar
//! (and unknown names) render the parent's help.
//!
//! # Example
//!
//! ```
//! use console_grammar_core::help::{HelpConfig, render_text};
//! use console_grammar_core::{ArgumentSpec, Grammar, OptionSpec};
//!
//! let grammar = Grammar::builder("bake")
//!     .without_default_options()
//!     .option(OptionSpec::boolean("force").with_short("f").with_help("Overwrite files"))?
//!     .argument(ArgumentSpec::required("name").with_help("Name to bake"))
//!     .build();
//!
//! let text = render_text(&grammar, None, &HelpConfig::default())?;
//! assert!(text.contains("Usage:\nbake [-h] [-f] <name>"));
//! assert!(text.contains("--force, -f  Overwrite files"));
//! # Ok::<(), console_grammar_core::GrammarError>(())
//! ```

mod text;
mod wrap;
mod xml;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, LoadError};
use crate::grammar::Grammar;

pub use wrap::wrap;
pub use xml::XmlElement;

/// Default wrapping width for text help.
pub const DEFAULT_WIDTH: usize = 72;
/// Usage lines list at most this many options or arguments individually.
pub const DEFAULT_MAX_USAGE_ENTRIES: usize = 6;

/// Help output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum HelpFormat {
    #[default]
    Text,
    Xml,
}

/// Layout settings for text help.
///
/// Loadable from YAML or JSON; missing keys take their defaults.
///
/// ```yaml
/// width: 80
/// program: cake
/// max_options: 6
/// max_arguments: 6
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    /// Column at which text is wrapped.
    pub width: usize,
    /// Token printed before the command name in usage lines.
    pub program: Option<String>,
    /// More options than this collapse to `[options]` in the usage line.
    pub max_options: usize,
    /// More arguments than this collapse to `[arguments]` in the usage line.
    pub max_arguments: usize,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            program: None,
            max_options: DEFAULT_MAX_USAGE_ENTRIES,
            max_arguments: DEFAULT_MAX_USAGE_ENTRIES,
        }
    }
}

impl HelpConfig {
    /// Loads settings from a file. `.yaml`/`.yml` is read as YAML, anything
    /// else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read, or a format
    /// error if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)?,
            _ => serde_json::from_str(&raw)?,
        };
        Ok(config)
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }
}

/// Renders help in the requested format. XML output is serialized with its
/// declaration.
///
/// # Errors
///
/// Returns a [`GrammarError`] if the selected subcommand's deferred grammar
/// cannot be built.
pub fn render(
    grammar: &Grammar,
    subcommand: Option<&str>,
    format: HelpFormat,
    config: &HelpConfig,
) -> Result<String, GrammarError> {
    match format {
        HelpFormat::Text => render_text(grammar, subcommand, config),
        HelpFormat::Xml => render_xml(grammar, subcommand),
    }
}

/// Renders word-wrapped text help.
pub fn render_text(
    grammar: &Grammar,
    subcommand: Option<&str>,
    config: &HelpConfig,
) -> Result<String, GrammarError> {
    with_target(grammar, subcommand, |target, path| {
        text::render(target, path, config)
    })
}

/// Renders XML help as a string with an XML declaration.
pub fn render_xml(grammar: &Grammar, subcommand: Option<&str>) -> Result<String, GrammarError> {
    Ok(xml_document(grammar, subcommand)?.to_xml_string())
}

/// Builds the XML help document as an element tree.
pub fn xml_document(
    grammar: &Grammar,
    subcommand: Option<&str>,
) -> Result<XmlElement, GrammarError> {
    with_target(grammar, subcommand, xml::document)
}

/// Runs `f` against the grammar help should describe, together with the
/// command path shown for it.
fn with_target<T>(
    grammar: &Grammar,
    subcommand: Option<&str>,
    f: impl FnOnce(&Grammar, &str) -> T,
) -> Result<T, GrammarError> {
    if let Some(name) = subcommand {
        if let Some(nested) = grammar.subcommand_grammar(name)? {
            let path = format!("{} {}", grammar.command(), nested.command());
            return Ok(f(nested.as_ref(), &path));
        }
    }
    Ok(f(grammar, grammar.command()))
}

impl Grammar {
    /// Text help with default layout settings.
    pub fn help_text(&self) -> String {
        text::render(self, self.command(), &HelpConfig::default())
    }

    /// XML help serialized with its declaration.
    pub fn help_xml(&self) -> String {
        xml::document(self, self.command()).to_xml_string()
    }
}
