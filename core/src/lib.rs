//! Console command grammars: declaration, parsing, and help rendering.
//!
//! A [`Grammar`] describes what a console command accepts:
//!
//! - [`OptionSpec`]: a named option (`--name`, optionally `-n`), either a
//!   boolean flag or a value-taking option with a default and choices.
//! - [`ArgumentSpec`]: a positional argument, required or optional, with
//!   optional choices.
//! - [`SubcommandSpec`]: a named subcommand, optionally carrying its own
//!   grammar that takes over parsing when the subcommand is selected.
//!
//! Grammars are assembled with a [`GrammarBuilder`] or loaded from a
//! structured description ([`Grammar::from_structured`], YAML or JSON files
//! via [`Grammar::load`]). Every builder adds the `help` option, and unless
//! told otherwise the `verbose` and `quiet` options.
//!
//! [`Grammar::parse`] turns a token list into a [`ParseResult`], and the
//! [`help`] module renders text or XML help. Two grammars can be combined
//! with [`merge_grammars`].
//!
//! # Example
//!
//! ```
//! use console_grammar_core::*;
//!
//! let grammar = Grammar::builder("bake")
//!     .description("Bake code.")
//!     .option(OptionSpec::new("connection").with_short("c").with_default("default"))?
//!     .argument(ArgumentSpec::required("name"))
//!     .build();
//!
//! let result = grammar.parse(["-c", "test", "Post"]).unwrap();
//! assert_eq!(result.value("connection"), Some("test"));
//! assert_eq!(result.argument(0), Some("Post"));
//! assert_eq!(result.flag("help"), Some(false));
//! # Ok::<(), GrammarError>(())
//! ```

mod error;
mod grammar;
pub mod help;
mod merge;
mod parse;
mod structured;
mod types;

pub use error::{GrammarError, LoadError, ParseError, Result};
pub use grammar::{
    Grammar, GrammarBuilder, HELP_OPTION, QUIET_OPTION, VERBOSE_OPTION, inflect_command_name,
};
pub use help::{HelpConfig, HelpFormat};
pub use merge::{MergeStrategy, merge_grammars};
pub use parse::{ParseResult, Verbosity};
pub use types::{ArgumentSpec, OptionSpec, OptionValue, SubcommandSpec};
