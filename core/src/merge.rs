//! Grammar merging with configurable conflict resolution.
//!
//! A command often shares most of its grammar with a base (common
//! connection options, say) and adds its own pieces. [`merge_grammars`]
//! combines two grammars into one, using a [`MergeStrategy`] to decide which
//! side wins where both define the same option, argument position, or
//! subcommand.
//!
//! # Example
//!
//! ```
//! use console_grammar_core::*;
//!
//! let base = Grammar::builder("bake")
//!     .option(OptionSpec::new("connection").with_short("c"))?
//!     .build();
//! let overlay = Grammar::builder("bake")
//!     .option(OptionSpec::boolean("force").with_short("f"))?
//!     .build();
//!
//! let merged = merge_grammars(&base, &overlay, MergeStrategy::Union)?;
//! assert!(merged.option("connection").is_some());
//! assert!(merged.option("force").is_some());
//! # Ok::<(), GrammarError>(())
//! ```

use std::sync::Arc;

use crate::error::Result;
use crate::grammar::{Grammar, GrammarBuilder};
use crate::types::{ArgumentSpec, OptionSpec, SubcommandSpec};

/// Grammar merge behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Keep base definitions when both sides define the same thing.
    PreferBase,
    /// Keep overlay definitions when both sides define the same thing.
    PreferOverlay,
    /// Overlay wins for texts and options; argument positions already
    /// declared by the base are kept.
    Union,
}

/// Merges two grammars. The result keeps the base's command name.
///
/// Options keep declaration order: the base's first, then options only the
/// overlay declares. Arguments are merged position by position. Subcommands
/// present on both sides with nested grammars are merged recursively.
///
/// # Errors
///
/// Returns a [`GrammarError`](crate::GrammarError) when the merged options
/// collide on a short alias, or a nested deferred grammar fails to build.
pub fn merge_grammars(
    base: &Grammar,
    overlay: &Grammar,
    strategy: MergeStrategy,
) -> Result<Grammar> {
    let mut builder = GrammarBuilder::new(base.command());
    if !(base.has_default_options() && overlay.has_default_options()) {
        builder = builder.without_default_options();
    }

    if let Some(description) = pick_text(base.description(), overlay.description(), strategy) {
        builder = builder.description(description);
    }
    if let Some(epilog) = pick_text(base.epilog(), overlay.epilog(), strategy) {
        builder = builder.epilog(epilog);
    }

    for option in merge_options(base, overlay, strategy) {
        builder = builder.option(option)?;
    }
    for (index, argument) in merge_arguments(base.arguments(), overlay.arguments(), strategy)
        .into_iter()
        .enumerate()
    {
        builder = builder.argument_at(index, argument);
    }
    for sub in merge_subcommands(base.subcommands(), overlay.subcommands(), strategy)? {
        builder = builder.subcommand(sub);
    }

    Ok(builder.build())
}

fn pick_text(base: Option<&str>, overlay: Option<&str>, strategy: MergeStrategy) -> Option<String> {
    match strategy {
        MergeStrategy::PreferBase => base.or(overlay),
        MergeStrategy::PreferOverlay | MergeStrategy::Union => overlay.or(base),
    }
    .map(str::to_string)
}

fn merge_options(base: &Grammar, overlay: &Grammar, strategy: MergeStrategy) -> Vec<OptionSpec> {
    let mut merged: Vec<OptionSpec> = base
        .options()
        .iter()
        .filter(|o| !base.is_builtin(&o.name))
        .cloned()
        .collect();

    for option in overlay.options().iter().filter(|o| !overlay.is_builtin(&o.name)) {
        match merged.iter().position(|o| o.name == option.name) {
            Some(index) if strategy != MergeStrategy::PreferBase => merged[index] = option.clone(),
            Some(_) => {}
            None => merged.push(option.clone()),
        }
    }
    merged
}

fn merge_arguments(
    base: &[ArgumentSpec],
    overlay: &[ArgumentSpec],
    strategy: MergeStrategy,
) -> Vec<ArgumentSpec> {
    let len = base.len().max(overlay.len());
    (0..len)
        .filter_map(|i| match (base.get(i), overlay.get(i)) {
            (Some(_), Some(o)) if strategy == MergeStrategy::PreferOverlay => Some(o.clone()),
            (Some(b), _) => Some(b.clone()),
            (None, o) => o.cloned(),
        })
        .collect()
}

fn merge_subcommands(
    base: &[SubcommandSpec],
    overlay: &[SubcommandSpec],
    strategy: MergeStrategy,
) -> Result<Vec<SubcommandSpec>> {
    let mut merged: Vec<SubcommandSpec> = base.to_vec();

    for sub in overlay {
        match merged.iter().position(|s| s.name == sub.name) {
            Some(index) => {
                let combined = merge_subcommand(&merged[index], sub, strategy)?;
                merged[index] = combined;
            }
            None => merged.push(sub.clone()),
        }
    }
    Ok(merged)
}

fn merge_subcommand(
    base: &SubcommandSpec,
    overlay: &SubcommandSpec,
    strategy: MergeStrategy,
) -> Result<SubcommandSpec> {
    let help = match strategy {
        MergeStrategy::PreferBase if !base.help.is_empty() => base.help.clone(),
        MergeStrategy::PreferBase => overlay.help.clone(),
        _ if !overlay.help.is_empty() => overlay.help.clone(),
        _ => base.help.clone(),
    };

    let mut merged = match (base.grammar()?, overlay.grammar()?) {
        (Some(b), Some(o)) => {
            SubcommandSpec::new(base.name.as_str()).with_grammar(Arc::new(merge_grammars(&b, &o, strategy)?))
        }
        (Some(_), None) => base.clone(),
        (None, Some(_)) => overlay.clone(),
        (None, None) => SubcommandSpec::new(base.name.as_str()),
    };
    merged.help = help;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar_with(description: &str, options: Vec<OptionSpec>) -> Grammar {
        let mut builder = Grammar::builder("bake").description(description);
        for option in options {
            builder = builder.option(option).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_merge_prefer_base_keeps_base_description() {
        let base = grammar_with("base", vec![]);
        let overlay = grammar_with("overlay", vec![]);
        let merged = merge_grammars(&base, &overlay, MergeStrategy::PreferBase).unwrap();
        assert_eq!(merged.description(), Some("base"));
    }

    #[test]
    fn test_merge_prefer_overlay_replaces_option() {
        let base = grammar_with("base", vec![OptionSpec::new("connection").with_help("base")]);
        let overlay = grammar_with("overlay", vec![OptionSpec::new("connection").with_help("overlay")]);
        let merged = merge_grammars(&base, &overlay, MergeStrategy::PreferOverlay).unwrap();
        assert_eq!(merged.description(), Some("overlay"));
        assert_eq!(merged.option("connection").unwrap().help, "overlay");
        // built-ins plus one merged option
        assert_eq!(merged.options().len(), 4);
    }

    #[test]
    fn test_merge_short_collision_is_an_error() {
        let base = grammar_with("base", vec![OptionSpec::new("connection").with_short("c")]);
        let overlay = grammar_with("overlay", vec![OptionSpec::new("config").with_short("c")]);
        assert!(merge_grammars(&base, &overlay, MergeStrategy::Union).is_err());
    }

    #[test]
    fn test_merge_arguments_by_position() {
        let base = Grammar::builder("bake")
            .argument(ArgumentSpec::required("name"))
            .build();
        let overlay = Grammar::builder("bake")
            .argument(ArgumentSpec::optional("label"))
            .argument(ArgumentSpec::optional("extra"))
            .build();

        let union = merge_grammars(&base, &overlay, MergeStrategy::Union).unwrap();
        let names: Vec<&str> = union.arguments().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["name", "extra"]);

        let overlaid = merge_grammars(&base, &overlay, MergeStrategy::PreferOverlay).unwrap();
        let names: Vec<&str> = overlaid.arguments().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["label", "extra"]);
    }

    #[test]
    fn test_merge_nested_subcommand_grammars() {
        let base = Grammar::builder("bake")
            .subcommand(SubcommandSpec::new("model").with_help("Bake a model").with_grammar(
                Grammar::builder("model").option(OptionSpec::new("table")).unwrap().build(),
            ))
            .build();
        let overlay = Grammar::builder("bake")
            .subcommand(SubcommandSpec::new("model").with_grammar(
                Grammar::builder("model").option(OptionSpec::boolean("force")).unwrap().build(),
            ))
            .build();

        let merged = merge_grammars(&base, &overlay, MergeStrategy::Union).unwrap();
        let model = merged.subcommand("model").unwrap();
        assert_eq!(model.help, "Bake a model");
        let nested = model.grammar().unwrap().unwrap();
        assert!(nested.option("table").is_some());
        assert!(nested.option("force").is_some());
    }
}
