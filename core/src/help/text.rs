//! Plain-text help layout.
//!
//! Sections, in order: description, usage, subcommands, options, arguments,
//! epilog. Each table section is a two-column layout whose first column is as
//! wide as its longest label plus two spaces.

use crate::grammar::Grammar;
use crate::help::HelpConfig;
use crate::help::wrap::{table_row, wrap};
use crate::types::{ArgumentSpec, OptionSpec, OptionValue};

/// Spaces between the longest label and the help column: two, not one.
const COLUMN_GAP: usize = 2;

pub(crate) fn render(grammar: &Grammar, path: &str, config: &HelpConfig) -> String {
    let mut out: Vec<String> = Vec::new();

    if let Some(description) = grammar.description().filter(|d| !d.trim().is_empty()) {
        out.extend(wrap(description, config.width));
        out.push(String::new());
    }

    out.push("Usage:".to_string());
    out.push(usage(grammar, path, config));
    out.push(String::new());

    if !grammar.subcommands().is_empty() {
        out.push("Subcommands:".to_string());
        out.push(String::new());
        let rows: Vec<(String, String)> = grammar
            .subcommands()
            .iter()
            .map(|s| (s.name.clone(), s.help.clone()))
            .collect();
        out.extend(table(&rows, config.width));
        out.push(String::new());
        out.push(format!(
            "To see help on a subcommand use `{}{path} [subcommand] --help`",
            program_prefix(config)
        ));
        out.push(String::new());
    }

    if !grammar.options().is_empty() {
        out.push("Options:".to_string());
        out.push(String::new());
        let rows: Vec<(String, String)> = grammar
            .options()
            .iter()
            .map(|o| (option_label(o), option_help(o)))
            .collect();
        out.extend(table(&rows, config.width));
        out.push(String::new());
    }

    if !grammar.arguments().is_empty() {
        out.push("Arguments:".to_string());
        out.push(String::new());
        let rows: Vec<(String, String)> = grammar
            .arguments()
            .iter()
            .map(|a| (a.name.clone(), argument_help(a)))
            .collect();
        out.extend(table(&rows, config.width));
        out.push(String::new());
    }

    if let Some(epilog) = grammar.epilog().filter(|e| !e.trim().is_empty()) {
        out.extend(wrap(epilog, config.width));
        out.push(String::new());
    }

    out.join("\n")
}

fn program_prefix(config: &HelpConfig) -> String {
    match config.program.as_deref() {
        Some(program) if !program.is_empty() => format!("{program} "),
        _ => String::new(),
    }
}

fn usage(grammar: &Grammar, path: &str, config: &HelpConfig) -> String {
    let mut parts = vec![format!("{}{path}", program_prefix(config))];
    if !grammar.subcommands().is_empty() {
        parts.push("[subcommand]".to_string());
    }

    if grammar.options().len() > config.max_options {
        parts.push("[options]".to_string());
    } else {
        parts.extend(grammar.options().iter().map(option_usage));
    }

    if grammar.arguments().len() > config.max_arguments {
        parts.push("[arguments]".to_string());
    } else {
        parts.extend(grammar.arguments().iter().map(argument_usage));
    }

    parts.join(" ")
}

fn table(rows: &[(String, String)], width: usize) -> Vec<String> {
    let column = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        + COLUMN_GAP;
    rows.iter()
        .map(|(label, text)| table_row(label, text, column, width))
        .collect()
}

fn option_label(option: &OptionSpec) -> String {
    match &option.short {
        Some(short) => format!("--{}, -{short}", option.name),
        None => format!("--{}", option.name),
    }
}

/// Usage token: `[-f]`, `[--force]`, `[-c default]`, `[--format text|xml]`.
fn option_usage(option: &OptionSpec) -> String {
    let name = match &option.short {
        Some(short) => format!("-{short}"),
        None => format!("--{}", option.name),
    };
    if option.boolean {
        return format!("[{name}]");
    }
    let value = if !option.choices.is_empty() {
        option.choices.join("|")
    } else {
        match &option.default {
            Some(OptionValue::Str(default)) if !default.is_empty() => default.clone(),
            _ => format!("<{}>", option.name),
        }
    };
    format!("[{name} {value}]")
}

fn option_help(option: &OptionSpec) -> String {
    let mut help = option.help.clone();
    if let Some(OptionValue::Str(default)) = &option.default {
        if !default.is_empty() {
            help.push_str(&format!(" (default: {default})"));
        }
    }
    if !option.choices.is_empty() {
        help.push_str(&format!(" (choices: {})", option.choices.join("|")));
    }
    help.trim_start().to_string()
}

/// Usage token: `<name>`, `<a|b>`, optional ones wrapped in brackets.
fn argument_usage(argument: &ArgumentSpec) -> String {
    let inner = if argument.choices.is_empty() {
        format!("<{}>", argument.name)
    } else {
        format!("<{}>", argument.choices.join("|"))
    };
    if argument.required {
        inner
    } else {
        format!("[{inner}]")
    }
}

fn argument_help(argument: &ArgumentSpec) -> String {
    let mut help = argument.help.clone();
    if !argument.required {
        help.push_str(" (optional)");
    }
    if !argument.choices.is_empty() {
        help.push_str(&format!(" (choices: {})", argument.choices.join("|")));
    }
    help.trim_start().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    #[test]
    fn test_option_usage_forms() {
        assert_eq!(option_usage(&OptionSpec::boolean("force").with_short("f")), "[-f]");
        assert_eq!(option_usage(&OptionSpec::boolean("force")), "[--force]");
        assert_eq!(
            option_usage(&OptionSpec::new("connection").with_short("c").with_default("default")),
            "[-c default]"
        );
        assert_eq!(
            option_usage(&OptionSpec::new("format").with_choices(["text", "xml"])),
            "[--format text|xml]"
        );
        assert_eq!(option_usage(&OptionSpec::new("name")), "[--name <name>]");
    }

    #[test]
    fn test_argument_usage_forms() {
        assert_eq!(argument_usage(&ArgumentSpec::required("name")), "<name>");
        assert_eq!(argument_usage(&ArgumentSpec::optional("name")), "[<name>]");
        assert_eq!(
            argument_usage(&ArgumentSpec::required("kind").with_choices(["a", "b"])),
            "<a|b>"
        );
    }

    #[test]
    fn test_annotations() {
        let option = OptionSpec::new("format")
            .with_help("Output format.")
            .with_default("text")
            .with_choices(["text", "xml"]);
        assert_eq!(
            option_help(&option),
            "Output format. (default: text) (choices: text|xml)"
        );

        let argument = ArgumentSpec::optional("kind").with_choices(["a", "b"]);
        assert_eq!(argument_help(&argument), "(optional) (choices: a|b)");
    }

    #[test]
    fn test_program_prefix_in_usage() {
        let grammar = Grammar::builder("bake").without_default_options().build();
        let config = HelpConfig::default().with_program("cake");
        assert_eq!(usage(&grammar, "bake", &config), "cake bake [-h]");
    }
}
