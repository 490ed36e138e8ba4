use std::sync::Arc;
use std::thread;

use console_grammar_core::{
    ArgumentSpec, Grammar, GrammarBuilder, GrammarError, OptionSpec, OptionValue, ParseError,
    SubcommandSpec, Verbosity,
};
use serde_json::json;

fn flags_grammar() -> Grammar {
    Grammar::builder("test")
        .option(OptionSpec::boolean("test").with_short("t"))
        .unwrap()
        .option(OptionSpec::boolean("file").with_short("f"))
        .unwrap()
        .option(OptionSpec::boolean("output").with_short("o"))
        .unwrap()
        .build()
}

// ---------------------------------------------------------------------------
// Option resolution
// ---------------------------------------------------------------------------

#[test]
fn every_declared_option_is_resolved() {
    let grammar = Grammar::builder("bake")
        .option(OptionSpec::new("connection").with_default("default"))
        .unwrap()
        .option(OptionSpec::boolean("force"))
        .unwrap()
        .option(OptionSpec::new("plugin"))
        .unwrap()
        .argument(ArgumentSpec::required("name"))
        .build();

    let result = grammar.parse(["Post", "--plugin", "Blog"]).unwrap();
    assert_eq!(result.value("connection"), Some("default"));
    assert_eq!(result.flag("force"), Some(false));
    assert_eq!(result.value("plugin"), Some("Blog"));
    assert_eq!(result.get("help"), Some(&OptionValue::Bool(false)));
    assert_eq!(result.flag("verbose"), Some(false));
    assert_eq!(result.flag("quiet"), Some(false));
    assert!(result.arguments().len() <= grammar.arguments().len());
}

#[test]
fn value_option_without_default_is_absent() {
    let grammar = Grammar::builder("bake")
        .option(OptionSpec::new("plugin"))
        .unwrap()
        .build();
    let result = grammar.parse(Vec::<String>::new()).unwrap();
    assert!(result.get("plugin").is_none());
}

#[test]
fn long_option_forms() {
    let grammar = Grammar::builder("test")
        .option(OptionSpec::new("test"))
        .unwrap()
        .build();

    let spaced = grammar.parse(["--test", "value"]).unwrap();
    let inline = grammar.parse(["--test=value"]).unwrap();
    assert_eq!(spaced.value("test"), Some("value"));
    assert_eq!(spaced, inline);

    let with_equals = grammar.parse(["--test=a=b"]).unwrap();
    assert_eq!(with_equals.value("test"), Some("a=b"));
}

#[test]
fn short_option_takes_value() {
    let grammar = Grammar::builder("test")
        .option(OptionSpec::new("test").with_short("t"))
        .unwrap()
        .build();
    let result = grammar.parse(["-t", "value"]).unwrap();
    assert_eq!(result.value("test"), Some("value"));
}

#[test]
fn short_flag_cluster_matches_separate_flags() {
    let grammar = flags_grammar();
    let clustered = grammar.parse(["-otf"]).unwrap();
    let separate = grammar.parse(["-o", "-t", "-f"]).unwrap();

    assert_eq!(clustered.flag("test"), Some(true));
    assert_eq!(clustered.flag("file"), Some(true));
    assert_eq!(clustered.flag("output"), Some(true));
    assert_eq!(clustered, separate);
}

#[test]
fn option_value_may_start_with_dash() {
    let grammar = Grammar::builder("test")
        .option(OptionSpec::new("name"))
        .unwrap()
        .option(OptionSpec::new("age"))
        .unwrap()
        .build();
    let result = grammar.parse(["--name", "-foo", "--age", "old"]).unwrap();
    assert_eq!(result.value("name"), Some("-foo"));
    assert_eq!(result.value("age"), Some("old"));
}

#[test]
fn boolean_option_never_consumes_a_value() {
    let grammar = Grammar::builder("test")
        .option(OptionSpec::boolean("force"))
        .unwrap()
        .build();
    let result = grammar.parse(["--force", "value"]).unwrap();
    assert_eq!(result.flag("force"), Some(true));
    assert_eq!(result.arguments(), ["value"]);
}

#[test]
fn verbosity_from_builtins() {
    let grammar = Grammar::builder("test").build();
    assert_eq!(grammar.parse(["-v"]).unwrap().verbosity(), Verbosity::Verbose);
    assert_eq!(grammar.parse(["--quiet"]).unwrap().verbosity(), Verbosity::Quiet);
    assert_eq!(
        grammar.parse(Vec::<&str>::new()).unwrap().verbosity(),
        Verbosity::Normal
    );
}

// ---------------------------------------------------------------------------
// Positional arguments
// ---------------------------------------------------------------------------

#[test]
fn zero_is_a_valid_positional_value() {
    let grammar = Grammar::builder("test").build();
    let result = grammar.parse(["one", "two", "0", "after", "zero"]).unwrap();
    assert_eq!(result.arguments(), ["one", "two", "0", "after", "zero"]);
    assert_eq!(result.argument(2), Some("0"));
}

#[test]
fn missing_required_argument() {
    let grammar = Grammar::builder("test")
        .argument(ArgumentSpec::required("name"))
        .argument(ArgumentSpec::required("other"))
        .build();
    let err = grammar.parse(["one"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingArgument {
            command: "test".into(),
            argument: "other".into()
        }
    );
}

#[test]
fn too_many_arguments() {
    let grammar = Grammar::builder("test")
        .argument(ArgumentSpec::required("name"))
        .build();
    let err = grammar.parse(["one", "two"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::TooManyArguments {
            command: "test".into(),
            value: "two".into()
        }
    );
}

#[test]
fn optional_argument_may_be_omitted() {
    let grammar = Grammar::builder("test")
        .argument(ArgumentSpec::required("name"))
        .argument(ArgumentSpec::optional("other"))
        .build();
    let result = grammar.parse(["one"]).unwrap();
    assert_eq!(result.arguments(), ["one"]);
    assert_eq!(result.argument(1), None);
}

#[test]
fn argument_at_position_overwrites() {
    let grammar = Grammar::builder("test")
        .argument(ArgumentSpec::required("name"))
        .argument(ArgumentSpec::optional("other"))
        .argument_at(0, ArgumentSpec::optional("replaced").with_help("new"))
        .build();
    let names: Vec<&str> = grammar.arguments().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["replaced", "other"]);
    assert!(grammar.parse(Vec::<&str>::new()).is_ok());
}

// ---------------------------------------------------------------------------
// Choices
// ---------------------------------------------------------------------------

#[test]
fn option_choices_are_enforced() {
    let grammar = Grammar::builder("test")
        .option(OptionSpec::new("name").with_choices(["mark", "jose"]))
        .unwrap()
        .build();
    assert_eq!(grammar.parse(["--name", "mark"]).unwrap().value("name"), Some("mark"));

    let err = grammar.parse(["--name", "jimmy"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidChoice {
            command: "test".into(),
            target: "option `--name`".into(),
            value: "jimmy".into(),
            choices: vec!["mark".into(), "jose".into()],
        }
    );
}

#[test]
fn argument_choices_are_enforced() {
    let grammar = Grammar::builder("test")
        .argument(ArgumentSpec::required("name").with_choices(["mark", "jose"]))
        .argument(ArgumentSpec::optional("alias").with_choices(["cowboy", "samurai"]))
        .build();
    assert!(grammar.parse(["mark", "samurai"]).is_ok());

    let err = grammar.parse(["mark", "robot"]).unwrap_err();
    assert!(matches!(err, ParseError::InvalidChoice { ref target, .. } if target == "argument `alias`"));
    assert!(err.to_string().contains("choose one of: cowboy, samurai"));
}

// ---------------------------------------------------------------------------
// Help bypass
// ---------------------------------------------------------------------------

#[test]
fn help_bypasses_required_arguments() {
    let grammar = Grammar::builder("test")
        .argument(ArgumentSpec::required("name"))
        .build();
    let result = grammar.parse(["--help"]).unwrap();
    assert!(result.help_requested());
    assert_eq!(result.flag("help"), Some(true));

    let result = grammar.parse(["-h"]).unwrap();
    assert!(result.help_requested());
}

#[test]
fn help_bypasses_missing_option_value() {
    let grammar = Grammar::builder("bake")
        .option(OptionSpec::new("name"))
        .unwrap()
        .argument(ArgumentSpec::required("model"))
        .build();
    let result = grammar.parse(["--help", "--name"]).unwrap();
    assert!(result.help_requested());
    assert_eq!(result.get("name"), None);

    let err = grammar.parse(["Post", "--name"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingOptionValue {
            command: "bake".into(),
            option: "name".into()
        }
    );
}

#[test]
fn help_bypasses_choice_checks() {
    let grammar = Grammar::builder("test")
        .option(OptionSpec::new("name").with_choices(["mark"]))
        .unwrap()
        .argument(ArgumentSpec::required("kind").with_choices(["a", "b"]))
        .build();
    let result = grammar.parse(["--name", "jimmy", "zzz", "--help"]).unwrap();
    assert!(result.help_requested());
    assert_eq!(result.value("name"), Some("jimmy"));
}

#[test]
fn help_does_not_hide_unknown_options() {
    let grammar = Grammar::builder("test").build();
    assert!(matches!(
        grammar.parse(["--help", "--nope"]),
        Err(ParseError::UnknownOption { .. })
    ));
}

// ---------------------------------------------------------------------------
// Unknown options
// ---------------------------------------------------------------------------

#[test]
fn unknown_short_option() {
    let grammar = Grammar::builder("test").build();
    let err = grammar.parse(["-f"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownOption {
            command: "test".into(),
            token: "-f".into(),
            suggestion: None
        }
    );
}

#[test]
fn unknown_long_option_names_token() {
    let grammar = flags_grammar();
    let err = grammar.parse(["--fil"]).unwrap_err();
    assert_eq!(err.command(), "test");
    assert_eq!(
        err.to_string(),
        "test: unknown option `--fil`, did you mean `--file`?"
    );
}

#[test]
fn cluster_with_unknown_letter_fails_whole() {
    let grammar = flags_grammar();
    let err = grammar.parse(["-otx"]).unwrap_err();
    assert!(matches!(err, ParseError::UnknownOption { ref token, .. } if token == "-x"));
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn parent_with_sub() -> Grammar {
    Grammar::builder("test")
        .option(OptionSpec::new("primary"))
        .unwrap()
        .argument(ArgumentSpec::required("one").with_choices(["a", "b"]))
        .argument(ArgumentSpec::required("two"))
        .subcommand(SubcommandSpec::new("sub").with_structure(json!({
            "options": {
                "secondary": { "boolean": true },
                "fourth": { "help": "fourth option" }
            },
            "arguments": {
                "sub_arg": { "choices": ["c", "d"] }
            }
        })))
        .build()
}

#[test]
fn subcommand_parse_is_isolated_from_parent() {
    let grammar = parent_with_sub();
    let result = grammar
        .parse_with_subcommand(["--secondary", "--fourth", "4", "c"], Some("sub"))
        .unwrap();

    let keys: Vec<&str> = result.options().keys().map(String::as_str).collect();
    assert_eq!(keys, ["fourth", "help", "quiet", "secondary", "verbose"]);
    assert_eq!(result.flag("secondary"), Some(true));
    assert_eq!(result.value("fourth"), Some("4"));
    assert!(result.get("primary").is_none());
    assert_eq!(result.arguments(), ["c"]);
    assert_eq!(result.subcommand(), Some("sub"));
}

#[test]
fn first_token_selects_subcommand() {
    let grammar = parent_with_sub();
    let result = grammar.parse(["sub", "--secondary", "d"]).unwrap();
    assert_eq!(result.subcommand(), Some("sub"));
    assert_eq!(result.arguments(), ["d"]);
}

#[test]
fn subcommand_errors_carry_subcommand_name() {
    let grammar = parent_with_sub();
    let err = grammar.parse(["sub", "--primary", "x"]).unwrap_err();
    assert_eq!(err.command(), "sub");
}

#[test]
fn parent_parse_without_subcommand() {
    let grammar = parent_with_sub();
    let result = grammar.parse(["--primary", "x", "a", "b"]).unwrap();
    assert_eq!(result.value("primary"), Some("x"));
    assert_eq!(result.arguments(), ["a", "b"]);
    assert_eq!(result.subcommand(), None);
}

// ---------------------------------------------------------------------------
// Build-time validation
// ---------------------------------------------------------------------------

#[test]
fn duplicate_short_alias_rejected() {
    let err = Grammar::builder("test")
        .option(OptionSpec::new("test").with_short("t"))
        .unwrap()
        .option(OptionSpec::new("other").with_short("t"))
        .unwrap_err();
    assert_eq!(
        err,
        GrammarError::DuplicateShortOption {
            option: "other".into(),
            short: "t".into(),
            existing: "test".into()
        }
    );
}

#[test]
fn multi_character_short_alias_rejected() {
    let err = Grammar::builder("test")
        .option(OptionSpec::new("test").with_short("te"))
        .unwrap_err();
    assert!(matches!(err, GrammarError::InvalidShortOption { .. }));
}

#[test]
fn builtin_short_aliases_are_reserved() {
    let err = Grammar::builder("test")
        .option(OptionSpec::boolean("host").with_short("h"))
        .unwrap_err();
    assert!(matches!(err, GrammarError::DuplicateShortOption { ref existing, .. } if existing == "help"));
}

#[test]
fn command_name_inflection() {
    assert_eq!(GrammarBuilder::from_identifier("CommandLine").build().command(), "command_line");
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

#[test]
fn grammar_is_reusable_across_threads() {
    let grammar = Arc::new(parent_with_sub());
    let handles: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|first| {
            let grammar = Arc::clone(&grammar);
            thread::spawn(move || grammar.parse([first, "two"]).map(|r| r.arguments().to_vec()))
        })
        .collect();

    for handle in handles {
        let arguments = handle.join().unwrap().unwrap();
        assert_eq!(arguments.len(), 2);
    }
}
