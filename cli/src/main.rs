use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console_grammar_core::help::{HelpConfig, HelpFormat, render};
use console_grammar_core::{Grammar, MergeStrategy, merge_grammars};
use tracing::{debug, info};

/// CLI-specific merge strategy enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliMergeStrategy {
    PreferBase,
    PreferOverlay,
    Union,
}

impl From<CliMergeStrategy> for MergeStrategy {
    fn from(strategy: CliMergeStrategy) -> Self {
        match strategy {
            CliMergeStrategy::PreferBase => Self::PreferBase,
            CliMergeStrategy::PreferOverlay => Self::PreferOverlay,
            CliMergeStrategy::Union => Self::Union,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "grammar", version)]
#[command(disable_help_subcommand = true)]
#[command(about = "Render help for and test-parse console command grammars")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. debug, console_grammar_core=trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render text or XML help for a grammar file.
    Help(HelpArgs),
    /// Parse tokens against a grammar file and print the result as JSON.
    Parse(ParseArgs),
    /// Validate one or more grammar files.
    Validate(ValidateArgs),
    /// Merge two grammar files and print the combined grammar as JSON.
    Merge(MergeArgs),
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Grammar file (.json, .yaml or .yml).
    file: PathBuf,
    /// Render help for this subcommand instead of the top-level command.
    #[arg(long)]
    subcommand: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = HelpFormat::Text)]
    format: HelpFormat,
    /// Layout settings file (.json, .yaml or .yml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Wrap width, overriding the config file.
    #[arg(long)]
    width: Option<usize>,
    /// Program name printed before the command in usage lines.
    #[arg(long)]
    program: Option<String>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Grammar file (.json, .yaml or .yml).
    file: PathBuf,
    /// Parse with this subcommand's grammar.
    #[arg(long)]
    subcommand: Option<String>,
    /// Tokens to parse. Put them after `--` when they start with a dash.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Grammar files to load.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct MergeArgs {
    /// Base grammar file.
    base: PathBuf,
    /// Overlay grammar file.
    overlay: PathBuf,
    /// Which side wins where both define the same item.
    #[arg(long, value_enum, default_value = "union")]
    strategy: CliMergeStrategy,
}

fn main() {
    let cli = Cli::parse();

    // stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let result = match cli.command {
        Command::Help(args) => run_help(args),
        Command::Parse(args) => run_parse(args),
        Command::Validate(args) => run_validate(args),
        Command::Merge(args) => run_merge(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_grammar(path: &Path) -> Result<Grammar, String> {
    let grammar = Grammar::load(path).map_err(|e| format!("{}: {e}", path.display()))?;
    debug!(path = %path.display(), command = grammar.command(), "loaded grammar");
    Ok(grammar)
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let grammar = load_grammar(&args.file)?;

    let mut config = match &args.config {
        Some(path) => {
            HelpConfig::load(path).map_err(|e| format!("{}: {e}", path.display()))?
        }
        None => HelpConfig::default(),
    };
    if let Some(width) = args.width {
        config = config.with_width(width);
    }
    if let Some(program) = args.program {
        config = config.with_program(program);
    }

    let output = render(&grammar, args.subcommand.as_deref(), args.format, &config)
        .map_err(|e| e.to_string())?;
    print!("{output}");
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let grammar = load_grammar(&args.file)?;
    let result = grammar
        .parse_with_subcommand(&args.tokens, args.subcommand.as_deref())
        .map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut commands = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let grammar = load_grammar(path)?;
        commands.push(grammar.command().to_string());
    }
    info!(count = commands.len(), "validated grammar files");
    println!(
        "Validated {} grammar file(s): {}",
        args.inputs.len(),
        commands.join(", ")
    );
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), String> {
    let base = load_grammar(&args.base)?;
    let overlay = load_grammar(&args.overlay)?;
    let merged =
        merge_grammars(&base, &overlay, args.strategy.into()).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&merged.to_structured()).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_is_a_regular_subcommand() {
        let cli = Cli::try_parse_from(["grammar", "help", "bake.yaml", "--format", "xml"]).unwrap();
        assert!(matches!(cli.command, super::Command::Help(_)));
    }
}
