//! Conversion between grammars and declarative key-value structures.
//!
//! The structure is a plain [`serde_json::Value`] tree, so it can come from
//! JSON, YAML, or be assembled in code with [`serde_json::json!`]:
//!
//! ```yaml
//! command: bake
//! description:
//!   - Bake application code.
//!   - Pick a task below.
//! arguments:
//!   name: { help: Name of the thing, required: true }
//!   kind: { choices: [model, controller] }
//! options:
//!   connection: { short: c, default: default }
//!   force: { short: f, boolean: true }
//! subcommands:
//!   model:
//!     help: Bake a model
//!     parser:
//!       options:
//!         table: { short: t }
//! ```
//!
//! Nested `parser` structures are converted recursively with the same rules.
//! A nested structure without `command` takes the subcommand's name.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{GrammarError, LoadError, Result};
use crate::grammar::{Grammar, GrammarBuilder};
use crate::types::{ArgumentSpec, NestedGrammar, OptionSpec, OptionValue, SubcommandSpec};

impl Grammar {
    /// Builds a grammar, including nested subcommand grammars, from a
    /// declarative structure.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidStructure`] when a key holds the wrong
    /// kind of value or `command` is missing, and any builder error raised
    /// while adding options.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_grammar_core::Grammar;
    /// use serde_json::json;
    ///
    /// let grammar = Grammar::from_structured(&json!({
    ///     "command": "test",
    ///     "description": "description text",
    ///     "epilog": "epilog text",
    ///     "arguments": { "name": {}, "other": {} },
    ///     "options": { "name": { "short": "n", "help": "A name" } },
    ///     "subcommands": { "initdb": { "help": "Initialize the database" } }
    /// }))?;
    ///
    /// assert_eq!(grammar.description(), Some("description text"));
    /// assert_eq!(grammar.arguments().len(), 2);
    /// assert!(grammar.option("name").is_some());
    /// assert_eq!(grammar.subcommands().len(), 1);
    /// # Ok::<(), console_grammar_core::GrammarError>(())
    /// ```
    pub fn from_structured(spec: &Value) -> Result<Self> {
        build(spec, None, "")
    }

    /// Like [`from_structured`](Grammar::from_structured), using `fallback`
    /// as the command name when the structure has none.
    pub fn from_structured_with_name(spec: &Value, fallback: &str) -> Result<Self> {
        build(spec, Some(fallback), "")
    }

    /// Parses a JSON grammar description.
    pub fn from_json_str(raw: &str) -> std::result::Result<Self, LoadError> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_structured(&value)?)
    }

    /// Parses a YAML grammar description.
    pub fn from_yaml_str(raw: &str) -> std::result::Result<Self, LoadError> {
        let value: Value = serde_yaml::from_str(raw)?;
        Ok(Self::from_structured(&value)?)
    }

    /// Loads a grammar description file. `.yaml`/`.yml` files are read as
    /// YAML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read, a format error
    /// if it does not parse, or [`LoadError::Grammar`] if the structure is
    /// invalid.
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw),
            _ => Self::from_json_str(&raw),
        }
    }

    /// Exports the grammar as a declarative structure.
    ///
    /// Built-in options are left out; converting the result back with
    /// [`from_structured`](Grammar::from_structured) yields an equivalent
    /// grammar.
    pub fn to_structured(&self) -> Value {
        let mut root = Map::new();
        root.insert("command".into(), Value::String(self.command.clone()));
        if let Some(description) = &self.description {
            root.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(epilog) = &self.epilog {
            root.insert("epilog".into(), Value::String(epilog.clone()));
        }
        if !self.default_options {
            root.insert("default_options".into(), Value::Bool(false));
        }

        let mut arguments = Map::new();
        for arg in &self.arguments {
            let mut attrs = Map::new();
            attrs.insert("help".into(), Value::String(arg.help.clone()));
            attrs.insert("required".into(), Value::Bool(arg.required));
            attrs.insert("choices".into(), string_array(&arg.choices));
            arguments.insert(arg.name.clone(), Value::Object(attrs));
        }
        root.insert("arguments".into(), Value::Object(arguments));

        let mut options = Map::new();
        for opt in self.options.iter().filter(|o| !self.is_builtin(&o.name)) {
            let mut attrs = Map::new();
            if let Some(short) = &opt.short {
                attrs.insert("short".into(), Value::String(short.clone()));
            }
            attrs.insert("help".into(), Value::String(opt.help.clone()));
            attrs.insert("boolean".into(), Value::Bool(opt.boolean));
            match &opt.default {
                Some(OptionValue::Bool(b)) => {
                    attrs.insert("default".into(), Value::Bool(*b));
                }
                Some(OptionValue::Str(s)) => {
                    attrs.insert("default".into(), Value::String(s.clone()));
                }
                None => {}
            }
            attrs.insert("choices".into(), string_array(&opt.choices));
            options.insert(opt.name.clone(), Value::Object(attrs));
        }
        root.insert("options".into(), Value::Object(options));

        let mut subcommands = Map::new();
        for sub in &self.subcommands {
            let mut attrs = Map::new();
            attrs.insert("help".into(), Value::String(sub.help.clone()));
            match &sub.nested {
                Some(NestedGrammar::Built(grammar)) => {
                    attrs.insert("parser".into(), grammar.to_structured());
                }
                Some(NestedGrammar::Deferred { spec, .. }) => {
                    attrs.insert("parser".into(), spec.clone());
                }
                None => {}
            }
            subcommands.insert(sub.name.clone(), Value::Object(attrs));
        }
        root.insert("subcommands".into(), Value::Object(subcommands));

        Value::Object(root)
    }
}

fn build(spec: &Value, fallback: Option<&str>, path: &str) -> Result<Grammar> {
    let root = as_object(spec, path)?;

    let command = match root.get("command") {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => match fallback {
            Some(name) => name.to_string(),
            None => return Err(invalid(&join(path, "command"), "command name is required")),
        },
        Some(_) => return Err(invalid(&join(path, "command"), "expected a string")),
    };

    let mut builder = GrammarBuilder::new(command);
    if let Some(flag) = root.get("default_options") {
        if !as_bool(flag, &join(path, "default_options"))? {
            builder = builder.without_default_options();
        }
    }
    if let Some(text) = text_block(root.get("description"), &join(path, "description"))? {
        builder = builder.description(text);
    }
    if let Some(text) = text_block(root.get("epilog"), &join(path, "epilog"))? {
        builder = builder.epilog(text);
    }

    for (name, attrs) in entries(root.get("arguments"), &join(path, "arguments"))? {
        let at = join(&join(path, "arguments"), name);
        let attrs = attributes(attrs, &at)?;
        let mut arg = if flag_attr(attrs, "required", &at)? {
            ArgumentSpec::required(name.as_str())
        } else {
            ArgumentSpec::optional(name.as_str())
        };
        arg.help = string_attr(attrs, "help", &at)?.unwrap_or_default();
        arg.choices = choices_attr(attrs, &at)?;
        builder = match attrs.and_then(|a| a.get("index")) {
            Some(Value::Number(n)) => match n.as_u64() {
                Some(index) => builder.argument_at(index as usize, arg),
                None => return Err(invalid(&join(&at, "index"), "expected a non-negative integer")),
            },
            Some(Value::Null) | None => builder.argument(arg),
            Some(_) => return Err(invalid(&join(&at, "index"), "expected a non-negative integer")),
        };
    }

    for (name, attrs) in entries(root.get("options"), &join(path, "options"))? {
        let at = join(&join(path, "options"), name);
        let attrs = attributes(attrs, &at)?;
        let mut opt = OptionSpec::new(name.as_str());
        opt.short = string_attr(attrs, "short", &at)?;
        opt.help = string_attr(attrs, "help", &at)?.unwrap_or_default();
        opt.boolean = flag_attr(attrs, "boolean", &at)?;
        opt.default = match attrs.and_then(|a| a.get("default")) {
            None | Some(Value::Null) => None,
            Some(value) => Some(scalar(value, &join(&at, "default"))?),
        };
        opt.choices = choices_attr(attrs, &at)?;
        builder = builder.option(opt)?;
    }

    for (name, attrs) in entries(root.get("subcommands"), &join(path, "subcommands"))? {
        let at = join(&join(path, "subcommands"), name);
        let attrs = attributes(attrs, &at)?;
        let mut sub = SubcommandSpec::new(name.as_str());
        sub.help = string_attr(attrs, "help", &at)?.unwrap_or_default();
        match attrs.and_then(|a| a.get("parser")) {
            None | Some(Value::Null) => {}
            Some(nested) => {
                let grammar = build(nested, Some(name.as_str()), &join(&at, "parser"))?;
                sub = sub.with_grammar(Arc::new(grammar));
            }
        }
        builder = builder.subcommand(sub);
    }

    Ok(builder.build())
}

fn invalid(path: &str, message: &str) -> GrammarError {
    GrammarError::InvalidStructure {
        path: if path.is_empty() { "<root>".into() } else { path.into() },
        message: message.into(),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| invalid(path, "expected a mapping"))
}

fn as_bool(value: &Value, path: &str) -> Result<bool> {
    value.as_bool().ok_or_else(|| invalid(path, "expected a boolean"))
}

/// Name → attributes section. A missing or null section is empty.
fn entries<'a>(value: Option<&'a Value>, path: &str) -> Result<Vec<(&'a String, &'a Value)>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(map.iter().collect()),
        Some(_) => Err(invalid(path, "expected a mapping of names to attributes")),
    }
}

/// Attribute mapping of one entry; `null` means "all defaults".
fn attributes<'a>(value: &'a Value, path: &str) -> Result<Option<&'a Map<String, Value>>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(invalid(path, "expected a mapping of attributes")),
    }
}

fn string_attr(attrs: Option<&Map<String, Value>>, key: &str, path: &str) -> Result<Option<String>> {
    match attrs.and_then(|a| a.get(key)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(&join(path, key), "expected a string")),
    }
}

fn flag_attr(attrs: Option<&Map<String, Value>>, key: &str, path: &str) -> Result<bool> {
    match attrs.and_then(|a| a.get(key)) {
        None | Some(Value::Null) => Ok(false),
        Some(value) => as_bool(value, &join(path, key)),
    }
}

fn choices_attr(attrs: Option<&Map<String, Value>>, path: &str) -> Result<Vec<String>> {
    let at = join(path, "choices");
    match attrs.and_then(|a| a.get("choices")) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| scalar(item, &at).map(|v| v.to_string()))
            .collect(),
        Some(_) => Err(invalid(&at, "expected a list of values")),
    }
}

fn scalar(value: &Value, path: &str) -> Result<OptionValue> {
    match value {
        Value::Bool(b) => Ok(OptionValue::Bool(*b)),
        Value::String(s) => Ok(OptionValue::Str(s.clone())),
        Value::Number(n) => Ok(OptionValue::Str(n.to_string())),
        _ => Err(invalid(path, "expected a scalar value")),
    }
}

/// Description/epilog: a string, or a list of lines joined by newlines.
fn text_block(value: Option<&Value>, path: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Array(lines)) => {
            let lines = lines
                .iter()
                .map(|line| {
                    line.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid(path, "expected a list of strings"))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(lines.join("\n")))
        }
        Some(_) => Err(invalid(path, "expected a string or a list of lines")),
    }
}

fn string_array(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}
