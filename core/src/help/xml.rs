//! XML help document.
//!
//! The document has a fixed shape:
//!
//! ```xml
//! <?xml version="1.0"?>
//! <shell>
//!   <name>bake</name>
//!   <description>...</description>
//!   <subcommands><command name="model" help="..."/></subcommands>
//!   <options>
//!     <option name="--help" short="-h" help="..." boolean="1">
//!       <default/><choices/>
//!     </option>
//!   </options>
//!   <arguments>
//!     <argument name="name" help="..." required="1"><choices/></argument>
//!   </arguments>
//!   <epilog></epilog>
//! </shell>
//! ```
//!
//! Serialized output is compact (no indentation) and deterministic.

use crate::grammar::Grammar;
use crate::types::{ArgumentSpec, OptionSpec};

/// One element of an XML document.
///
/// An element with text renders as `<x>text</x>` (even when the text is
/// empty); an element with neither text nor children renders self-closing.
///
/// # Examples
///
/// ```
/// use console_grammar_core::help::XmlElement;
///
/// let mut root = XmlElement::new("shell");
/// root.push(XmlElement::new("name").with_text("bake"));
/// root.push(XmlElement::new("subcommands"));
/// root.push(XmlElement::new("command").with_attr("help", "a < b"));
///
/// assert_eq!(
///     root.to_string(),
///     r#"<shell><name>bake</name><subcommands/><command help="a &lt; b"/></shell>"#
/// );
/// assert_eq!(root.child("name").and_then(|n| n.text()), Some("bake"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child with the given element name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Serializes the element as a document with an XML declaration.
    pub fn to_xml_string(&self) -> String {
        format!("<?xml version=\"1.0\"?>\n{self}\n")
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        if self.text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_into(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl std::fmt::Display for XmlElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        self.write_into(&mut out);
        f.write_str(&out)
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

pub(crate) fn document(grammar: &Grammar, path: &str) -> XmlElement {
    let mut shell = XmlElement::new("shell");
    shell.push(XmlElement::new("name").with_text(path));
    shell.push(XmlElement::new("description").with_text(grammar.description().unwrap_or_default()));

    let mut subcommands = XmlElement::new("subcommands");
    for sub in grammar.subcommands() {
        subcommands.push(
            XmlElement::new("command")
                .with_attr("name", sub.name.as_str())
                .with_attr("help", sub.help.as_str()),
        );
    }
    shell.push(subcommands);

    let mut options = XmlElement::new("options");
    for option in grammar.options() {
        options.push(option_element(option));
    }
    shell.push(options);

    let mut arguments = XmlElement::new("arguments");
    for argument in grammar.arguments() {
        arguments.push(argument_element(argument));
    }
    shell.push(arguments);

    shell.push(XmlElement::new("epilog").with_text(grammar.epilog().unwrap_or_default()));
    shell
}

fn option_element(option: &OptionSpec) -> XmlElement {
    let short = option
        .short
        .as_ref()
        .map(|s| format!("-{s}"))
        .unwrap_or_default();
    let mut element = XmlElement::new("option")
        .with_attr("name", format!("--{}", option.name))
        .with_attr("short", short)
        .with_attr("help", option.help.as_str())
        .with_attr("boolean", flag(option.boolean));

    let default = match &option.default {
        Some(value) => XmlElement::new("default").with_text(value.to_string()),
        None => XmlElement::new("default"),
    };
    element.push(default);
    element.push(choices_element(&option.choices));
    element
}

fn argument_element(argument: &ArgumentSpec) -> XmlElement {
    let mut element = XmlElement::new("argument")
        .with_attr("name", argument.name.as_str())
        .with_attr("help", argument.help.as_str())
        .with_attr("required", flag(argument.required));
    element.push(choices_element(&argument.choices));
    element
}

fn choices_element(choices: &[String]) -> XmlElement {
    let mut element = XmlElement::new("choices");
    for choice in choices {
        element.push(XmlElement::new("choice").with_text(choice.as_str()));
    }
    element
}
