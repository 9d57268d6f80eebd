//! Naming-template grammar for tags and release branches.
//!
//! A template is literal text with a few placeholders:
//!
//! | syntax    | matches                                 |
//! |-----------|-----------------------------------------|
//! | `<num>`   | one or more ASCII digits                |
//! | `<id>`    | one or more of `[0-9A-Za-z-]`           |
//! | `[ ... ]` | the enclosed sequence, or nothing       |
//! | `\x`      | the literal character `x`               |
//!
//! `v<num>.<num>.<num>[-<id>.<num>]` matches `v1.2.3` and `v1.2.3-alpha.4`.
//! Templates are parsed once and compiled into an anchored matcher, so a
//! tag name must match in full.

use crate::error::{FlowError, Result};
use regex::Regex;
use std::fmt;

/// Channel restriction applied when building a tag or branch template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelFilter {
    /// Any channel, or none at all
    Any,
    /// Only names without a channel segment
    Release,
    /// Only the given channel
    Named(String),
}

impl ChannelFilter {
    /// `Named` for `Some(channel)`, `Any` otherwise.
    pub fn from_option(channel: Option<&str>) -> Self {
        match channel {
            Some(channel) => ChannelFilter::Named(channel.to_string()),
            None => ChannelFilter::Any,
        }
    }
}

impl fmt::Display for ChannelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelFilter::Any => write!(f, "any channel"),
            ChannelFilter::Release => write!(f, "release"),
            ChannelFilter::Named(channel) => write!(f, "channel '{}'", channel),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Literal(String),
    Number,
    Identifier,
    Optional(Vec<Node>),
}

/// A compiled naming template.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    template: String,
    regex: Regex,
}

impl PatternMatcher {
    /// Parses and compiles `template`.
    pub fn compile(template: &str) -> Result<Self> {
        let nodes = Parser::new(template).parse()?;

        let mut source = String::from("^");
        emit(&nodes, &mut source);
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| {
            FlowError::pattern(format!("Cannot compile template '{}': {}", template, e))
        })?;

        Ok(PatternMatcher {
            template: template.to_string(),
            regex,
        })
    }

    /// The template this matcher was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether `name` matches the whole template.
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Keeps the names that match, preserving order.
    pub fn filter<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .filter(|name| self.is_match(name))
            .cloned()
            .collect()
    }
}

/// Escapes `text` so it is matched literally inside a template.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '<' | '>' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Template for version tags: `{prefix}<num>.<num>.<num>` plus the channel segment.
pub fn tag_template(prefix: &str, filter: &ChannelFilter) -> String {
    let base = format!("{}<num>.<num>.<num>", escape(prefix));
    match filter {
        ChannelFilter::Any => format!("{}[-<id>.<num>]", base),
        ChannelFilter::Release => base,
        ChannelFilter::Named(channel) => format!("{}-{}.<num>", base, escape(channel)),
    }
}

/// Template for release branches: `{release_prefix}{tag_prefix}<num>.<num>.<num>[-{channel}]`.
pub fn release_branch_template(
    release_prefix: &str,
    tag_prefix: &str,
    filter: &ChannelFilter,
) -> String {
    let base = format!(
        "{}{}<num>.<num>.<num>",
        escape(release_prefix),
        escape(tag_prefix)
    );
    match filter {
        ChannelFilter::Any => format!("{}[-<id>]", base),
        ChannelFilter::Release => base,
        ChannelFilter::Named(channel) => format!("{}-{}", base, escape(channel)),
    }
}

fn emit(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(&regex::escape(text)),
            Node::Number => out.push_str("[0-9]+"),
            Node::Identifier => out.push_str("[0-9A-Za-z-]+"),
            Node::Optional(inner) => {
                out.push_str("(?:");
                emit(inner, out);
                out.push_str(")?");
            }
        }
    }
}

struct Parser<'a> {
    template: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(template: &'a str) -> Self {
        Parser {
            template,
            chars: template.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<Vec<Node>> {
        self.sequence(0)
    }

    fn sequence(&mut self, depth: usize) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut literal = String::new();

        while let Some(&(_, c)) = self.chars.peek() {
            match c {
                ']' => {
                    if depth == 0 {
                        return Err(self.error("unexpected ']'"));
                    }
                    break;
                }
                '[' => {
                    self.chars.next();
                    flush(&mut literal, &mut nodes);
                    let inner = self.sequence(depth + 1)?;
                    match self.chars.next() {
                        Some((_, ']')) => nodes.push(Node::Optional(inner)),
                        _ => return Err(self.error("unclosed '['")),
                    }
                }
                '<' => {
                    self.chars.next();
                    flush(&mut literal, &mut nodes);
                    nodes.push(self.placeholder()?);
                }
                '\\' => {
                    self.chars.next();
                    match self.chars.next() {
                        Some((_, escaped)) => literal.push(escaped),
                        None => return Err(self.error("trailing '\\'")),
                    }
                }
                _ => {
                    self.chars.next();
                    literal.push(c);
                }
            }
        }

        flush(&mut literal, &mut nodes);
        Ok(nodes)
    }

    fn placeholder(&mut self) -> Result<Node> {
        let mut name = String::new();
        loop {
            match self.chars.next() {
                Some((_, '>')) => break,
                Some((_, c)) => name.push(c),
                None => return Err(self.error("unclosed '<'")),
            }
        }

        match name.as_str() {
            "num" => Ok(Node::Number),
            "id" => Ok(Node::Identifier),
            other => Err(self.error(&format!("unknown placeholder '<{}>'", other))),
        }
    }

    fn error(&self, reason: &str) -> FlowError {
        FlowError::pattern(format!("Invalid template '{}': {}", self.template, reason))
    }
}

fn flush(literal: &mut String, nodes: &mut Vec<Node>) {
    if !literal.is_empty() {
        nodes.push(Node::Literal(std::mem::take(literal)));
    }
}
