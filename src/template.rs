// src/template.rs

//! Command templates.
//!
//! A template is literal text with `{{ ... }}` actions. Supported actions:
//!
//! | action                  | expands to                              |
//! |-------------------------|-----------------------------------------|
//! | `{{.Arg}}`              | first field of the record               |
//! | `{{.Args}}`             | all fields, rendered as `[a b c]`       |
//! | `{{index .Args N}}`     | field `N` (0-based)                     |
//! | `{{join .Args "SEP"}}`  | all fields joined with `SEP`            |
//!
//! Templates are parsed once ([`CommandTemplate::parse`]); anything that is
//! not one of the actions above is a syntax error at that point, except a
//! reference to some other field such as `{{.Host}}`. Records have no such
//! field, so that one fails when a record is bound, the same way an `index`
//! past the end of the record does.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static INDEX_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^index\s+\.Args\s+(\d+)$").expect("valid index regex")
});

static FIELD_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").expect("valid field regex")
});

static JOIN_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^join\s+\.Args\s+"((?:[^"\\]|\\.)*)"$"#).expect("valid join regex")
});

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("{0}")]
    Binding(String),
}

/// Values a record binds into a template.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    /// `.Args`
    pub args: &'a [String],
    /// `.Arg`
    pub arg: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Arg,
    Args,
    Index(usize),
    Join(String),
    /// A field records do not have.
    Field(String),
}

/// A parsed command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut pos = 0;

        while let Some(rel) = source[pos..].find(OPEN) {
            let open_at = pos + rel;
            if open_at > pos {
                segments.push(Segment::Literal(source[pos..open_at].to_string()));
            }

            let body_start = open_at + OPEN.len();
            let body_len =
                find_close(&source[body_start..]).ok_or_else(|| TemplateError::Syntax {
                    offset: open_at,
                    message: "unclosed action".to_string(),
                })?;

            let body = &source[body_start..body_start + body_len];
            segments.push(parse_action(body.trim(), open_at)?);
            pos = body_start + body_len + CLOSE.len();
        }

        if pos < source.len() {
            segments.push(Segment::Literal(source[pos..].to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text this was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, bindings: Bindings<'_>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Arg => out.push_str(bindings.arg),
                Segment::Args => {
                    out.push('[');
                    out.push_str(&bindings.args.join(" "));
                    out.push(']');
                }
                Segment::Index(i) => {
                    let field = bindings.args.get(*i).ok_or_else(|| {
                        TemplateError::Binding(format!(
                            "index {i} out of range: record has {} field(s)",
                            bindings.args.len()
                        ))
                    })?;
                    out.push_str(field);
                }
                Segment::Join(sep) => out.push_str(&bindings.args.join(sep)),
                Segment::Field(name) => {
                    return Err(TemplateError::Binding(format!(
                        "can't evaluate field {name} (records have .Arg and .Args)"
                    )));
                }
            }
        }
        Ok(out)
    }
}

fn parse_action(action: &str, offset: usize) -> Result<Segment, TemplateError> {
    let syntax = |message: String| TemplateError::Syntax { offset, message };

    match action {
        "" => return Err(syntax("empty action".to_string())),
        ".Arg" => return Ok(Segment::Arg),
        ".Args" => return Ok(Segment::Args),
        _ => {}
    }

    if let Some(caps) = INDEX_ACTION.captures(action) {
        let index = caps[1]
            .parse::<usize>()
            .map_err(|e| syntax(format!("invalid index {:?}: {e}", &caps[1])))?;
        return Ok(Segment::Index(index));
    }

    if let Some(caps) = JOIN_ACTION.captures(action) {
        return Ok(Segment::Join(unescape(&caps[1])));
    }

    if let Some(caps) = FIELD_ACTION.captures(action) {
        return Ok(Segment::Field(caps[1].to_string()));
    }

    Err(syntax(format!("unsupported action {action:?}")))
}

/// Offset of the `}}` ending an action body, skipping over quoted strings.
fn find_close(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut in_quote = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quote => i += 1,
            b'"' => in_quote = !in_quote,
            _ if !in_quote && bytes[i..].starts_with(CLOSE.as_bytes()) => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
