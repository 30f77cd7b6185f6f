//! Small text template language for index pages.
//!
//! Templates are parsed once, when the configuration is built, so syntax
//! errors and references to unknown variables stop the run before any
//! directory is touched. Rendering is then a straight tree walk.
//!
//! ## Syntax
//!
//! ```text
//! {{ title }}                      print a value (HTML-escaped)
//! {{ image.filename }}             print a field of a record
//! {% if dirs %} … {% else %} … {% endif %}
//! {% for row in rows %} … {% endfor %}
//! ```
//!
//! A trailing `:` inside a tag is ignored, so `{% if dirs: %}` and
//! `{%for row in dirs: %}` are accepted. A value is truthy when it is a
//! non-empty string, list, or record.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("line {line}: `{open}` is never closed")]
    Unterminated { line: usize, open: &'static str },
    #[error("line {line}: unknown tag `{tag}`")]
    UnknownTag { line: usize, tag: String },
    #[error("line {line}: `{tag}` has no matching opening tag")]
    UnexpectedTag { line: usize, tag: &'static str },
    #[error("line {line}: `{tag}` block is missing its end tag")]
    Unclosed { line: usize, tag: &'static str },
    #[error("line {line}: invalid expression `{expr}`")]
    InvalidExpression { line: usize, expr: String },
    #[error("line {line}: unknown variable `{name}`")]
    UnknownVariable { line: usize, name: String },
    #[error("line {line}: `{expr}` has no field `{field}`")]
    MissingField {
        line: usize,
        expr: String,
        field: String,
    },
    #[error("line {line}: `{expr}` is not a list")]
    NotIterable { line: usize, expr: String },
    #[error("line {line}: `{expr}` is not text")]
    NotPrintable { line: usize, expr: String },
}

/// A value a template can print, test, or iterate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    List(Vec<Value>),
    Record(BTreeMap<&'static str, Value>),
}

impl Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Text(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Record(fields) => !fields.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Top-level variables available to a render.
pub type Context = BTreeMap<&'static str, Value>;

#[derive(Debug, Clone, PartialEq)]
struct Expr {
    name: String,
    field: Option<String>,
    line: usize,
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}.{}", self.name, field),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Print(Expr),
    If {
        cond: Expr,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    For {
        var: String,
        iter: Expr,
        body: Vec<Node>,
    },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse `source`, allowing `globals` as top-level variable names.
    pub fn parse(source: &str, globals: &[&str]) -> Result<Self, TemplateError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens: tokens.into_iter(),
            globals,
            scope: Vec::new(),
        };
        let (nodes, end) = parser.parse_nodes()?;
        match end {
            End::Eof => Ok(Self { nodes }),
            End::Else(line) => Err(TemplateError::UnexpectedTag { line, tag: "else" }),
            End::EndIf(line) => Err(TemplateError::UnexpectedTag { line, tag: "endif" }),
            End::EndFor(line) => Err(TemplateError::UnexpectedTag {
                line,
                tag: "endfor",
            }),
        }
    }

    pub fn render(&self, context: &Context) -> Result<String, TemplateError> {
        let mut out = String::new();
        let mut scope = Vec::new();
        render_nodes(&self.nodes, context, &mut scope, &mut out)?;
        Ok(out)
    }
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Print(&'a str, usize),
    Tag(&'a str, usize),
}

const DELIMITERS: [(&str, &str); 2] = [("{{", "}}"), ("{%", "%}")];

fn line_at(source: &str, byte: usize) -> usize {
    source[..byte].matches('\n').count() + 1
}

fn tokenize(source: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    loop {
        let rest = &source[offset..];
        let next = DELIMITERS
            .iter()
            .filter_map(|&(open, close)| rest.find(open).map(|at| (at, open, close)))
            .min_by_key(|(at, _, _)| *at);

        let Some((at, open, close)) = next else {
            if !rest.is_empty() {
                tokens.push(Token::Text(rest));
            }
            return Ok(tokens);
        };

        if at > 0 {
            tokens.push(Token::Text(&rest[..at]));
        }
        let line = line_at(source, offset + at);
        let body_start = at + open.len();
        let body_len = rest[body_start..]
            .find(close)
            .ok_or(TemplateError::Unterminated { line, open })?;
        let body = rest[body_start..body_start + body_len].trim();

        tokens.push(if open == "{{" {
            Token::Print(body, line)
        } else {
            Token::Tag(body, line)
        });
        offset += body_start + body_len + close.len();
    }
}

// ============================================================================
// Parser
// ============================================================================

/// What stopped a `parse_nodes` call.
enum End {
    Eof,
    Else(usize),
    EndIf(usize),
    EndFor(usize),
}

struct Parser<'a, 'g> {
    tokens: std::vec::IntoIter<Token<'a>>,
    globals: &'g [&'g str],
    scope: Vec<String>,
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Error for a block that ended on the wrong tag (or not at all).
fn mismatched(end: End, tag: &'static str, open_line: usize) -> TemplateError {
    match end {
        End::Eof => TemplateError::Unclosed {
            line: open_line,
            tag,
        },
        End::Else(line) => TemplateError::UnexpectedTag { line, tag: "else" },
        End::EndIf(line) => TemplateError::UnexpectedTag { line, tag: "endif" },
        End::EndFor(line) => TemplateError::UnexpectedTag {
            line,
            tag: "endfor",
        },
    }
}

impl Parser<'_, '_> {
    fn expr(&self, text: &str, line: usize) -> Result<Expr, TemplateError> {
        let invalid = || TemplateError::InvalidExpression {
            line,
            expr: text.to_string(),
        };
        let (name, field) = match text.split_once('.') {
            Some((name, field)) => (name, Some(field)),
            None => (text, None),
        };
        if !is_identifier(name) || field.is_some_and(|f| !is_identifier(f)) {
            return Err(invalid());
        }
        let known =
            self.scope.iter().any(|s| s == name) || self.globals.iter().any(|g| *g == name);
        if !known {
            return Err(TemplateError::UnknownVariable {
                line,
                name: name.to_string(),
            });
        }
        Ok(Expr {
            name: name.to_string(),
            field: field.map(str::to_string),
            line,
        })
    }

    fn parse_nodes(&mut self) -> Result<(Vec<Node>, End), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            match token {
                Token::Text(text) => nodes.push(Node::Text(text.to_string())),
                Token::Print(body, line) => nodes.push(Node::Print(self.expr(body, line)?)),
                Token::Tag(body, line) => {
                    let body = body.strip_suffix(':').unwrap_or(body).trim_end();
                    let words: Vec<&str> = body.split_whitespace().collect();
                    match words.as_slice() {
                        ["if", cond] => {
                            let cond = self.expr(cond, line)?;
                            let (then, end) = self.parse_nodes()?;
                            let otherwise = match end {
                                End::EndIf(_) => Vec::new(),
                                End::Else(_) => match self.parse_nodes()? {
                                    (otherwise, End::EndIf(_)) => otherwise,
                                    (_, end) => return Err(mismatched(end, "if", line)),
                                },
                                end => return Err(mismatched(end, "if", line)),
                            };
                            nodes.push(Node::If {
                                cond,
                                then,
                                otherwise,
                            });
                        }
                        ["for", var, "in", iter] => {
                            if !is_identifier(var) {
                                return Err(TemplateError::InvalidExpression {
                                    line,
                                    expr: var.to_string(),
                                });
                            }
                            let iter = self.expr(iter, line)?;
                            self.scope.push(var.to_string());
                            let parsed = self.parse_nodes();
                            self.scope.pop();
                            match parsed? {
                                (body, End::EndFor(_)) => nodes.push(Node::For {
                                    var: var.to_string(),
                                    iter,
                                    body,
                                }),
                                (_, end) => return Err(mismatched(end, "for", line)),
                            }
                        }
                        ["else"] => return Ok((nodes, End::Else(line))),
                        ["endif"] => return Ok((nodes, End::EndIf(line))),
                        ["endfor"] => return Ok((nodes, End::EndFor(line))),
                        _ => {
                            return Err(TemplateError::UnknownTag {
                                line,
                                tag: body.to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok((nodes, End::Eof))
    }
}

// ============================================================================
// Renderer
// ============================================================================

fn lookup<'a>(
    expr: &Expr,
    context: &'a Context,
    scope: &[(&str, &'a Value)],
) -> Result<&'a Value, TemplateError> {
    let base = scope
        .iter()
        .rev()
        .find(|(name, _)| *name == expr.name)
        .map(|(_, value)| *value)
        .or_else(|| context.get(expr.name.as_str()))
        .ok_or_else(|| TemplateError::UnknownVariable {
            line: expr.line,
            name: expr.name.clone(),
        })?;

    let Some(field) = &expr.field else {
        return Ok(base);
    };
    let missing = || TemplateError::MissingField {
        line: expr.line,
        expr: expr.name.clone(),
        field: field.clone(),
    };
    match base {
        Value::Record(fields) => fields.get(field.as_str()).ok_or_else(missing),
        _ => Err(missing()),
    }
}

fn render_nodes<'a>(
    nodes: &'a [Node],
    context: &'a Context,
    scope: &mut Vec<(&'a str, &'a Value)>,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Print(expr) => match lookup(expr, context, scope)? {
                Value::Text(text) => out.push_str(&escape_html(text)),
                _ => {
                    return Err(TemplateError::NotPrintable {
                        line: expr.line,
                        expr: expr.to_string(),
                    });
                }
            },
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                let branch = if lookup(cond, context, scope)?.is_truthy() {
                    then
                } else {
                    otherwise
                };
                render_nodes(branch, context, scope, out)?;
            }
            Node::For { var, iter, body } => {
                let Value::List(items) = lookup(iter, context, scope)? else {
                    return Err(TemplateError::NotIterable {
                        line: iter.line,
                        expr: iter.to_string(),
                    });
                };
                for item in items {
                    scope.push((var.as_str(), item));
                    let rendered = render_nodes(body, context, scope, out);
                    scope.pop();
                    rendered?;
                }
            }
        }
    }
    Ok(())
}
