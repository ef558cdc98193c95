// src/credentials/path.rs
//! Field paths used by auth-provider `token-key` settings.
//!
//! Only plain nested lookups are supported: `{.credential.access_token}`,
//! `$.items[0].token`, `{.data['token']}`. Quoted bracket keys may contain
//! dots (`{.data['a.b']}`). Filters, wildcards and recursive descent are
//! rejected at parse time.

use serde_json::Value;
use std::fmt;

use crate::error::{KubeConfigError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parses a `token-key` expression. The surrounding `{` `}` and a leading
    /// `$` root selector are optional.
    pub fn parse(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(trimmed)
            .trim();
        let inner = inner.strip_prefix('$').unwrap_or(inner);
        let inner = inner.strip_prefix('.').unwrap_or(inner);

        let mut segments = Vec::new();
        let mut rest = inner;
        let mut first = true;
        while !rest.is_empty() {
            if let Some(open) = rest.strip_prefix('[') {
                let (content, after) = split_bracket(open).ok_or_else(|| unsupported(expr))?;
                segments.push(bracket_segment(content).ok_or_else(|| unsupported(expr))?);
                rest = after;
            } else {
                let body = if first {
                    rest
                } else {
                    rest.strip_prefix('.').ok_or_else(|| unsupported(expr))?
                };
                let end = body.find(['.', '[']).unwrap_or(body.len());
                let field = &body[..end];
                if field.is_empty() || field.contains(['*', '?', '(', ')', ']', '\'', '"']) {
                    return Err(unsupported(expr));
                }
                segments.push(Segment::Field(field.to_string()));
                rest = &body[end..];
            }
            first = false;
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn evaluate<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |value, segment| match segment {
                Segment::Field(name) => value.as_object()?.get(name),
                Segment::Index(i) => value.as_array()?.get(*i),
            })
    }

    /// Evaluates the path and renders the result as a token string.
    pub fn extract_string(&self, root: &Value) -> Result<String> {
        match self.evaluate(root) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(Value::Null) | None => Err(KubeConfigError::malformed(format!(
                "path {} matched no value",
                self
            ))),
            Some(_) => Err(KubeConfigError::malformed(format!(
                "path {} matched a non-scalar value",
                self
            ))),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) if name.contains(['.', '[', ']']) => write!(f, "['{}']", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// Splits `'a.b']rest` into the bracket content and what follows `]`.
/// A quoted key may contain `.` and `]`.
fn split_bracket(open: &str) -> Option<(&str, &str)> {
    let close = match open.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let end = open[1..].find(quote)? + 1;
            end + open[end..].find(']')?
        }
        _ => open.find(']')?,
    };
    Some((&open[..close], &open[close + 1..]))
}

fn bracket_segment(content: &str) -> Option<Segment> {
    let content = content.trim();
    if let Ok(index) = content.parse::<usize>() {
        return Some(Segment::Index(index));
    }
    let quoted = content
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| content.strip_prefix('"').and_then(|s| s.strip_suffix('"')))?;
    Some(Segment::Field(quoted.to_string()))
}

fn unsupported(expr: &str) -> KubeConfigError {
    KubeConfigError::malformed(format!("unsupported token-key expression {:?}", expr))
}
