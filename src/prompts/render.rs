//! Named placeholder substitution for prompt templates
//!
//! Templates use `{name}` placeholders. `{{` and `}}` produce literal braces,
//! which is how judge prompts spell out the JSON shape they expect back.
//! Templates are parsed once when the library loads, so rendering only has to
//! check that every placeholder has a value.

use std::collections::{BTreeSet, HashMap};

use crate::error::{PipelineError, PipelineResult};

/// Anything that can supply values for template placeholders
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<String>;
}

impl FieldSource for [(&str, &str)] {
    fn field(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed format string
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a format string. `name` is only used in error messages.
    pub fn parse(name: impl Into<String>, source: &str) -> PipelineResult<Self> {
        let name = name.into();
        let segments = parse_segments(source)
            .map_err(|reason| PipelineError::config(format!("template '{}': {}", name, reason)))?;
        Ok(Self { name, segments })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names this template needs at render time
    pub fn placeholders(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Field(f) => Some(f.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Substitute every placeholder from `fields`.
    ///
    /// Fails with [`PipelineError::MissingField`] listing every absent field;
    /// nothing is rendered unless all of them are present.
    pub fn render<F: FieldSource + ?Sized>(&self, fields: &F) -> PipelineResult<String> {
        let mut values = HashMap::new();
        let mut missing = BTreeSet::new();
        for field in self.placeholders() {
            match fields.field(field) {
                Some(value) => {
                    values.insert(field, value);
                }
                None => {
                    missing.insert(field.to_string());
                }
            }
        }

        if !missing.is_empty() {
            return Err(PipelineError::MissingField {
                template: self.name.clone(),
                fields: missing.into_iter().collect(),
            });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                // Presence checked above
                Segment::Field(f) => out.push_str(values.get(f.as_str()).map_or("", String::as_str)),
            }
        }
        Ok(out)
    }
}

/// Render `template` with `fields`
pub fn render<F: FieldSource + ?Sized>(template: &Template, fields: &F) -> PipelineResult<String> {
    template.render(fields)
}

fn parse_segments(source: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    literal.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == '}' {
                        closed = true;
                        break;
                    }
                    name.push(ch);
                }
                if !closed {
                    return Err(format!("unclosed '{{' at byte {}", pos));
                }
                if !is_field_name(&name) {
                    return Err(format!(
                        "invalid placeholder '{{{}}}' at byte {} (use '{{{{' for a literal brace)",
                        name, pos
                    ));
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(name));
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(format!("single '}}' at byte {}", pos));
                }
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
