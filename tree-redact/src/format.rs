//! Post-processing of transform output.
//!
//! A format template wraps every replacement string, e.g.
//! `"{{strategy}}[{{value}}]"` turns a digest into `sha256[ba78…]`. Templates
//! are parsed once when the redactor is built.

use crate::error::FormatError;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value,
    Strategy,
    ShortStrategy,
}

/// A parsed format template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Format {
    segments: Vec<Segment>,
}

impl Format {
    /// Parses a template. It must contain `{{value}}`; the only other tokens
    /// recognised are `{{strategy}}` and `{{shortStrategy}}`.
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;
        let mut has_value = false;

        while let Some(open) = rest.find("{{") {
            literal.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or_else(|| FormatError::Unclosed {
                template: template.to_string(),
                offset: template.len() - rest.len() + open,
            })?;
            let token = &after_open[..close];
            let segment = match token.trim() {
                "value" => {
                    has_value = true;
                    Segment::Value
                }
                "strategy" => Segment::Strategy,
                "shortStrategy" => Segment::ShortStrategy,
                other => {
                    return Err(FormatError::UnknownToken {
                        template: template.to_string(),
                        token: other.to_string(),
                    })
                }
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
            rest = &after_open[close + 2..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        if !has_value {
            return Err(FormatError::MissingValueToken {
                template: template.to_string(),
            });
        }
        Ok(Self { segments })
    }

    /// Renders `value` through the template.
    pub fn render(&self, value: &str, strategy: &str, short_strategy: &str) -> String {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Value => output.push_str(value),
                Segment::Strategy => output.push_str(strategy),
                Segment::ShortStrategy => output.push_str(short_strategy),
            }
        }
        output
    }
}

impl std::str::FromStr for Format {
    type Err = FormatError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        Self::parse(template)
    }
}
