//! Object templates and shape matching.
//!
//! A template declares an exact key set and one rule per key. When a runtime
//! object has exactly that key set, the template's rules replace generic
//! key-pattern matching for the object's fields.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::{
    error::{ConfigurationError, TemplateCollision},
    node::{Node, Object},
};

/// Per-field redaction level, ordered from least to most aggressive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    /// Leave the whole subtree untouched.
    Ignore,
    /// Leave the value itself alone but keep key-based matching below it.
    Pass,
    /// Redact primitives; walk containers with key-based matching.
    Shallow,
    /// Redact the value and every descendant.
    Deep,
    /// Stringify the whole value and redact it as one unit.
    Full,
}

/// Rule attached to one template field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Match(MatchKind),
    /// Two-state form: `true` redacts like [`MatchKind::Deep`], `false`
    /// passes like [`MatchKind::Pass`].
    Flag(bool),
    Nested(Template),
    /// Redact this field when the *value* of the named sibling field is a
    /// secret key name.
    Reference(String),
}

impl From<MatchKind> for Rule {
    fn from(kind: MatchKind) -> Self {
        Rule::Match(kind)
    }
}

impl From<bool> for Rule {
    fn from(flag: bool) -> Self {
        Rule::Flag(flag)
    }
}

impl From<Template> for Rule {
    fn from(template: Template) -> Self {
        Rule::Nested(template)
    }
}

/// A declared object shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Template {
    fields: IndexMap<String, Rule>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field rule, replacing any previous rule for the same key.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.fields.insert(key.into(), rule.into());
        self
    }

    /// Adds a field redacted according to the value of `target`.
    #[must_use]
    pub fn reference(self, key: impl Into<String>, target: impl Into<String>) -> Self {
        self.field(key, Rule::Reference(target.into()))
    }

    pub fn rule(&self, key: &str) -> Option<&Rule> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.fields.iter().map(|(key, rule)| (key.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn key_set(&self) -> BTreeSet<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Bidirectional key-set equality, recursing into nested templates.
    ///
    /// Arrays under a nested rule are accepted without looking at their
    /// elements.
    pub fn matches(&self, object: &Object) -> bool {
        if object.len() != self.fields.len() {
            return false;
        }
        object.iter().all(|(key, value)| match self.fields.get(key) {
            None => false,
            Some(Rule::Nested(nested)) => match value {
                Node::Object(inner) => nested.matches(inner),
                Node::Array(_) => true,
                _ => false,
            },
            Some(_) => true,
        })
    }

    fn check_references(&self, index: usize) -> Result<(), ConfigurationError> {
        for (key, rule) in &self.fields {
            match rule {
                Rule::Reference(target) if !self.fields.contains_key(target) => {
                    return Err(ConfigurationError::DanglingReference {
                        template: index,
                        field: key.clone(),
                        target: target.clone(),
                    });
                }
                Rule::Nested(nested) => nested.check_references(index)?,
                Rule::Reference(_) | Rule::Match(_) | Rule::Flag(_) => {}
            }
        }
        Ok(())
    }
}

/// Types that describe a template shape, usually through
/// `#[derive(Template)]`.
pub trait TemplateShape {
    fn template() -> Template;
}

impl<T: TemplateShape> TemplateShape for Option<T> {
    fn template() -> Template {
        T::template()
    }
}

impl<T: TemplateShape> TemplateShape for Box<T> {
    fn template() -> Template {
        T::template()
    }
}

/// The configured template set. Validated once, immutable afterwards.
#[derive(Clone, Debug, Default)]
pub struct ShapeMatcher {
    templates: Vec<Template>,
}

impl ShapeMatcher {
    /// Validates and stores `templates`, keeping their order.
    ///
    /// Fails when two templates declare identical key sets or when a
    /// reference names a field missing from its template.
    pub fn new(templates: Vec<Template>) -> Result<Self, ConfigurationError> {
        let mut collisions = Vec::new();
        for (first, left) in templates.iter().enumerate() {
            let left_keys = left.key_set();
            for (offset, right) in templates[first + 1..].iter().enumerate() {
                if left_keys == right.key_set() {
                    collisions.push(TemplateCollision {
                        first,
                        second: first + 1 + offset,
                        keys: left_keys.iter().map(|key| (*key).to_string()).collect(),
                    });
                }
            }
        }
        if !collisions.is_empty() {
            return Err(ConfigurationError::AmbiguousTemplates { collisions });
        }
        for (index, template) in templates.iter().enumerate() {
            template.check_references(index)?;
        }
        Ok(Self { templates })
    }

    /// First template, in configuration order, whose shape matches `object`.
    pub fn matching(&self, object: &Object) -> Option<&Template> {
        self.templates.iter().find(|template| template.matches(object))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
