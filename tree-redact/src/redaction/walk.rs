//! The tree walker.
//!
//! The walker decides the disposition of every node and hands nodes that must
//! be redacted to a [`Sink`]. The blocking sink rewrites them immediately;
//! the deferred sink records `(path, input)` pairs so an async caller can run
//! all transforms concurrently and write the results back afterwards. Either
//! way the decision logic lives here once.

use std::fmt;

use tracing::trace;

use super::{
    matcher::PatternMatcher,
    template::{MatchKind, Rule, ShapeMatcher, Template},
};
use crate::{
    error::{Error, Result},
    format::Format,
    node::{iso_8601, Node, Object},
    transform::Transformer,
};

/// Which special value kinds may be redacted at all.
///
/// A disabled kind is returned untouched even under a secret key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValuePolicy {
    pub booleans: bool,
    pub dates: bool,
    pub functions: bool,
    pub null_or_undefined: bool,
}

impl Default for ValuePolicy {
    fn default() -> Self {
        Self {
            booleans: true,
            dates: true,
            functions: true,
            null_or_undefined: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a node relative to the document root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Path(Vec<PathSegment>);

impl Path {
    fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }

    /// Follows the path from `root`. `None` if the tree changed shape.
    pub(crate) fn locate_mut<'a>(&self, root: &'a mut Node) -> Option<&'a mut Node> {
        self.0.iter().try_fold(root, |node, segment| match (node, segment) {
            (Node::Object(object), PathSegment::Key(key)) => object.get_mut(key),
            (Node::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
            _ => None,
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Receives nodes the walker decided to redact.
pub(crate) trait Sink {
    /// `input` is what the transform sees; `slot` is where the result goes.
    fn emit(&mut self, path: &Path, slot: &mut Node, input: Node) -> Result<()>;
}

/// Runs the transform immediately and rewrites the slot.
pub(crate) struct BlockingSink<'r> {
    pub(crate) transformer: &'r Transformer,
    pub(crate) format: Option<&'r Format>,
}

impl Sink for BlockingSink<'_> {
    fn emit(&mut self, _path: &Path, slot: &mut Node, input: Node) -> Result<()> {
        let output = self
            .transformer
            .apply_blocking(&input)
            .map_err(Error::Transform)?;
        *slot = Node::String(render(self.transformer, self.format, output));
        Ok(())
    }
}

/// Records pending transforms for a later concurrent pass.
#[derive(Default)]
pub(crate) struct DeferredSink {
    pub(crate) pending: Vec<(Path, Node)>,
}

impl Sink for DeferredSink {
    fn emit(&mut self, path: &Path, _slot: &mut Node, input: Node) -> Result<()> {
        self.pending.push((path.clone(), input));
        Ok(())
    }
}

/// Applies the optional format hook to one transform output.
pub(crate) fn render(transformer: &Transformer, format: Option<&Format>, output: String) -> String {
    match format {
        Some(format) => format.render(&output, transformer.name(), transformer.short_name()),
        None => output,
    }
}

pub(crate) struct Walker<'r, S> {
    patterns: &'r PatternMatcher,
    shapes: &'r ShapeMatcher,
    values: ValuePolicy,
    shallow_array_recursion: bool,
    sink: S,
    path: Path,
}

impl<'r, S: Sink> Walker<'r, S> {
    pub(crate) fn new(
        patterns: &'r PatternMatcher,
        shapes: &'r ShapeMatcher,
        values: ValuePolicy,
        shallow_array_recursion: bool,
        sink: S,
    ) -> Self {
        Self {
            patterns,
            shapes,
            values,
            shallow_array_recursion,
            sink,
            path: Path::default(),
        }
    }

    pub(crate) fn into_sink(self) -> S {
        self.sink
    }

    /// Visits `node`, reached through `key` (`None` at the root or when a
    /// template forces redaction) with the inherited `secret` flag.
    pub(crate) fn walk(&mut self, node: &mut Node, key: Option<&str>, secret: bool) -> Result<()> {
        match node {
            Node::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    self.path.push(PathSegment::Index(index));
                    let result = self.walk(item, key, secret);
                    self.path.pop();
                    result?;
                }
                Ok(())
            }
            Node::Object(object) => self.walk_object(object, secret),
            Node::Null | Node::Undefined => {
                self.leaf(node, key, secret, self.values.null_or_undefined)
            }
            Node::Bool(_) => self.leaf(node, key, secret, self.values.booleans),
            Node::Function(_) => self.leaf(node, key, secret, self.values.functions),
            Node::Date(_) => self.leaf(node, key, secret, self.values.dates),
            Node::String(_) | Node::Number(_) => self.leaf(node, key, secret, true),
        }
    }

    fn leaf(&mut self, node: &mut Node, key: Option<&str>, secret: bool, kind_enabled: bool) -> Result<()> {
        if !kind_enabled || !self.patterns.should_redact(key, secret) {
            return Ok(());
        }
        let input = match &*node {
            Node::Date(date) => Node::String(iso_8601(date)),
            other => other.clone(),
        };
        self.emit(node, input)
    }

    fn emit(&mut self, slot: &mut Node, input: Node) -> Result<()> {
        trace!(path = %self.path, kind = slot.kind(), "redacting value");
        self.sink.emit(&self.path, slot, input)
    }

    fn walk_object(&mut self, object: &mut Object, secret: bool) -> Result<()> {
        let shapes = self.shapes;
        if let Some(template) = shapes.matching(object) {
            trace!(path = %self.path, fields = template.len(), "template matched");
            return self.apply_template(object, template, secret);
        }

        let patterns = self.patterns;
        object.retain(|key, _| {
            let delete = patterns.is_delete_key(key);
            if delete {
                trace!(key = %key, "deleting field");
            }
            !delete
        });

        for (key, value) in object.iter_mut() {
            self.path.push(PathSegment::Key(key.clone()));
            // An ignored key's own leaves are exempt through `should_redact`;
            // anything nested below keeps the inherited flag.
            let result = if patterns.is_ignored(key) {
                self.walk(value, Some(key.as_str()), secret)
            } else if patterns.is_full_redaction_key(key) {
                self.full(value)
            } else {
                let child_secret = secret || patterns.is_deep_secret_key(key);
                self.walk(value, Some(key.as_str()), child_secret)
            };
            self.path.pop();
            result?;
        }
        Ok(())
    }

    /// Redacts a whole value as one unit: the transform always receives the
    /// stringified value, primitives included, and value policies do not apply.
    fn full(&mut self, value: &mut Node) -> Result<()> {
        let input = Node::String(value.to_json_string());
        self.emit(value, input)
    }

    fn apply_template(&mut self, object: &mut Object, template: &Template, secret: bool) -> Result<()> {
        // Decided against the original values; a referenced field may itself
        // be rewritten below.
        let reference_hits: Vec<bool> = object
            .keys()
            .map(|key| match template.rule(key) {
                Some(Rule::Reference(target)) => object
                    .get(target)
                    .is_some_and(|value| self.is_secret_value(value)),
                _ => false,
            })
            .collect();

        for ((key, value), reference_hit) in object.iter_mut().zip(reference_hits) {
            let Some(rule) = template.rule(key) else {
                continue;
            };
            self.path.push(PathSegment::Key(key.clone()));
            let result = self.apply_rule(value, rule, secret, reference_hit);
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn is_secret_value(&self, value: &Node) -> bool {
        match value {
            Node::String(text) => self.patterns.is_secret_key(Some(text)),
            Node::Number(number) => self.patterns.is_secret_key(Some(&number.to_string())),
            _ => false,
        }
    }

    fn apply_rule(
        &mut self,
        value: &mut Node,
        rule: &Rule,
        secret: bool,
        reference_hit: bool,
    ) -> Result<()> {
        match rule {
            Rule::Match(MatchKind::Ignore) => Ok(()),
            Rule::Match(MatchKind::Pass) | Rule::Flag(false) => self.pass(value, secret),
            Rule::Reference(_) if reference_hit => self.walk(value, None, true),
            Rule::Reference(_) => self.pass(value, secret),
            Rule::Match(MatchKind::Shallow) => self.shallow(value, secret),
            Rule::Match(MatchKind::Deep) | Rule::Flag(true) => self.walk(value, None, true),
            Rule::Match(MatchKind::Full) => self.full(value),
            Rule::Nested(nested) => self.nested(value, nested, secret),
        }
    }

    /// Leaves the value itself alone; containers still get key-based matching.
    fn pass(&mut self, value: &mut Node, secret: bool) -> Result<()> {
        if secret {
            return self.walk(value, None, true);
        }
        match value {
            Node::Object(object) => self.walk_object(object, false),
            Node::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    self.path.push(PathSegment::Index(index));
                    let result = self.pass(item, false);
                    self.path.pop();
                    result?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Redacts primitives; objects are walked generically with the inherited
    /// `secret` flag, so a deep-secret ancestor still covers them.
    fn shallow(&mut self, value: &mut Node, secret: bool) -> Result<()> {
        match value {
            Node::Object(object) => self.walk_object(object, secret),
            Node::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    self.path.push(PathSegment::Index(index));
                    let result = if !item.is_container() {
                        self.walk(item, None, true)
                    } else if self.shallow_array_recursion {
                        self.shallow(item, secret)
                    } else if secret {
                        self.walk(item, None, true)
                    } else {
                        Ok(())
                    };
                    self.path.pop();
                    result?;
                }
                Ok(())
            }
            _ => self.walk(value, None, true),
        }
    }

    /// Array elements that do not fit `template` are handled like `Pass`.
    fn nested(&mut self, value: &mut Node, template: &Template, secret: bool) -> Result<()> {
        match value {
            Node::Object(object) => self.apply_template(object, template, secret),
            Node::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    self.path.push(PathSegment::Index(index));
                    let result = match item {
                        Node::Object(object) if template.matches(object) => {
                            self.apply_template(object, template, secret)
                        }
                        _ => self.pass(item, secret),
                    };
                    self.path.pop();
                    result?;
                }
                Ok(())
            }
            other if secret => self.walk(other, None, true),
            _ => Ok(()),
        }
    }
}
