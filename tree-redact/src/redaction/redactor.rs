//! Public entry points: configuration, builder and the [`Redactor`] facade.

use futures::future::try_join_all;
use tracing::debug;

use super::{
    matcher::{KeyPattern, KeyRules, PatternMatcher},
    template::{ShapeMatcher, Template, TemplateShape},
    walk::{render, BlockingSink, DeferredSink, Sink, ValuePolicy, Walker},
};
use crate::{
    error::{Error, Result, ValidationError},
    format::Format,
    node::Node,
    strategy::{Strategy, REDACTED_PLACEHOLDER},
    transform::Transformer,
};

/// Static redactor configuration. Every field is optional.
///
/// Unset pattern lists follow the category defaults: unset `secret_keys`
/// treats every key as secret, every other unset list matches nothing.
#[derive(Clone, Debug)]
pub struct RedactorConfig {
    pub secret_keys: Option<Vec<KeyPattern>>,
    pub deep_secret_keys: Option<Vec<KeyPattern>>,
    pub full_secret_keys: Option<Vec<KeyPattern>>,
    pub ignored_keys: Option<Vec<KeyPattern>>,
    pub delete_secret_keys: Option<Vec<KeyPattern>>,
    pub templates: Vec<Template>,
    pub values: ValuePolicy,
    /// Text used by the default transform.
    pub replacement_text: String,
    /// Defaults to [`Strategy::Replace`] with `replacement_text`.
    pub transform: Option<Transformer>,
    /// Format-hook template, e.g. `"{{strategy}}[{{value}}]"`.
    pub format: Option<String>,
    /// Whether containers inside arrays under a `Shallow` template field are
    /// walked (`true`) or left as they are (`false`).
    pub shallow_array_recursion: bool,
}

impl Default for RedactorConfig {
    fn default() -> Self {
        Self {
            secret_keys: None,
            deep_secret_keys: None,
            full_secret_keys: None,
            ignored_keys: None,
            delete_secret_keys: None,
            templates: Vec::new(),
            values: ValuePolicy::default(),
            replacement_text: REDACTED_PLACEHOLDER.to_string(),
            transform: None,
            format: None,
            shallow_array_recursion: true,
        }
    }
}

/// Fluent construction of a [`Redactor`].
///
/// ```rust
/// use tree_redact::{Node, Redactor};
/// use serde_json::json;
///
/// let redactor = Redactor::builder()
///     .secret_keys(["password"])
///     .build()
///     .unwrap();
/// let output = redactor
///     .redact(&Node::from(json!({"password": "p1", "user": "joe"})))
///     .unwrap();
/// assert_eq!(serde_json::Value::from(output), json!({"password": "REDACTED", "user": "joe"}));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RedactorBuilder {
    config: RedactorConfig,
}

fn collect<I>(patterns: I) -> Option<Vec<KeyPattern>>
where
    I: IntoIterator,
    I::Item: Into<KeyPattern>,
{
    Some(patterns.into_iter().map(Into::into).collect())
}

impl RedactorBuilder {
    #[must_use]
    pub fn secret_keys<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<KeyPattern>,
    {
        self.config.secret_keys = collect(patterns);
        self
    }

    #[must_use]
    pub fn deep_secret_keys<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<KeyPattern>,
    {
        self.config.deep_secret_keys = collect(patterns);
        self
    }

    #[must_use]
    pub fn full_secret_keys<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<KeyPattern>,
    {
        self.config.full_secret_keys = collect(patterns);
        self
    }

    #[must_use]
    pub fn ignored_keys<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<KeyPattern>,
    {
        self.config.ignored_keys = collect(patterns);
        self
    }

    #[must_use]
    pub fn delete_secret_keys<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<KeyPattern>,
    {
        self.config.delete_secret_keys = collect(patterns);
        self
    }

    /// Appends a template. Order matters: the first matching template wins.
    #[must_use]
    pub fn template(mut self, template: Template) -> Self {
        self.config.templates.push(template);
        self
    }

    /// Appends the template declared by `T`.
    #[must_use]
    pub fn template_for<T: TemplateShape>(self) -> Self {
        self.template(T::template())
    }

    #[must_use]
    pub fn values(mut self, values: ValuePolicy) -> Self {
        self.config.values = values;
        self
    }

    #[must_use]
    pub fn ignore_booleans(mut self, ignore: bool) -> Self {
        self.config.values.booleans = !ignore;
        self
    }

    #[must_use]
    pub fn ignore_dates(mut self, ignore: bool) -> Self {
        self.config.values.dates = !ignore;
        self
    }

    #[must_use]
    pub fn ignore_functions(mut self, ignore: bool) -> Self {
        self.config.values.functions = !ignore;
        self
    }

    #[must_use]
    pub fn redact_null_or_undefined(mut self, redact: bool) -> Self {
        self.config.values.null_or_undefined = redact;
        self
    }

    #[must_use]
    pub fn replacement_text(mut self, text: impl Into<String>) -> Self {
        self.config.replacement_text = text.into();
        self
    }

    #[must_use]
    pub fn transform(mut self, transform: impl Into<Transformer>) -> Self {
        self.config.transform = Some(transform.into());
        self
    }

    #[must_use]
    pub fn format(mut self, template: impl Into<String>) -> Self {
        self.config.format = Some(template.into());
        self
    }

    #[must_use]
    pub fn shallow_array_recursion(mut self, enabled: bool) -> Self {
        self.config.shallow_array_recursion = enabled;
        self
    }

    /// Validates the configuration and builds the redactor.
    pub fn build(self) -> Result<Redactor> {
        Redactor::new(self.config)
    }
}

/// Redacts node trees according to a validated configuration.
///
/// A `Redactor` holds no per-call state; share it freely across threads.
#[derive(Clone, Debug)]
pub struct Redactor {
    patterns: PatternMatcher,
    shapes: ShapeMatcher,
    values: ValuePolicy,
    transformer: Transformer,
    format: Option<Format>,
    shallow_array_recursion: bool,
}

impl Redactor {
    /// Validates `config`. Bad patterns, ambiguous templates and bad format
    /// templates are reported here, never while redacting.
    pub fn new(config: RedactorConfig) -> Result<Self> {
        let RedactorConfig {
            secret_keys,
            deep_secret_keys,
            full_secret_keys,
            ignored_keys,
            delete_secret_keys,
            templates,
            values,
            replacement_text,
            transform,
            format,
            shallow_array_recursion,
        } = config;

        let patterns = PatternMatcher::new(KeyRules {
            secret_keys,
            deep_secret_keys,
            full_secret_keys,
            ignored_keys,
            delete_secret_keys,
        })?;
        let shapes = ShapeMatcher::new(templates)?;
        let format = format.as_deref().map(Format::parse).transpose()?;
        let transformer =
            transform.unwrap_or_else(|| Transformer::Builtin(Strategy::replace(replacement_text)));

        debug!(
            patterns = patterns.pattern_count(),
            templates = shapes.len(),
            strategy = transformer.name(),
            formatted = format.is_some(),
            "redactor configured"
        );

        Ok(Self {
            patterns,
            shapes,
            values,
            transformer,
            format,
            shallow_array_recursion,
        })
    }

    pub fn builder() -> RedactorBuilder {
        RedactorBuilder::default()
    }

    pub fn patterns(&self) -> &PatternMatcher {
        &self.patterns
    }

    pub fn shapes(&self) -> &ShapeMatcher {
        &self.shapes
    }

    /// Returns a redacted copy of `value`. `value` itself is never modified.
    ///
    /// Fails with [`ValidationError::UnsupportedRoot`] unless `value` is an
    /// object or an array. An async transform is driven to completion on the
    /// calling thread; prefer [`Redactor::redact_async`] for those.
    pub fn redact(&self, value: &Node) -> Result<Node> {
        validate_root(value)?;
        let mut copy = value.clone();
        self.walk_blocking(&mut copy)?;
        Ok(copy)
    }

    /// Redacts `value` in place.
    ///
    /// If the transform fails part-way, `value` may be partially redacted.
    pub fn redact_in_place(&self, value: &mut Node) -> Result<()> {
        validate_root(value)?;
        self.walk_blocking(value)
    }

    /// Async variant of [`Redactor::redact`]. All transforms of the call are
    /// awaited concurrently; each result lands at its original position.
    pub async fn redact_async(&self, value: &Node) -> Result<Node> {
        validate_root(value)?;
        let mut copy = value.clone();
        self.walk_deferred(&mut copy).await?;
        Ok(copy)
    }

    /// Async variant of [`Redactor::redact_in_place`].
    ///
    /// Unlike the blocking variant, a failing transform leaves every value
    /// position untouched: results are only written once every transform
    /// succeeded. Fields matching `delete_secret_keys` are removed either way.
    pub async fn redact_in_place_async(&self, value: &mut Node) -> Result<()> {
        validate_root(value)?;
        self.walk_deferred(value).await
    }

    /// Convenience wrapper for `serde_json` payloads.
    pub fn redact_json(&self, value: &serde_json::Value) -> Result<serde_json::Value> {
        let mut node = Node::from(value.clone());
        self.redact_in_place(&mut node)?;
        Ok(node.into())
    }

    fn walker<S: Sink>(&self, sink: S) -> Walker<'_, S> {
        Walker::new(
            &self.patterns,
            &self.shapes,
            self.values,
            self.shallow_array_recursion,
            sink,
        )
    }

    fn walk_blocking(&self, root: &mut Node) -> Result<()> {
        let sink = BlockingSink {
            transformer: &self.transformer,
            format: self.format.as_ref(),
        };
        self.walker(sink).walk(root, None, false)
    }

    async fn walk_deferred(&self, root: &mut Node) -> Result<()> {
        let mut walker = self.walker(DeferredSink::default());
        walker.walk(root, None, false)?;
        let pending = walker.into_sink().pending;
        debug!(pending = pending.len(), "awaiting transforms");

        let outputs = try_join_all(
            pending
                .iter()
                .map(|(_, input)| self.transformer.apply(input)),
        )
        .await
        .map_err(Error::Transform)?;

        for ((path, _), output) in pending.iter().zip(outputs) {
            let rendered = render(&self.transformer, self.format.as_ref(), output);
            if let Some(slot) = path.locate_mut(root) {
                *slot = Node::String(rendered);
            }
        }
        Ok(())
    }
}

fn validate_root(value: &Node) -> Result<(), ValidationError> {
    if value.is_container() {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedRoot { kind: value.kind() })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{BoxError, ConfigurationError, FormatError};

    #[test]
    fn default_config_redacts_every_primitive() {
        let redactor = Redactor::new(RedactorConfig::default()).unwrap();
        let output = redactor
            .redact_json(&json!({"a": 1, "b": ["x", {"c": "y"}], "d": null}))
            .unwrap();
        assert_eq!(
            output,
            json!({"a": "REDACTED", "b": ["REDACTED", {"c": "REDACTED"}], "d": null})
        );
    }

    #[test]
    fn redactor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Redactor>();
    }

    #[test]
    fn scalar_roots_are_rejected_before_traversal() {
        let redactor = Redactor::builder().build().unwrap();
        let err = redactor.redact(&Node::from("plain")).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::UnsupportedRoot { kind: "string" })
        ));
        let mut date = Node::Date(chrono::Utc::now());
        assert!(redactor.redact_in_place(&mut date).is_err());
    }

    #[test]
    fn bad_format_fails_at_build() {
        let err = Redactor::builder().format("[{{strategy}}]").build().unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::MissingValueToken { .. })));
    }

    #[test]
    fn bad_pattern_fails_at_build() {
        let err = Redactor::builder().secret_keys(["[a-"]).build().unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn replacement_text_drives_default_transform() {
        let redactor = Redactor::builder()
            .secret_keys(["^pin$"])
            .replacement_text("***")
            .build()
            .unwrap();
        let output = redactor.redact_json(&json!({"pin": 1234})).unwrap();
        assert_eq!(output, json!({"pin": "***"}));
    }

    #[test]
    fn format_wraps_strategy_output() {
        let redactor = Redactor::builder()
            .secret_keys(["card"])
            .transform(Strategy::keep_last(4))
            .format("{{strategy}}({{value}})")
            .build()
            .unwrap();
        let output = redactor.redact_json(&json!({"card": "4111111111111111"})).unwrap();
        assert_eq!(output, json!({"card": "keep(************1111)"}));
    }

    #[test]
    fn transform_errors_abort_the_call() {
        let failing = |_: &Node| -> Result<String, BoxError> { Err("tokenizer offline".into()) };
        let redactor = Redactor::builder()
            .transform(Transformer::custom(failing))
            .build()
            .unwrap();
        let input = Node::from(json!({"a": "x"}));
        let err = redactor.redact(&input).unwrap_err();
        assert_eq!(err.to_string(), "tokenizer offline");
        assert_eq!(input, Node::from(json!({"a": "x"})));
    }
}
