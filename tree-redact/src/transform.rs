//! The transform capability consumed by the walker.
//!
//! A transform turns one matched value into its replacement string. The walker
//! never inspects how; it only hands over the node (dates already normalized
//! to ISO-8601, full-redaction subtrees already stringified) and stores the
//! returned text.

use std::{fmt, sync::Arc};

use futures::future::BoxFuture;

use crate::{error::BoxError, node::Node, strategy::Strategy};

/// Synchronous value-to-string transform.
///
/// Closures of type `Fn(&Node) -> Result<String, BoxError>` implement this
/// trait and report the name `"custom"`.
pub trait Transform: Send + Sync {
    fn transform(&self, value: &Node) -> Result<String, BoxError>;

    /// Name substituted for `{{strategy}}` in format templates.
    fn name(&self) -> &str {
        "custom"
    }

    /// Name substituted for `{{shortStrategy}}` in format templates.
    fn short_name(&self) -> &str {
        self.name()
    }
}

impl<F> Transform for F
where
    F: Fn(&Node) -> Result<String, BoxError> + Send + Sync,
{
    fn transform(&self, value: &Node) -> Result<String, BoxError> {
        self(value)
    }
}

/// Asynchronous value-to-string transform, e.g. a call into a tokenization
/// service.
pub trait AsyncTransform: Send + Sync {
    fn transform<'a>(&'a self, value: &'a Node) -> BoxFuture<'a, Result<String, BoxError>>;

    fn name(&self) -> &str {
        "custom"
    }

    fn short_name(&self) -> &str {
        self.name()
    }
}

/// Where replacement strings come from.
///
/// Built-in strategies are named explicitly; anything else is passed as a
/// trait object. Nothing is detected from the shape of a value at runtime.
#[derive(Clone)]
pub enum Transformer {
    Builtin(Strategy),
    Custom(Arc<dyn Transform>),
    Async(Arc<dyn AsyncTransform>),
}

impl Transformer {
    /// Wraps a synchronous transform.
    pub fn custom<T>(transform: T) -> Self
    where
        T: Transform + 'static,
    {
        Self::Custom(Arc::new(transform))
    }

    /// Wraps an asynchronous transform.
    pub fn from_async<T>(transform: T) -> Self
    where
        T: AsyncTransform + 'static,
    {
        Self::Async(Arc::new(transform))
    }

    pub fn name(&self) -> &str {
        match self {
            Transformer::Builtin(strategy) => Transform::name(strategy),
            Transformer::Custom(transform) => transform.name(),
            Transformer::Async(transform) => transform.name(),
        }
    }

    pub fn short_name(&self) -> &str {
        match self {
            Transformer::Builtin(strategy) => Transform::short_name(strategy),
            Transformer::Custom(transform) => transform.short_name(),
            Transformer::Async(transform) => transform.short_name(),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Transformer::Async(_))
    }

    /// Runs the transform, blocking on asynchronous ones.
    ///
    /// Blocking happens on the calling thread, so an async transform that
    /// needs the caller's executor must go through the async entry points.
    pub(crate) fn apply_blocking(&self, value: &Node) -> Result<String, BoxError> {
        match self {
            Transformer::Builtin(strategy) => strategy.transform(value),
            Transformer::Custom(transform) => transform.transform(value),
            Transformer::Async(transform) => futures::executor::block_on(transform.transform(value)),
        }
    }

    /// Runs the transform as a future.
    pub(crate) fn apply<'a>(&'a self, value: &'a Node) -> BoxFuture<'a, Result<String, BoxError>> {
        match self {
            Transformer::Builtin(strategy) => Box::pin(futures::future::ready(strategy.transform(value))),
            Transformer::Custom(transform) => Box::pin(futures::future::ready(transform.transform(value))),
            Transformer::Async(transform) => transform.transform(value),
        }
    }
}

impl From<Strategy> for Transformer {
    fn from(strategy: Strategy) -> Self {
        Self::Builtin(strategy)
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformer::Builtin(strategy) => f.debug_tuple("Builtin").field(strategy).finish(),
            Transformer::Custom(transform) => f.debug_tuple("Custom").field(&transform.name()).finish(),
            Transformer::Async(transform) => f.debug_tuple("Async").field(&transform.name()).finish(),
        }
    }
}
