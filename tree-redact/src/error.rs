//! Error taxonomy.
//!
//! Configuration and format errors are raised while building a
//! [`Redactor`](crate::Redactor) and never during traversal. Validation errors
//! are raised per call before any node is visited. Transform errors come from
//! user-supplied strategies and abort the call.

use std::fmt;

/// Boxed error type returned by user-supplied transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pattern category a key pattern was configured for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternCategory {
    Secret,
    DeepSecret,
    FullSecret,
    Ignored,
    Delete,
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternCategory::Secret => "secret_keys",
            PatternCategory::DeepSecret => "deep_secret_keys",
            PatternCategory::FullSecret => "full_secret_keys",
            PatternCategory::Ignored => "ignored_keys",
            PatternCategory::Delete => "delete_secret_keys",
        };
        f.write_str(name)
    }
}

/// Two configured templates that declare the same key set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateCollision {
    pub first: usize,
    pub second: usize,
    /// Shared keys, sorted.
    pub keys: Vec<String>,
}

impl fmt::Display for TemplateCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "templates {} and {} share keys [{}]",
            self.first,
            self.second,
            self.keys.join(", ")
        )
    }
}

fn join_collisions(collisions: &[TemplateCollision]) -> String {
    collisions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Invalid static configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("ambiguous templates: {}", join_collisions(.collisions))]
    AmbiguousTemplates { collisions: Vec<TemplateCollision> },

    #[error("template {template} field `{field}` references unknown field `{target}`")]
    DanglingReference {
        template: usize,
        field: String,
        target: String,
    },

    #[error("invalid pattern `{pattern}` in {category}: {source}")]
    InvalidPattern {
        category: PatternCategory,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown hash algorithm `{0}`; expected `sha256` or `sha512`")]
    UnknownAlgorithm(String),

    #[error("unknown output encoding `{0}`; expected `hex` or `base64`")]
    UnknownEncoding(String),
}

/// Invalid input handed to an entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("expected an object or array at the root, found {kind}")]
    UnsupportedRoot { kind: &'static str },
}

/// Invalid format-hook template.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("format `{template}` must contain the {{{{value}}}} token")]
    MissingValueToken { template: String },

    #[error("format `{template}` contains unknown token `{{{{{token}}}}}`")]
    UnknownToken { template: String, token: String },

    #[error("format `{template}` has an unclosed token starting at byte {offset}")]
    Unclosed { template: String, offset: usize },
}

/// Errors returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Format(#[from] FormatError),

    /// Raised by a user-supplied transform; the original error is kept intact.
    #[error(transparent)]
    Transform(BoxError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
