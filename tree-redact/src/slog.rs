//! Adapters for emitting redacted trees through `slog`.
//!
//! This module connects [`Redactor`] with `slog` by providing a `slog::Value`
//! that serializes the redacted tree as structured JSON via `slog`'s
//! nested-value support.
//!
//! It is responsible for:
//! - Ensuring the logged representation comes from [`Redactor::redact`],
//!   never from the original tree.
//! - Keeping logging infallible: a failed redaction is logged as a
//!   placeholder string instead of the value.
//!
//! It does not configure `slog` or decide what is sensitive.

use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{node::Node, redaction::Redactor};

/// Logged in place of a tree whose redaction failed.
pub const REDACTION_FAILED: &str = "Failed to redact value";

/// A `slog::Value` that emits an already redacted tree as structured JSON.
#[derive(Clone, Debug)]
pub struct RedactedJson {
    value: JsonValue,
}

impl RedactedJson {
    /// The JSON that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for RedactedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

impl Redactor {
    /// Redacts `value` and wraps the result for `slog`.
    ///
    /// ```ignore
    /// info!(logger, "request"; "payload" => redactor.slog_value(&payload));
    /// ```
    pub fn slog_value(&self, value: &Node) -> RedactedJson {
        let value = match self.redact(value) {
            Ok(redacted) => JsonValue::from(redacted),
            Err(err) => {
                tracing::debug!(error = %err, "redaction failed while logging");
                JsonValue::String(REDACTION_FAILED.to_string())
            }
        };
        RedactedJson { value }
    }
}
