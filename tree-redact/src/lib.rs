//! Rule-driven redaction for JSON-like value trees.
//!
//! This crate walks a [`Node`] tree and replaces sensitive values before the
//! data leaves the process, typically on its way into logs or telemetry.
//! Four independent inputs decide the fate of every node:
//!
//! - **Ancestry**: below a deep-secret key every primitive is secret.
//! - **Key patterns**: regex lists classify keys as secret, deep-secret,
//!   full-redaction, ignored or deleted ([`PatternMatcher`]).
//! - **Shape**: objects whose key set equals a declared [`Template`] follow
//!   the template's per-field rules instead of key patterns ([`ShapeMatcher`]).
//! - **Value kind**: booleans, dates, functions and nulls are only redacted
//!   when their [`ValuePolicy`] flag allows it.
//!
//! Key rules:
//! - An unset `secret_keys` list treats every key as secret.
//! - Ignored keys are never redacted, even below a deep-secret key.
//! - Full-redaction keys collapse their value to one transformed string.
//! - `redact` never touches its input; `redact_in_place` rewrites it.
//!
//! What this crate does:
//! - defines the node model, matchers, the walker and the [`Redactor`] facade
//! - ships built-in strategies ([`Strategy`]) and a format hook ([`Format`])
//! - provides integrations behind feature flags (e.g. `slog`)
//!
//! What it does not do:
//! - configure or own any logger
//! - stream documents or validate schemas
//!
//! The `Template` derive macro lives in `tree-redact-derive` and is
//! re-exported here.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else,
    clippy::return_self_not_must_use
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use tree_redact_derive::Template;

#[allow(unused_extern_crates)]
extern crate self as tree_redact;

mod error;
mod format;
mod node;
mod redaction;
#[cfg(feature = "slog")]
pub mod slog;
mod strategy;
mod transform;

pub use error::{
    BoxError, ConfigurationError, Error, FormatError, PatternCategory, Result, TemplateCollision,
    ValidationError,
};
pub use format::Format;
pub use node::{iso_8601, Node, Object};
pub use redaction::{
    KeyPattern, KeyRules, MatchKind, PatternMatcher, Redactor, RedactorBuilder, RedactorConfig,
    Rule, ShapeMatcher, Template, TemplateShape, ValuePolicy,
};
#[cfg(feature = "hash")]
pub use strategy::{HashAlgorithm, HashConfig, HashEncoding};
pub use strategy::{KeepConfig, MaskConfig, Strategy, REDACTED_PLACEHOLDER};
pub use transform::{AsyncTransform, Transform, Transformer};
