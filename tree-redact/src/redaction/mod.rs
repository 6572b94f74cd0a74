//! Matching, traversal and entry points.
//!
//! - **`matcher`**: what a key name means (`PatternMatcher`)
//! - **`template`**: declared object shapes (`Template`, `ShapeMatcher`)
//! - **`walk`**: the recursive engine that decides each node's fate
//! - **`redactor`**: configuration, validation and the public facade
//!
//! Strategies that produce replacement text live in `crate::strategy`.

mod matcher;
mod redactor;
mod template;
mod walk;

pub use matcher::{KeyPattern, KeyRules, PatternMatcher};
pub use redactor::{Redactor, RedactorBuilder, RedactorConfig};
pub use template::{MatchKind, Rule, ShapeMatcher, Template, TemplateShape};
pub use walk::ValuePolicy;
