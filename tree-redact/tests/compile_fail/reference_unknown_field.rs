//! Test: a reference naming a field that is not part of the template.
//!
//! `label` does not exist, so the reference could never be resolved.

use tree_redact::Template;

#[derive(Template)]
struct Attribute {
    name: String,
    // ERROR: `label` is not a key of `Attribute`
    #[template(reference = "label")]
    value: String,
}

fn main() {}
