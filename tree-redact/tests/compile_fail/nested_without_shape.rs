//! Test: `#[template(nested)]` on a type that does not implement
//! `TemplateShape`.
//!
//! Derive `Template` on the field's type, or pick a plain rule.

use tree_redact::Template;

struct Address {
    street: String,
}

#[derive(Template)]
struct Customer {
    name: String,
    #[template(nested)]
    address: Address,
}

fn main() {}
