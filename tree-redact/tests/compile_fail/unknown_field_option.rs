//! Test: an unrecognised field option.
//!
//! `secret` is not a rule; use `shallow`, `deep` or `full` instead.

use tree_redact::Template;

#[derive(Template)]
struct Credentials {
    user: String,
    #[template(secret)]
    password: String,
}

fn main() {}
