//! Test: `#[derive(Template)]` on an enum.
//!
//! A template describes exactly one object shape; enums have several.

use tree_redact::Template;

#[derive(Template)]
enum Event {
    Login { user: String },
    Logout,
}

fn main() {}
