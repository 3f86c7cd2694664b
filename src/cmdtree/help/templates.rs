//! Help templates.
//!
//! Templates live in their own files and are included as string constants. They are minijinja
//! templates with explicit line breaks: every newline in the output is visible in the source,
//! and block tags sit at line ends so conditionals do not leak blank lines.
//!
//! All layout math (column padding, truncation) is done in Rust before rendering; templates only
//! pick the order of sections and the style name of each piece.

pub const HELP_TEMPLATE: &str = include_str!("templates/help.tmp");
