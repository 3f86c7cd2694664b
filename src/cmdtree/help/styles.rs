//! Named styles for help output.
//!
//! Templates refer to styles by what the text *is* (`section`, `command`, `type`), never by how it
//! looks. [`HELP_THEME`] maps those names to `console` styles in one place, so the look can change
//! without touching templates.
//!
//! A style name the theme does not know renders with a visible [`MISSING_STYLE_INDICATOR`] in
//! front of the text, in plain mode too. A typo in a template shows up in the first test run
//! rather than as silently unstyled output.

use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const MISSING_STYLE_INDICATOR: &str = "(!?)";

/// Style names used by the help template.
pub const HEADER: &str = "header";
pub const SECTION: &str = "section";
pub const COMMAND: &str = "command";
pub const PARAM: &str = "param";
pub const TYPE: &str = "type";
pub const OPTIONAL: &str = "optional";
pub const MUTED: &str = "muted";

#[derive(Clone, Default)]
pub struct Theme {
    styles: HashMap<String, Style>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named style, replacing any previous one.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Styled text, with ANSI codes.
    pub fn apply(&self, name: &str, text: &str) -> String {
        match self.styles.get(name) {
            Some(style) => style.apply_to(text).force_styling(true).to_string(),
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    }

    /// Plain text, still flagging unknown style names.
    pub fn apply_plain(&self, name: &str, text: &str) -> String {
        if self.has(name) {
            text.to_string()
        } else {
            format!("{} {}", MISSING_STYLE_INDICATOR, text)
        }
    }
}

pub static HELP_THEME: Lazy<Theme> = Lazy::new(|| {
    let strong = Style::new().bold();
    let accent = Style::new().cyan();
    let faint = Style::new().dim();

    Theme::new()
        .add(HEADER, strong.clone())
        .add(SECTION, strong.underlined())
        .add(COMMAND, accent.bold())
        .add(PARAM, Style::new().yellow())
        .add(TYPE, Style::new().green())
        .add(OPTIONAL, faint.clone().italic())
        .add(MUTED, faint)
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_style_shows_indicator() {
        let theme = Theme::new().add("known", Style::new().bold());
        assert_eq!(theme.apply_plain("known", "x"), "x");
        assert_eq!(theme.apply_plain("typo", "x"), "(!?) x");
        assert!(theme.apply("typo", "x").starts_with("(!?)"));
    }

    #[test]
    fn test_apply_emits_ansi() {
        let theme = Theme::new().add("bold", Style::new().bold());
        let styled = theme.apply("bold", "x");
        assert!(styled.contains("\x1b["));
        assert!(styled.contains('x'));
    }

    #[test]
    fn test_help_theme_covers_template_names() {
        for name in [HEADER, SECTION, COMMAND, PARAM, TYPE, OPTIONAL, MUTED] {
            assert!(HELP_THEME.has(name), "missing style {}", name);
        }
    }
}
