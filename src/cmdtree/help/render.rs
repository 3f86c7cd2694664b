use super::styles::{Theme, HELP_THEME};
use super::templates::HELP_TEMPLATE;
use super::HelpPage;
use crate::error::Result;
use console::Term;
use minijinja::{Environment, Value};

const HELP_TEMPLATE_NAME: &str = "help";

/// Renders [`HelpPage`]s through the help template.
pub struct HelpRenderer {
    env: Environment<'static>,
}

impl HelpRenderer {
    /// A renderer that styles output when stdout supports colors.
    pub fn detect() -> Result<Self> {
        Self::with_color(Term::stdout().features().colors_supported())
    }

    pub fn with_color(use_color: bool) -> Result<Self> {
        let mut env = Environment::new();
        register_style_filter(&mut env, HELP_THEME.clone(), use_color);
        env.add_template(HELP_TEMPLATE_NAME, HELP_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, page: &HelpPage) -> Result<String> {
        let template = self.env.get_template(HELP_TEMPLATE_NAME)?;
        Ok(template.render(page)?)
    }
}

fn register_style_filter(env: &mut Environment<'static>, theme: Theme, use_color: bool) {
    env.add_filter("style", move |value: Value, name: String| -> String {
        let text = value.to_string();
        if use_color {
            theme.apply(&name, &text)
        } else {
            theme.apply_plain(&name, &text)
        }
    });
}
