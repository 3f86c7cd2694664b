use crate::coerce::CoerceOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_HELP_KEYWORD: &str = "help";
const DEFAULT_FLAG_PREFIX: &str = "--";
const FALLBACK_COMMAND_NAME: &str = "cli";

/// Options recognised by the resolver, the help renderer and the dispatcher.
///
/// Serializable so embedding programs can keep it alongside their own settings; this crate
/// never reads it from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Display name used in help. Defaults to the running executable's base name.
    #[serde(default)]
    pub command_name: Option<String>,

    /// Enables the help keyword and implicit help for groups.
    #[serde(default = "default_true")]
    pub auto_help: bool,

    #[serde(default = "default_help_keyword")]
    pub help_keyword: String,

    #[serde(default = "default_flag_prefix")]
    pub flag_prefix: String,

    /// Coerce positionals to the declared parameter types before invoking a method.
    #[serde(default = "default_true")]
    pub coerce_arguments: bool,

    /// Route errors through the handler without terminating the process.
    #[serde(default)]
    pub debug: bool,

    /// Force styled help on or off; detected from the terminal when unset.
    #[serde(default)]
    pub color: Option<bool>,

    #[serde(default)]
    pub separators: CoerceOptions,
}

fn default_true() -> bool {
    true
}

fn default_help_keyword() -> String {
    DEFAULT_HELP_KEYWORD.to_string()
}

fn default_flag_prefix() -> String {
    DEFAULT_FLAG_PREFIX.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            command_name: None,
            auto_help: true,
            help_keyword: default_help_keyword(),
            flag_prefix: default_flag_prefix(),
            coerce_arguments: true,
            debug: false,
            color: None,
            separators: CoerceOptions::default(),
        }
    }
}

impl CliConfig {
    pub fn with_command_name(mut self, name: impl Into<String>) -> Self {
        self.command_name = Some(name.into());
        self
    }

    pub fn with_auto_help(mut self, enabled: bool) -> Self {
        self.auto_help = enabled;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The configured command name, or the base name of the running executable.
    pub fn command_name(&self) -> String {
        if let Some(name) = &self.command_name {
            return name.clone();
        }
        std::env::args()
            .next()
            .as_deref()
            .and_then(|arg0| Path::new(arg0).file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_COMMAND_NAME.to_string())
    }

    pub fn is_help_keyword(&self, token: &str) -> bool {
        self.auto_help && token.eq_ignore_ascii_case(&self.help_keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.auto_help);
        assert!(config.coerce_arguments);
        assert_eq!(config.flag_prefix, "--");
        assert_eq!(config.help_keyword, "help");
        assert_eq!(config.separators.array_separator, ",");
    }

    #[test]
    fn test_explicit_command_name_wins() {
        let config = CliConfig::default().with_command_name("tool");
        assert_eq!(config.command_name(), "tool");
    }

    #[test]
    fn test_command_name_falls_back_to_executable() {
        let name = CliConfig::default().command_name();
        assert!(!name.is_empty());
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_help_keyword_is_case_insensitive() {
        let config = CliConfig::default();
        assert!(config.is_help_keyword("HELP"));
        assert!(config.is_help_keyword("Help"));
        assert!(!config.is_help_keyword("helps"));
        assert!(!config.with_auto_help(false).is_help_keyword("help"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CliConfig =
            serde_json::from_str(r#"{"commandName": "x", "autoHelp": false}"#).unwrap();
        assert_eq!(config.command_name.as_deref(), Some("x"));
        assert!(!config.auto_help);
        assert!(config.coerce_arguments);
        assert_eq!(config.separators, CoerceOptions::default());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = CliConfig::default().with_color(false).with_debug(true);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CliConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
