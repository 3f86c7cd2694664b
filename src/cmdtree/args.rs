use clap::Parser;

/// Returns the version string, including the git hash for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234" for dev builds
pub fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("CMDTREE_GIT_HASH");
    const IS_RELEASE: &str = env!("CMDTREE_IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, GIT_HASH)
        }
    })
}

/// Options for the binary itself. Everything after them is handed to the command tree, which
/// does its own help, so clap's help flag and subcommand are off.
#[derive(Parser, Debug)]
#[command(
    name = "cmdtree",
    bin_name = "cmdtree",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Run commands from a metadata-described tree", long_about = None)]
pub struct Cli {
    /// Debug-level logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Plain output without colors
    #[arg(long)]
    pub no_color: bool,

    /// Report errors without exiting early
    #[arg(long)]
    pub debug: bool,

    /// Command name shown in help
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Group, command, flags and arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}
