mod args;
mod demo;

use args::{get_version, Cli};
use clap::Parser;
use cmdtree::{App, CliConfig, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = CliConfig::default().with_debug(cli.debug);
    if let Some(name) = cli.name {
        config = config.with_command_name(name);
    }
    if cli.no_color {
        config = config.with_color(false);
    }

    let app = App::new(config);
    app.bind(demo::interface()?, demo::live(get_version()))?;

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    Ok(runtime.block_on(app.main(&cli.args)))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
