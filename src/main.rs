use std::io;
use std::process::ExitCode;

use anyhow::Context;
use validate_xaml::{Cli, ConfigManager, Output, Reporter, XmlChecker, init_logger};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);

    let config = ConfigManager::load_config(&cli).context("failed to load configuration")?;
    let output = if cli.no_color {
        Output::plain()
    } else {
        Output::new()
    };

    let stdout = io::stdout();
    let mut reporter = Reporter::new(config, XmlChecker::new(), output, stdout.lock());
    let outcome = reporter.execute();

    Ok(ExitCode::from(outcome.exit_code()))
}
