use clap::Parser;
use std::path::PathBuf;

/// Check that every XAML file in a project directory is well-formed XML.
///
/// With no arguments the project directory next to the executable is checked.
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "validate-xaml")]
#[command(about = "Check that XAML files are well-formed XML")]
#[command(version)]
pub struct Cli {
    /// Directory to scan instead of the configured one
    #[arg(long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// File name suffix to check
    #[arg(short = 'e', long = "extension", value_name = "SUFFIX")]
    pub extension: Option<String>,

    /// File name to flag as the primary fix target (repeatable)
    #[arg(long = "entry-file", value_name = "NAME", action = clap::ArgAction::Append)]
    pub entry_files: Vec<String>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log discovery and validation details to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Never colorize the report
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
