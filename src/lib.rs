//! # validate-xaml Library
//!
//! Checks that every file with a given suffix under a project directory is
//! well-formed XML and prints a per-file report with a pass/fail summary.
//!
//! The pieces compose linearly: [`FileDiscovery`] finds the files,
//! [`XmlChecker`] classifies each one, and [`Reporter`] drives both and
//! renders the report through [`Output`].

pub mod cli;
pub mod config;
pub mod error;
pub mod file_discovery;
pub mod logging;
pub mod output;
pub mod reporter;
pub mod validator;
pub mod wellformed;

pub use cli::Cli;
pub use config::{Config, ConfigManager, DiscoveryConfig, ReportConfig};
pub use error::{ConfigError, ValidationError};
pub use file_discovery::{FileDiscovery, FileRecord};
pub use logging::init_logger;
pub use output::Output;
pub use reporter::{HighlightPredicate, ReportOutcome, Reporter, entry_file_predicate};
pub use validator::{DocumentValidator, FileValidationResult, ValidationResult, ValidationResults};
pub use wellformed::XmlChecker;
