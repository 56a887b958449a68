use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;
use crate::error::{ConfigError, ConfigResult};

/// Project directory checked when nothing else is configured, next to the executable
pub const DEFAULT_ROOT_DIR: &str = "KOALAOptimizer.Testing";
pub const DEFAULT_SUFFIX: &str = ".xaml";
pub const DEFAULT_ENTRY_FILE: &str = "MainWindow.xaml";
pub const DEFAULT_TITLE: &str = "XAML XML Validation";

/// File names probed, in order, in each configuration search directory
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    "validate-xaml.toml",
    "validate-xaml.json",
    ".validate-xaml.toml",
    ".validate-xaml.json",
];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub report: ReportConfig,
}

/// What to scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directory to scan. `None` until loading resolves it.
    pub root_dir: Option<PathBuf>,
    /// File name suffix to check
    pub suffix: String,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
}

/// How to present the report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// First line of the report
    pub title: String,
    /// File names annotated as the primary fix target when they validate
    pub entry_file_names: BTreeSet<String>,
    /// Extra lines printed after a fully successful run
    pub success_notes: Vec<String>,
}

impl DiscoveryConfig {
    pub fn root_dir(&self) -> &Path {
        self.root_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_ROOT_DIR))
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            suffix: DEFAULT_SUFFIX.to_string(),
            follow_symlinks: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            entry_file_names: BTreeSet::from([DEFAULT_ENTRY_FILE.to_string()]),
            success_notes: Vec::new(),
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> CLI
    pub fn load_config(cli: &Cli) -> ConfigResult<Config> {
        let search_dirs = Self::search_dirs()?;
        let executable_dir = Self::executable_dir()?;
        Self::load_config_from(cli, &search_dirs, &executable_dir)
    }

    /// Same as [`load_config`](Self::load_config) with the search locations supplied
    pub fn load_config_from(
        cli: &Cli,
        search_dirs: &[PathBuf],
        executable_dir: &Path,
    ) -> ConfigResult<Config> {
        let mut config = Config::default();

        let config_path = match &cli.config {
            Some(path) if path.is_file() => Some(path.clone()),
            Some(path) => return Err(ConfigError::FileNotFound { path: path.clone() }),
            None => Self::find_config_file(search_dirs),
        };

        if let Some(path) = config_path {
            debug!(path = %path.display(), "loading configuration file");
            let file_config = Self::load_from_file(&path)?;
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config = Self::merge_configs(config, Self::resolve_root_dir(file_config, base));
        }

        // A --dir value stays relative to the working directory.
        config = Self::merge_with_cli(config, cli);

        if config.discovery.root_dir.is_none() {
            config.discovery.root_dir = Some(executable_dir.join(DEFAULT_ROOT_DIR));
        }

        Self::validate_config(&config)?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> ConfigResult<Config> {
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// First configuration file found in `search_dirs`
    pub fn find_config_file(search_dirs: &[PathBuf]) -> Option<PathBuf> {
        search_dirs
            .iter()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
            .find(|path| path.is_file())
    }

    /// Current directory first, then the user configuration directory
    pub fn search_dirs() -> ConfigResult<Vec<PathBuf>> {
        let mut search = vec![std::env::current_dir()?];
        if let Some(config_dir) = dirs::config_dir() {
            search.push(config_dir.join("validate-xaml"));
        }
        Ok(search)
    }

    pub fn executable_dir() -> ConfigResult<PathBuf> {
        let executable = std::env::current_exe()?;
        Ok(executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default())
    }

    /// Anchor a relative `root_dir` at `base`
    pub fn resolve_root_dir(mut config: Config, base: &Path) -> Config {
        if let Some(root_dir) = &config.discovery.root_dir
            && root_dir.is_relative()
        {
            config.discovery.root_dir = Some(base.join(root_dir));
        }
        config
    }

    /// Overlay `override_config` on `base`; an unset root directory keeps the base one
    pub fn merge_configs(base: Config, override_config: Config) -> Config {
        let DiscoveryConfig {
            root_dir,
            suffix,
            follow_symlinks,
        } = override_config.discovery;

        Config {
            discovery: DiscoveryConfig {
                root_dir: root_dir.or(base.discovery.root_dir),
                suffix,
                follow_symlinks,
            },
            report: override_config.report,
        }
    }

    /// Merge CLI arguments into configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(dir) = &cli.dir {
            config.discovery.root_dir = Some(dir.clone());
        }
        if let Some(extension) = &cli.extension {
            config.discovery.suffix = extension.clone();
        }
        if !cli.entry_files.is_empty() {
            config.report.entry_file_names = cli.entry_files.iter().cloned().collect();
        }
        config
    }

    pub fn validate_config(config: &Config) -> ConfigResult<()> {
        if config.discovery.suffix.is_empty() {
            return Err(ConfigError::Validation(
                "suffix must not be empty".to_string(),
            ));
        }

        if config.discovery.root_dir().as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "root_dir must not be empty".to_string(),
            ));
        }

        for name in &config.report.entry_file_names {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "entry file name must be a bare file name: '{}'",
                    name
                )));
            }
        }

        Ok(())
    }
}
