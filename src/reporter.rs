//! Orchestration of one validation run
//!
//! The reporter checks the root directory, discovers files, validates each of
//! them in sorted order and writes the report as it goes. File-level failures
//! are folded into the results; only a missing root or an empty file set stops
//! a run early.

use std::collections::BTreeSet;
use std::io::Write;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Result, ValidationError};
use crate::file_discovery::{FileDiscovery, FileRecord};
use crate::output::Output;
use crate::validator::{DocumentValidator, FileValidationResult, ValidationResults};

/// Decides which valid files get the "primary fix target" annotation
pub type HighlightPredicate = Box<dyn Fn(&FileRecord) -> bool>;

/// Highlight files whose name is one of `names`
pub fn entry_file_predicate(names: BTreeSet<String>) -> HighlightPredicate {
    Box::new(move |record: &FileRecord| record.file_name().is_some_and(|name| names.contains(name)))
}

/// How a run ended
#[derive(Debug)]
pub enum ReportOutcome {
    /// Every discovered file is well-formed
    AllValid(ValidationResults),
    /// At least one file failed to read or parse
    SomeInvalid(ValidationResults),
    /// Missing root directory or nothing to check
    PreconditionFailed(ValidationError),
    /// The report itself could not be written
    Aborted(ValidationError),
}

impl ReportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReportOutcome::AllValid(_))
    }

    /// 0 when every file is valid, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn results(&self) -> Option<&ValidationResults> {
        match self {
            ReportOutcome::AllValid(results) | ReportOutcome::SomeInvalid(results) => {
                Some(results)
            }
            _ => None,
        }
    }
}

/// Runs discovery and validation and writes the human-readable report
pub struct Reporter<V, W> {
    config: Config,
    discovery: FileDiscovery,
    validator: V,
    output: Output,
    writer: W,
    highlight: HighlightPredicate,
}

impl<V: DocumentValidator, W: Write> Reporter<V, W> {
    pub fn new(config: Config, validator: V, output: Output, writer: W) -> Self {
        let discovery = FileDiscovery::new()
            .with_suffix(config.discovery.suffix.clone())
            .with_follow_symlinks(config.discovery.follow_symlinks);
        let highlight = entry_file_predicate(config.report.entry_file_names.clone());

        Self {
            config,
            discovery,
            validator,
            output,
            writer,
            highlight,
        }
    }

    /// Replace the default "file name is an entry file" highlight rule
    pub fn with_highlight(mut self, predicate: impl Fn(&FileRecord) -> bool + 'static) -> Self {
        self.highlight = Box::new(predicate);
        self
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Run once and return the aggregate.
    ///
    /// Precondition failures are returned without being printed; see [`execute`](Self::execute).
    pub fn run(&mut self) -> Result<ValidationResults> {
        let root = self.config.discovery.root_dir().to_path_buf();
        writeln!(self.writer, "{}", self.output.format_header(&self.config.report.title))?;

        if !root.exists() {
            return Err(ValidationError::DirectoryNotFound { path: root });
        }

        let records = self.discovery.discover_files(&root);
        if records.is_empty() {
            return Err(ValidationError::NoFilesFound {
                path: root,
                suffix: self.discovery.suffix().to_string(),
            });
        }

        writeln!(self.writer, "{}", self.output.format_root(&root))?;
        writeln!(
            self.writer,
            "{}",
            self.output.format_file_count(records.len(), self.discovery.suffix())
        )?;

        let mut file_results = Vec::with_capacity(records.len());
        for record in records {
            let result = self.validator.validate(&record.path);
            debug!(path = %record.path.display(), valid = result.is_valid(), "validated");

            let highlighted = result.is_valid() && (self.highlight)(&record);
            let file_result = FileValidationResult {
                record,
                result,
                highlighted,
            };
            writeln!(self.writer, "{}", self.output.format_file_result(&file_result))?;
            file_results.push(file_result);
        }

        let results = ValidationResults::aggregate(file_results);
        let notes: &[String] = &self.config.report.success_notes;
        write!(self.writer, "{}", self.output.format_summary(&results, notes))?;
        self.writer.flush()?;

        for failed in results.invalid_results() {
            debug!(path = %failed.record.path.display(), "left invalid");
        }
        info!(
            total = results.total_files,
            invalid = results.invalid_files,
            "validation finished"
        );
        Ok(results)
    }

    /// Run once, print any precondition failure, and classify the outcome
    pub fn execute(&mut self) -> ReportOutcome {
        match self.run() {
            Ok(results) if results.all_valid() => ReportOutcome::AllValid(results),
            Ok(results) => ReportOutcome::SomeInvalid(results),
            Err(err) if err.is_precondition() => {
                let message = self.output.format_precondition_error(&err);
                if let Err(write_err) = writeln!(self.writer, "{}", message) {
                    error!("failed to write report: {}", write_err);
                }
                ReportOutcome::PreconditionFailed(err)
            }
            Err(err) => {
                error!("validation run aborted: {}", err);
                ReportOutcome::Aborted(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ValidationResult;
    use crate::wellformed::XmlChecker;
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Records every path it is asked about and fails files named "bad*"
    #[derive(Default)]
    struct RecordingValidator {
        seen: RefCell<Vec<PathBuf>>,
    }

    impl DocumentValidator for &RecordingValidator {
        fn validate(&self, path: &Path) -> ValidationResult {
            self.seen.borrow_mut().push(path.to_path_buf());
            let name = path.file_name().unwrap().to_string_lossy();
            if name.starts_with("bad") {
                ValidationResult::parse_error(1, 1, "rejected")
            } else {
                ValidationResult::Valid
            }
        }
    }

    fn config_for(root: &Path) -> Config {
        let mut config = Config::default();
        config.discovery.root_dir = Some(root.to_path_buf());
        config
    }

    fn report_text(reporter: Reporter<impl DocumentValidator, Vec<u8>>) -> String {
        String::from_utf8(reporter.into_writer()).unwrap()
    }

    #[test]
    fn test_every_file_checked_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.xaml", "bad.xaml", "c.xaml", "ignored.txt"] {
            fs::write(temp_dir.path().join(name), "<a/>").unwrap();
        }

        let validator = RecordingValidator::default();
        let mut reporter =
            Reporter::new(config_for(temp_dir.path()), &validator, Output::plain(), Vec::new());
        let outcome = reporter.execute();

        assert_eq!(outcome.exit_code(), 1);
        let results = outcome.results().unwrap();
        assert_eq!(results.total_files, 3);
        assert_eq!(results.invalid_files, 1);

        let seen: Vec<_> = validator
            .seen
            .borrow()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(seen, vec!["a.xaml", "bad.xaml", "c.xaml"]);
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("KOALAOptimizer.Testing");

        let mut reporter =
            Reporter::new(config_for(&root), XmlChecker::new(), Output::plain(), Vec::new());
        let outcome = reporter.execute();

        assert!(matches!(
            outcome,
            ReportOutcome::PreconditionFailed(ValidationError::DirectoryNotFound { .. })
        ));
        assert_eq!(outcome.exit_code(), 1);

        let text = report_text(reporter);
        assert!(text.contains("Directory not found"));
        assert!(!text.contains("Found"));
    }

    #[test]
    fn test_no_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("App.xaml.cs"), "class App {}").unwrap();

        let mut reporter = Reporter::new(
            config_for(temp_dir.path()),
            XmlChecker::new(),
            Output::plain(),
            Vec::new(),
        );
        let outcome = reporter.execute();

        assert!(matches!(
            outcome,
            ReportOutcome::PreconditionFailed(ValidationError::NoFilesFound { .. })
        ));
        assert_eq!(outcome.exit_code(), 1);
        assert!(report_text(reporter).contains("No files ending in '.xaml'"));
    }

    #[test]
    fn test_default_highlight_uses_entry_file_names() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("Views")).unwrap();
        fs::write(temp_dir.path().join("MainWindow.xaml"), "<Window/>").unwrap();
        fs::write(temp_dir.path().join("Views/MainWindow.xaml"), "<Window/>").unwrap();
        fs::write(temp_dir.path().join("OldMainWindow.xaml"), "<Window/>").unwrap();

        let mut reporter = Reporter::new(
            config_for(temp_dir.path()),
            XmlChecker::new(),
            Output::plain(),
            Vec::new(),
        );
        let outcome = reporter.execute();

        let highlighted: Vec<_> = outcome
            .results()
            .unwrap()
            .highlighted_files()
            .map(|r| r.record.relative_display_path.replace('\\', "/"))
            .collect();
        assert_eq!(highlighted, vec!["MainWindow.xaml", "Views/MainWindow.xaml"]);
    }

    #[test]
    fn test_custom_highlight_predicate() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("App.xaml"), "<Application/>").unwrap();
        fs::write(temp_dir.path().join("MainWindow.xaml"), "<Window/>").unwrap();

        let mut reporter = Reporter::new(
            config_for(temp_dir.path()),
            XmlChecker::new(),
            Output::plain(),
            Vec::new(),
        )
        .with_highlight(|record| record.relative_display_path.starts_with("App"));
        let outcome = reporter.execute();

        assert!(outcome.is_success());
        let text = report_text(reporter);
        assert!(text.contains("→ App.xaml - primary fix target verified"));
        assert!(!text.contains("→ MainWindow.xaml"));
    }

    #[test]
    fn test_invalid_file_is_never_highlighted() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("MainWindow.xaml"), "<Window>&</Window>").unwrap();

        let mut reporter = Reporter::new(
            config_for(temp_dir.path()),
            XmlChecker::new(),
            Output::plain(),
            Vec::new(),
        );
        let outcome = reporter.execute();

        assert_eq!(outcome.results().unwrap().highlighted_files().count(), 0);
        assert!(!report_text(reporter).contains("primary fix target"));
    }

    #[test]
    fn test_success_notes_printed_only_on_success() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("App.xaml"), "<Application/>").unwrap();

        let mut config = config_for(temp_dir.path());
        config.report.success_notes = vec!["Line 217: '&' escaped".to_string()];

        let mut reporter = Reporter::new(config.clone(), XmlChecker::new(), Output::plain(), Vec::new());
        assert!(reporter.execute().is_success());
        assert!(report_text(reporter).contains("• Line 217: '&' escaped"));

        fs::write(temp_dir.path().join("Broken.xaml"), "<a>").unwrap();
        let mut reporter = Reporter::new(config, XmlChecker::new(), Output::plain(), Vec::new());
        assert!(!reporter.execute().is_success());
        assert!(!report_text(reporter).contains("Line 217"));
    }
}
