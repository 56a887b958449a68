//! Validation results and the seam between the reporter and the XML checker.

use std::path::Path;

use crate::file_discovery::FileRecord;

/// Outcome of checking one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The file parsed as well-formed XML
    Valid,
    /// The file could not be read or is not well-formed.
    ///
    /// `line` and `column` are 1-based and only present for parse errors;
    /// read and decoding failures carry the raw error message alone.
    Invalid {
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },
}

impl ValidationResult {
    /// A parse error at a known position
    pub fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        ValidationResult::Invalid {
            line: Some(line),
            column: Some(column),
            message: message.into(),
        }
    }

    /// A failure with no parse position (unreadable or undecodable file)
    pub fn io_error(message: impl Into<String>) -> Self {
        ValidationResult::Invalid {
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationResult::Invalid { .. })
    }

    /// Line and column of a parse error
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ValidationResult::Invalid {
                line: Some(line),
                column: Some(column),
                ..
            } => Some((*line, *column)),
            _ => None,
        }
    }

    /// Human-readable failure detail, `None` for valid files
    pub fn describe(&self) -> Option<String> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid { message, .. } => Some(match self.position() {
                Some((line, column)) => format!("Line {line}, Position {column}: {message}"),
                None => message.clone(),
            }),
        }
    }
}

/// Anything that can classify a file on disk as valid or not
pub trait DocumentValidator {
    fn validate(&self, path: &Path) -> ValidationResult;
}

/// Result of validating a single discovered file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValidationResult {
    pub record: FileRecord,
    pub result: ValidationResult,
    /// Valid file matched by the highlight predicate
    pub highlighted: bool,
}

/// Aggregate over one run, in report order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResults {
    pub file_results: Vec<FileValidationResult>,
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
}

impl ValidationResults {
    pub fn aggregate(file_results: Vec<FileValidationResult>) -> Self {
        let total_files = file_results.len();
        let valid_files = file_results.iter().filter(|r| r.result.is_valid()).count();

        Self {
            file_results,
            total_files,
            valid_files,
            invalid_files: total_files - valid_files,
        }
    }

    /// Logical AND over every file result
    pub fn all_valid(&self) -> bool {
        self.invalid_files == 0
    }

    pub fn has_errors(&self) -> bool {
        !self.all_valid()
    }

    pub fn highlighted_files(&self) -> impl Iterator<Item = &FileValidationResult> {
        self.file_results.iter().filter(|r| r.highlighted)
    }

    pub fn invalid_results(&self) -> impl Iterator<Item = &FileValidationResult> {
        self.file_results.iter().filter(|r| r.result.is_invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file_result(name: &str, result: ValidationResult, highlighted: bool) -> FileValidationResult {
        FileValidationResult {
            record: FileRecord::new(Path::new("/root"), PathBuf::from("/root").join(name)),
            result,
            highlighted,
        }
    }

    #[test]
    fn test_validation_result_predicates() {
        assert!(ValidationResult::Valid.is_valid());
        assert!(!ValidationResult::Valid.is_invalid());

        let parse = ValidationResult::parse_error(170, 52, "unescaped '&'");
        assert!(parse.is_invalid());
        assert_eq!(parse.position(), Some((170, 52)));

        let io = ValidationResult::io_error("Permission denied (os error 13)");
        assert!(io.is_invalid());
        assert_eq!(io.position(), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(ValidationResult::Valid.describe(), None);
        assert_eq!(
            ValidationResult::parse_error(3, 17, "mismatched tag").describe(),
            Some("Line 3, Position 17: mismatched tag".to_string())
        );
        assert_eq!(
            ValidationResult::io_error("No such file or directory (os error 2)").describe(),
            Some("No such file or directory (os error 2)".to_string())
        );
    }

    #[test]
    fn test_aggregate_counts() {
        let results = ValidationResults::aggregate(vec![
            file_result("a.xaml", ValidationResult::Valid, false),
            file_result("b.xaml", ValidationResult::parse_error(1, 1, "bad"), false),
            file_result("MainWindow.xaml", ValidationResult::Valid, true),
        ]);

        assert_eq!(results.total_files, 3);
        assert_eq!(results.valid_files, 2);
        assert_eq!(results.invalid_files, 1);
        assert!(!results.all_valid());
        assert!(results.has_errors());

        let highlighted: Vec<_> = results
            .highlighted_files()
            .map(|r| r.record.relative_display_path.as_str())
            .collect();
        assert_eq!(highlighted, vec!["MainWindow.xaml"]);

        let invalid: Vec<_> = results
            .invalid_results()
            .map(|r| r.record.relative_display_path.as_str())
            .collect();
        assert_eq!(invalid, vec!["b.xaml"]);
    }

    #[test]
    fn test_all_valid_is_and_over_results() {
        let results = ValidationResults::aggregate(vec![
            file_result("a.xaml", ValidationResult::Valid, false),
            file_result("b.xaml", ValidationResult::Valid, false),
        ]);
        assert!(results.all_valid());

        // Vacuously true; the reporter refuses empty runs before getting here.
        assert!(ValidationResults::aggregate(Vec::new()).all_valid());
    }
}
