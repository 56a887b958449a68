//! Report rendering
//!
//! Every line of the report is produced here. Nothing time- or
//! environment-dependent goes into the text, so repeated runs over an
//! unchanged tree print the same report.

use std::path::Path;

use crate::error::ValidationError;
use crate::validator::{FileValidationResult, ValidationResults};

const RULE_WIDTH: usize = 60;

/// Human-readable report formatter
#[derive(Debug, Clone, Copy)]
pub struct Output {
    show_colors: bool,
}

impl Output {
    /// Colorize only when stdout is a terminal
    pub fn new() -> Self {
        Self::with_colors(atty::is(atty::Stream::Stdout))
    }

    pub fn with_colors(show_colors: bool) -> Self {
        Self { show_colors }
    }

    pub fn plain() -> Self {
        Self::with_colors(false)
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn rule(&self) -> String {
        "=".repeat(RULE_WIDTH)
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}\n{}", title, self.rule())
    }

    pub fn format_file_count(&self, count: usize, suffix: &str) -> String {
        format!(
            "Found {} {} file{} to validate:\n",
            count,
            suffix,
            if count == 1 { "" } else { "s" }
        )
    }

    pub fn format_file_result(&self, result: &FileValidationResult) -> String {
        let path_display = result.record.relative_display_path.as_str();

        match result.result.describe() {
            None => {
                let mut output = format!("{}  {}", self.colorize("✓ VALID", "32"), path_display);
                if result.highlighted {
                    let name = result.record.file_name().unwrap_or(path_display);
                    output.push_str(&format!(
                        "\n    {} {} - primary fix target verified",
                        self.colorize("→", "36"),
                        name
                    ));
                }
                output
            }
            Some(detail) => format!(
                "{}  {}\n    Error: {}",
                self.colorize("✗ INVALID", "31"),
                path_display,
                detail
            ),
        }
    }

    pub fn format_summary(&self, results: &ValidationResults, success_notes: &[String]) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str(&self.rule());
        output.push('\n');

        if !results.has_errors() {
            output.push_str(&format!(
                "{} all {} {} well-formed XML\n",
                self.colorize("SUCCESS:", "32"),
                results.total_files,
                if results.total_files == 1 { "file is" } else { "files are" }
            ));
            for highlighted in results.highlighted_files() {
                output.push_str(&format!(
                    "{} {} parses cleanly\n",
                    self.colorize("✓", "32"),
                    highlighted.record.relative_display_path
                ));
            }
            if !success_notes.is_empty() {
                output.push('\n');
                for note in success_notes {
                    output.push_str(&format!("  • {}\n", note));
                }
            }
        } else {
            output.push_str(&format!(
                "{} {} of {} file{} still {} XML parsing errors\n",
                self.colorize("FAILURE:", "31"),
                results.invalid_files,
                results.total_files,
                if results.total_files == 1 { "" } else { "s" },
                if results.invalid_files == 1 { "has" } else { "have" }
            ));
        }

        output
    }

    /// Message for a run that stopped before checking any file
    pub fn format_precondition_error(&self, error: &ValidationError) -> String {
        format!("{} {}", self.colorize("✗", "31"), error)
    }

    pub fn format_root(&self, root: &Path) -> String {
        format!("Directory: {}", root.display())
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
