//! Types for the scheduler module.

use std::path::{Path, PathBuf};

use crate::outcome::{ErrorKind, ErrorSet};
use crate::runner::{CommandLine, CommandTemplate, TemplateError};

/// One source to destination conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Input file.
    pub source: PathBuf,
    /// Output file the command is expected to produce.
    pub destination: PathBuf,
    /// Command with `{0}` = source, `{1}` = destination, `{2}..` = tags.
    pub command: CommandTemplate,
    /// Free-form substitution values following the two paths.
    pub tags: Vec<String>,
}

impl WorkItem {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        command: CommandTemplate,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            command,
            tags: Vec::new(),
        }
    }

    /// Sets the substitution values after source and destination.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Arguments in placeholder order.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(2 + self.tags.len());
        args.push(self.source.to_string_lossy().into_owned());
        args.push(self.destination.to_string_lossy().into_owned());
        args.extend(self.tags.iter().cloned());
        args
    }

    /// Renders the command for this item.
    pub fn command_line(&self) -> Result<CommandLine, TemplateError> {
        self.command.render(&self.arguments())
    }

    /// Short name used in log lines.
    pub fn display_name(&self) -> String {
        file_name(&self.source)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Why a work item failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The command template could not be rendered.
    Template,
    /// The encoder could not be launched.
    Launch,
    /// The encoder exited non-zero (`None` when killed by a signal).
    ExitStatus(Option<i32>),
    /// The process status could no longer be queried.
    Lost,
    /// Exit 0 but no destination file.
    MissingOutput,
    /// Exit 0 but a zero-byte destination file.
    EmptyOutput,
}

impl FailureKind {
    /// The exit-status category this failure belongs to.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Self::Launch => ErrorKind::NoTranscoder,
            _ => ErrorKind::TranscodeError,
        }
    }

    /// Label used for the `result` metric dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template_error",
            Self::Launch => "launch_error",
            Self::ExitStatus(_) => "exit_error",
            Self::Lost => "lost",
            Self::MissingOutput => "missing_output",
            Self::EmptyOutput => "empty_output",
        }
    }
}

/// A failed work item with its diagnostic text (stderr, launch reason).
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub item: WorkItem,
    pub kind: FailureKind,
    pub diagnostic: String,
}

/// Outcome of one scheduler run.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Number of items taken off the work list.
    pub dispatched: usize,
    /// Items that exited 0 with a non-empty output file.
    pub completed: Vec<WorkItem>,
    /// Items that failed, in the order their failure was observed.
    pub failures: Vec<ItemFailure>,
    /// Sources in the order they were dispatched.
    pub dispatch_order: Vec<PathBuf>,
    /// Highest number of simultaneously running processes observed.
    pub peak_running: usize,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Items whose encoder reported success but left no usable output.
    pub fn empty_outputs(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f.kind, FailureKind::MissingOutput | FailureKind::EmptyOutput))
            .count()
    }

    /// Distinct exit-status categories of all failures.
    pub fn error_kinds(&self) -> ErrorSet {
        self.failures.iter().map(|f| f.kind.error_kind()).collect()
    }

    pub(crate) fn record_failure(&mut self, item: WorkItem, kind: FailureKind, diagnostic: String) {
        self.failures.push(ItemFailure {
            item,
            kind,
            diagnostic,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> WorkItem {
        WorkItem::new(
            "/music/Album/01 Intro.flac",
            "/out/Album [V0]/01 Intro.mp3",
            CommandTemplate::new("lame {0} {1} --tt {2}"),
        )
        .with_tags(vec!["It's".to_string()])
    }

    #[test]
    fn test_arguments_order() {
        let args = item().arguments();
        assert_eq!(args[0], "/music/Album/01 Intro.flac");
        assert_eq!(args[1], "/out/Album [V0]/01 Intro.mp3");
        assert_eq!(args[2], "It's");
    }

    #[test]
    fn test_command_line_quotes_arguments() {
        let line = item().command_line().unwrap();
        assert_eq!(
            line.as_str(),
            "lame '/music/Album/01 Intro.flac' '/out/Album [V0]/01 Intro.mp3' --tt 'It'\"'\"'s'"
        );
    }

    #[test]
    fn test_missing_tag_is_template_error() {
        let item = WorkItem::new("a", "b", CommandTemplate::new("x {0} {1} {2}"));
        assert!(matches!(
            item.command_line(),
            Err(TemplateError::MissingArgument { index: 2, .. })
        ));
    }

    #[test]
    fn test_failure_kind_mapping() {
        assert_eq!(FailureKind::Launch.error_kind(), ErrorKind::NoTranscoder);
        assert_eq!(
            FailureKind::ExitStatus(Some(1)).error_kind(),
            ErrorKind::TranscodeError
        );
        assert_eq!(FailureKind::EmptyOutput.error_kind(), ErrorKind::TranscodeError);
    }

    #[test]
    fn test_batch_result_summaries() {
        let mut result = BatchResult::default();
        assert!(result.is_success());
        result.record_failure(item(), FailureKind::EmptyOutput, String::new());
        result.record_failure(item(), FailureKind::Launch, "lame: not found".into());
        assert!(!result.is_success());
        assert_eq!(result.empty_outputs(), 1);
        assert_eq!(result.error_kinds().bits(), 512 | 128);
    }
}
