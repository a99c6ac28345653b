//! Mock process runner for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::runner::{CommandLine, ProcessHandle, ProcessRunner, ProcessStatus, RunnerError};

/// Scripted behavior of one mock process.
#[derive(Debug, Clone)]
pub struct MockScript {
    /// Exit code reported once the run time has elapsed.
    pub exit_code: i32,
    /// How long the process reports `Running`.
    pub run_time: Duration,
    /// Bytes written to the command's output file on exit, if any.
    pub output: Option<Vec<u8>>,
    /// Captured stderr.
    pub stderr: String,
    /// If set, `start` fails with a launch error carrying this reason.
    pub launch_error: Option<String>,
}

impl Default for MockScript {
    fn default() -> Self {
        Self {
            exit_code: 0,
            run_time: Duration::from_millis(10),
            output: Some(b"mock output".to_vec()),
            stderr: String::new(),
            launch_error: None,
        }
    }
}

impl MockScript {
    /// Exits with `code` and `stderr`, writing nothing.
    pub fn failing(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: code,
            output: None,
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    /// Cannot be launched at all.
    pub fn unlaunchable(reason: impl Into<String>) -> Self {
        Self {
            launch_error: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn with_run_time(mut self, run_time: Duration) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn with_output(mut self, output: Option<Vec<u8>>) -> Self {
        self.output = output;
        self
    }
}

/// Something that happened to a mock process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Started { command: String },
    Finished { command: String, exit_code: Option<i32> },
}

#[derive(Debug, Default)]
struct MockState {
    scripts: Vec<(String, MockScript)>,
    default_script: MockScript,
    events: Vec<MockEvent>,
    unavailable: Vec<String>,
    running: usize,
    peak_running: usize,
    kills: usize,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Mock implementation of the ProcessRunner trait.
///
/// Provides controllable behavior for testing:
/// - Script exit code, run time, stderr and output per command
/// - Record start/finish events for ordering assertions
/// - Track how many processes were running at once
///
/// The output file of a command is the word after `-o` if present,
/// otherwise the last word of the command line.
///
/// # Example
///
/// ```rust,ignore
/// use transpack_core::testing::{MockRunner, MockScript};
///
/// let runner = MockRunner::new();
/// runner.script("03.flac", MockScript::failing(1, "bad frame"));
///
/// let scheduler = JobScheduler::new(runner.clone(), config);
/// let result = scheduler.run(items).await?;
///
/// assert!(runner.peak_running() <= 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `script` for every command containing `pattern`.
    ///
    /// Earlier registrations win over later ones.
    pub fn script(&self, pattern: impl Into<String>, script: MockScript) {
        lock(&self.state).scripts.push((pattern.into(), script));
    }

    /// Script used when no pattern matches.
    pub fn set_default(&self, script: MockScript) {
        lock(&self.state).default_script = script;
    }

    /// Reports `program` as not installed.
    pub fn set_unavailable(&self, program: impl Into<String>) {
        lock(&self.state).unavailable.push(program.into());
    }

    /// All recorded events in order.
    pub fn events(&self) -> Vec<MockEvent> {
        lock(&self.state).events.clone()
    }

    /// Command lines in the order they were started.
    pub fn started(&self) -> Vec<String> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Started { command } => Some(command.clone()),
                MockEvent::Finished { .. } => None,
            })
            .collect()
    }

    /// Highest number of processes running at once.
    pub fn peak_running(&self) -> usize {
        lock(&self.state).peak_running
    }

    /// Processes currently running.
    pub fn running(&self) -> usize {
        lock(&self.state).running
    }

    /// Number of kill calls on handles.
    pub fn kills(&self) -> usize {
        lock(&self.state).kills
    }

    fn script_for(state: &MockState, command: &str) -> MockScript {
        state
            .scripts
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, script)| script.clone())
            .unwrap_or_else(|| state.default_script.clone())
    }
}

impl ProcessRunner for MockRunner {
    type Handle = MockHandle;

    fn name(&self) -> &str {
        "mock"
    }

    fn is_available(&self, program: &str) -> bool {
        !lock(&self.state).unavailable.iter().any(|p| p == program)
    }

    fn start(&self, command: &CommandLine) -> Result<MockHandle, RunnerError> {
        let mut state = lock(&self.state);
        if let Some(program) = command
            .programs()
            .iter()
            .find(|p| state.unavailable.contains(p))
        {
            return Err(RunnerError::launch(program.clone(), "not found in PATH"));
        }
        let script = Self::script_for(&state, command.as_str());

        if let Some(reason) = &script.launch_error {
            let program = command.programs().first().cloned().unwrap_or_default();
            return Err(RunnerError::launch(program, reason.clone()));
        }

        state.events.push(MockEvent::Started {
            command: command.as_str().to_string(),
        });
        state.running += 1;
        state.peak_running = state.peak_running.max(state.running);

        Ok(MockHandle {
            state: Arc::clone(&self.state),
            command: command.as_str().to_string(),
            output_path: output_path(command.as_str()),
            script,
            started: Instant::now(),
            exited: None,
        })
    }
}

/// Handle to a scripted mock process.
#[derive(Debug)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
    command: String,
    output_path: Option<PathBuf>,
    script: MockScript,
    started: Instant,
    exited: Option<ProcessStatus>,
}

impl MockHandle {
    fn exit(&mut self, status: ProcessStatus, exit_code: Option<i32>) {
        self.exited = Some(status);
        let mut state = lock(&self.state);
        state.running = state.running.saturating_sub(1);
        state.events.push(MockEvent::Finished {
            command: self.command.clone(),
            exit_code,
        });
    }
}

#[async_trait]
impl ProcessHandle for MockHandle {
    fn id(&self) -> Option<u32> {
        None
    }

    fn poll(&mut self) -> Result<ProcessStatus, RunnerError> {
        if let Some(status) = self.exited {
            return Ok(status);
        }
        if self.started.elapsed() < self.script.run_time {
            return Ok(ProcessStatus::Running);
        }

        if let (Some(bytes), Some(path)) = (&self.script.output, &self.output_path) {
            std::fs::write(path, bytes)?;
        }
        let code = self.script.exit_code;
        let status = if code == 0 {
            ProcessStatus::ExitedOk
        } else {
            ProcessStatus::ExitedError(Some(code))
        };
        self.exit(status, Some(code));
        Ok(status)
    }

    fn kill(&mut self) {
        lock(&self.state).kills += 1;
        if self.exited.is_none() {
            self.exit(ProcessStatus::ExitedError(None), None);
        }
    }

    async fn collect_stderr(&mut self) -> Vec<u8> {
        self.script.stderr.clone().into_bytes()
    }

    async fn collect_stdout(&mut self) -> Vec<u8> {
        Vec::new()
    }
}

/// Splits a command line rendered by `CommandTemplate` back into words.
fn shell_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_word = true;
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                    current.push(q);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

fn output_path(line: &str) -> Option<PathBuf> {
    let words = shell_words(line);
    let after_flag = words
        .iter()
        .position(|w| w == "-o")
        .and_then(|i| words.get(i + 1));
    after_flag.or(words.last()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{quote, wait_for_exit};

    #[test]
    fn test_shell_words_undo_quoting() {
        let arg = "It's a \"test\" [FLAC]";
        let line = format!("enc {} {}", quote(arg), quote("out.mp3"));
        assert_eq!(shell_words(&line), ["enc", arg, "out.mp3"]);
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path("enc a 'b c'"), Some(PathBuf::from("b c")));
        assert_eq!(output_path("mk -p -o x.torrent -a url dir"), Some(PathBuf::from("x.torrent")));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let runner = MockRunner::new();
        runner.script("bad", MockScript::failing(2, "boom"));
        let mut handle = runner.start(&CommandLine::raw("enc bad out")).unwrap();
        let status = wait_for_exit(&mut handle, Duration::from_millis(1)).await.unwrap();
        assert_eq!(status, ProcessStatus::ExitedError(Some(2)));
        assert_eq!(handle.collect_stderr().await, b"boom");
        assert_eq!(runner.running(), 0);
    }

    #[tokio::test]
    async fn test_output_written_on_exit() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out.mp3");
        let runner = MockRunner::new();
        let line = CommandLine::raw(format!("enc in.flac {}", quote(&out.to_string_lossy())));
        let mut handle = runner.start(&line).unwrap();
        assert!(!out.exists());
        wait_for_exit(&mut handle, Duration::from_millis(1)).await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"mock output");
    }

    #[test]
    fn test_launch_error() {
        let runner = MockRunner::new();
        runner.script("lame", MockScript::unlaunchable("not found"));
        let err = runner.start(&CommandLine::raw("lame a b")).unwrap_err();
        assert!(matches!(err, RunnerError::Launch { ref program, .. } if program == "lame"));
        assert!(runner.events().is_empty());
    }

    #[test]
    fn test_unavailable_program() {
        let runner = MockRunner::new();
        runner.set_unavailable("lame");
        assert!(!runner.is_available("lame"));
        assert!(runner.is_available("flac"));
        assert!(runner.start(&CommandLine::raw("flac -d a | lame - b")).is_err());
    }

    #[test]
    fn test_kill_before_exit() {
        let runner = MockRunner::new();
        runner.set_default(MockScript::default().with_run_time(Duration::from_secs(60)));
        let mut handle = runner.start(&CommandLine::raw("enc a b")).unwrap();
        assert_eq!(runner.running(), 1);
        handle.kill();
        assert_eq!(runner.running(), 0);
        assert_eq!(handle.poll().unwrap(), ProcessStatus::ExitedError(None));
    }
}
