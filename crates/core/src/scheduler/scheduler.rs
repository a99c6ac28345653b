//! Bounded polling scheduler.

use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::SchedulerConfig;
use super::error::SchedulerError;
use super::types::{BatchResult, FailureKind, WorkItem};
use crate::metrics::{SCHEDULER_RUNNING, TRANSCODES_STARTED, TRANSCODES_TOTAL, TRANSCODE_DURATION};
use crate::runner::{ProcessHandle, ProcessRunner, ProcessStatus, RunnerError};

/// One execution lane of the pool.
enum Slot<H> {
    Idle,
    Running {
        item: WorkItem,
        handle: H,
        started: Instant,
    },
}

/// How a process left the Running state.
enum Exit {
    Success,
    Failure(Option<i32>),
    Lost(RunnerError),
}

impl<H> Slot<H> {
    fn is_running(&self) -> bool {
        matches!(self, Slot::Running { .. })
    }
}

/// Drives a batch of work items through at most `pool_size` concurrent
/// processes.
///
/// The work list is consumed from its end: the last item supplied is the
/// first dispatched.
pub struct JobScheduler<R: ProcessRunner> {
    runner: R,
    config: SchedulerConfig,
}

impl<R: ProcessRunner> JobScheduler<R> {
    pub fn new(runner: R, config: SchedulerConfig) -> Self {
        Self { runner, config }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs every item to completion.
    ///
    /// Per-item failures are collected in the returned [`BatchResult`]; the
    /// only error is an empty pool, reported before anything starts.
    pub async fn run(&self, items: Vec<WorkItem>) -> Result<BatchResult, SchedulerError> {
        let pool_size = self.config.pool_size;
        if pool_size < 1 {
            return Err(SchedulerError::InvalidPoolSize { pool_size });
        }

        let total = items.len();
        let mut pending = items;
        let mut slots: Vec<Slot<R::Handle>> = (0..pool_size).map(|_| Slot::Idle).collect();
        let mut result = BatchResult::default();

        debug!(
            runner = self.runner.name(),
            items = total,
            pool_size,
            "Starting batch"
        );

        loop {
            for index in 0..slots.len() {
                if let Slot::Running { handle, .. } = &mut slots[index] {
                    let exit = match handle.poll() {
                        Ok(ProcessStatus::Running) => continue,
                        Ok(ProcessStatus::ExitedOk) => Exit::Success,
                        Ok(ProcessStatus::ExitedError(code)) => Exit::Failure(code),
                        Err(e) => Exit::Lost(e),
                    };
                    if let Slot::Running {
                        item,
                        handle,
                        started,
                    } = std::mem::replace(&mut slots[index], Slot::Idle)
                    {
                        self.finish(item, handle, exit, started, &mut result).await;
                    }
                }

                if !slots[index].is_running() {
                    slots[index] = self.dispatch(&mut pending, &mut result);
                }
            }

            let running = slots.iter().filter(|slot| slot.is_running()).count();
            result.peak_running = result.peak_running.max(running);
            SCHEDULER_RUNNING.set(running as i64);

            if running == 0 && pending.is_empty() {
                break;
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }

        info!(
            dispatched = result.dispatched,
            completed = result.completed.len(),
            failed = result.failures.len(),
            "Batch finished"
        );
        Ok(result)
    }

    /// Pops items until one starts or the list is exhausted.
    fn dispatch(
        &self,
        pending: &mut Vec<WorkItem>,
        result: &mut BatchResult,
    ) -> Slot<R::Handle> {
        while let Some(item) = pending.pop() {
            result.dispatched += 1;
            result.dispatch_order.push(item.source.clone());

            let line = match item.command_line() {
                Ok(line) => line,
                Err(e) => {
                    error!(source = %item.source.display(), error = %e, "Cannot build command");
                    TRANSCODES_TOTAL
                        .with_label_values(&[FailureKind::Template.as_str()])
                        .inc();
                    result.record_failure(item, FailureKind::Template, e.to_string());
                    continue;
                }
            };

            match self.runner.start(&line) {
                Ok(handle) => {
                    info!("Transcoding {} ({} remaining)", item.display_name(), pending.len());
                    debug!(pid = ?handle.id(), command = %line, "Started encoder");
                    TRANSCODES_STARTED.inc();
                    return Slot::Running {
                        item,
                        handle,
                        started: Instant::now(),
                    };
                }
                Err(e) => {
                    error!(source = %item.source.display(), error = %e, "Cannot launch encoder");
                    TRANSCODES_TOTAL
                        .with_label_values(&[FailureKind::Launch.as_str()])
                        .inc();
                    result.record_failure(item, FailureKind::Launch, e.to_string());
                }
            }
        }
        Slot::Idle
    }

    /// Records the outcome of a process that is no longer running.
    async fn finish(
        &self,
        item: WorkItem,
        mut handle: R::Handle,
        exit: Exit,
        started: Instant,
        result: &mut BatchResult,
    ) {
        let elapsed = started.elapsed().as_secs_f64();

        let failure = match exit {
            Exit::Success => {
                handle.kill();
                verify_output(&item).await
            }
            Exit::Failure(code) => {
                let stderr = handle.collect_stderr().await;
                handle.kill();
                let diagnostic = String::from_utf8_lossy(&stderr).trim_end().to_string();
                error!(
                    source = %item.source.display(),
                    code = ?code,
                    "Transcode failed: {}",
                    diagnostic
                );
                Some((FailureKind::ExitStatus(code), diagnostic))
            }
            Exit::Lost(e) => {
                handle.kill();
                warn!(source = %item.source.display(), error = %e, "Lost track of encoder");
                Some((FailureKind::Lost, e.to_string()))
            }
        };

        let label = match &failure {
            Some((kind, _)) => kind.as_str(),
            None => "success",
        };
        TRANSCODES_TOTAL.with_label_values(&[label]).inc();
        TRANSCODE_DURATION.with_label_values(&[label]).observe(elapsed);

        match failure {
            Some((kind, diagnostic)) => result.record_failure(item, kind, diagnostic),
            None => {
                debug!(destination = %item.destination.display(), elapsed, "Transcode complete");
                result.completed.push(item);
            }
        }
    }
}

/// An encoder that exits 0 must still leave a non-empty destination file.
async fn verify_output(item: &WorkItem) -> Option<(FailureKind, String)> {
    match tokio::fs::metadata(&item.destination).await {
        Ok(meta) if meta.len() > 0 => None,
        Ok(_) => {
            error!(destination = %item.destination.display(), "Encoder produced an empty file");
            Some((
                FailureKind::EmptyOutput,
                format!("{} is empty", item.destination.display()),
            ))
        }
        Err(e) => {
            error!(destination = %item.destination.display(), error = %e, "Encoder produced no file");
            Some((
                FailureKind::MissingOutput,
                format!("{} was not created: {}", item.destination.display(), e),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandTemplate, ShellRunner};
    use tempfile::TempDir;

    fn scheduler(pool_size: usize) -> JobScheduler<ShellRunner> {
        JobScheduler::new(
            ShellRunner::new(),
            SchedulerConfig::with_pool_size(pool_size).with_poll_interval_ms(5),
        )
    }

    fn item(dir: &TempDir, name: &str, command: &str) -> WorkItem {
        WorkItem::new(
            dir.path().join(format!("{name}.src")),
            dir.path().join(format!("{name}.out")),
            CommandTemplate::new(command),
        )
    }

    #[tokio::test]
    async fn test_zero_pool_fails_fast() {
        let dir = TempDir::new().unwrap();
        let err = scheduler(0)
            .run(vec![item(&dir, "a", "touch {1}")])
            .await
            .unwrap_err();
        assert_eq!(err, SchedulerError::InvalidPoolSize { pool_size: 0 });
        assert!(!dir.path().join("a.out").exists());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let result = scheduler(2).run(Vec::new()).await.unwrap();
        assert_eq!(result.dispatched, 0);
        assert!(result.is_success());
        assert_eq!(result.peak_running, 0);
    }

    #[tokio::test]
    async fn test_lifo_dispatch_order() {
        let dir = TempDir::new().unwrap();
        let items: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| item(&dir, n, "echo data > {1}"))
            .collect();
        let result = scheduler(1).run(items).await.unwrap();
        let order: Vec<_> = result
            .dispatch_order
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(order, ["c", "b", "a"]);
        assert_eq!(result.completed.len(), 3);
        assert_eq!(result.peak_running, 1);
    }

    #[tokio::test]
    async fn test_exit_zero_with_empty_output() {
        let dir = TempDir::new().unwrap();
        let items = vec![
            item(&dir, "empty", "printf '' > {1}"),
            item(&dir, "missing", "true {1}"),
        ];
        let result = scheduler(2).run(items).await.unwrap();
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.empty_outputs(), 2);
        let kinds: Vec<_> = result.failures.iter().map(|f| f.kind).collect();
        assert!(kinds.contains(&FailureKind::EmptyOutput));
        assert!(kinds.contains(&FailureKind::MissingOutput));
    }

    #[tokio::test]
    async fn test_non_zero_exit_records_stderr() {
        let dir = TempDir::new().unwrap();
        let items = vec![item(&dir, "bad", "echo 'bad frame' >&2; exit 4")];
        let result = scheduler(1).run(items).await.unwrap();
        assert_eq!(result.failures.len(), 1);
        let failure = &result.failures[0];
        assert_eq!(failure.kind, FailureKind::ExitStatus(Some(4)));
        assert_eq!(failure.diagnostic, "bad frame");
    }

    #[tokio::test]
    async fn test_template_and_launch_failures_do_not_stall() {
        let dir = TempDir::new().unwrap();
        let items = vec![
            item(&dir, "ok", "echo data > {1}"),
            item(&dir, "template", "echo {5} > {1}"),
            item(&dir, "launch", "no-such-encoder-xyz {0} {1}"),
        ];
        let result = scheduler(1).run(items).await.unwrap();
        assert_eq!(result.dispatched, 3);
        assert_eq!(result.completed.len(), 1);
        let kinds: Vec<_> = result.failures.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, [FailureKind::Launch, FailureKind::Template]);
        assert!(result.error_kinds().contains(crate::ErrorKind::NoTranscoder));
    }
}
