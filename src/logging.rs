//! Execution logger - Format and emit the per-call status line

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{SecondsFormat, Utc};
use console::style;
use thiserror::Error;

use crate::options::FileSinkConfig;
use crate::outcome::ExecutionTime;

/// Console-like destination for log lines.
///
/// `Stderr` is the default process sink and gets cosmetic coloring.
/// `Capture` collects the plain (uncolored) lines, so tests can assert on
/// emitted output without touching process-wide streams.
#[derive(Debug, Clone, Default)]
pub enum ConsoleSink {
    #[default]
    Stderr,
    Capture(Arc<Mutex<Vec<String>>>),
}

impl ConsoleSink {
    /// A capturing sink plus the handle its lines land in.
    pub fn capture() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (ConsoleSink::Capture(lines.clone()), lines)
    }

    fn emit(&self, plain: &str, colored: String) {
        match self {
            ConsoleSink::Stderr => eprintln!("{colored}"),
            ConsoleSink::Capture(lines) => {
                let mut lines = lines.lock().unwrap_or_else(|e| e.into_inner());
                lines.push(plain.to_string());
            }
        }
    }
}

/// Faults in the file sink itself. Reported to stderr, never propagated to
/// the instrumented call.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to append to log file {path}: {source}")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Emit one execution log entry.
///
/// Line 1 is the status line:
/// `[X8T <SUCCESS|ERROR> - <timestamp>] Function "<name>" <executed|failed> in <N>ms`.
/// Line 2, `Debug Info: <detail>`, follows when `is_error` or
/// `include_result` is set. The file sink (if any) gets the same status line
/// appended, with the detail line governed by its own `log_result` flag.
///
/// Never panics and never returns an error: a broken file sink degrades to a
/// stderr warning so the wrapped call's outcome is unaffected.
pub fn log_execution(
    function_name: &str,
    execution_time: ExecutionTime,
    detail: &str,
    is_error: bool,
    include_result: bool,
    console: &ConsoleSink,
    file_sink: Option<&FileSinkConfig>,
) {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let tag = if is_error { "ERROR" } else { "SUCCESS" };
    let status = if is_error { "failed" } else { "executed" };

    let message = format!(
        "[X8T {tag} - {timestamp}] Function \"{function_name}\" {status} in {execution_time}"
    );
    let debug_line = format!("Debug Info: {detail}");

    let colored_message = if is_error {
        style(&message).red().to_string()
    } else {
        style(&message).green().to_string()
    };
    console.emit(&message, colored_message);

    if is_error || include_result {
        let colored_debug = format!("{} {detail}", style("Debug Info:").cyan());
        console.emit(&debug_line, colored_debug);
    }

    if let Some(sink) = file_sink {
        let with_detail = is_error || sink.log_result;
        let detail_line = with_detail.then_some(debug_line.as_str());
        if let Err(e) = append_entry(&sink.path, &message, detail_line) {
            eprintln!("x8t: {e}");
        }
    }
}

// Shared exit path for the executors: resolve the label and emit once,
// after the outcome is determined.
pub(crate) fn log_outcome<T: std::fmt::Debug>(
    outcome: &crate::outcome::ExecutionOutcome<T>,
    options: &crate::options::ExecutionOptions,
    fallback_label: &str,
) {
    use crate::outcome::ExecutionOutcome;

    if !options.log {
        return;
    }
    let label = options.label.as_deref().unwrap_or(fallback_label);
    let file_sink = options.log_to_file.as_ref();

    match outcome {
        ExecutionOutcome::Success {
            result,
            execution_time,
        } => log_execution(
            label,
            *execution_time,
            &format!("{result:?}"),
            false,
            options.log_result,
            &options.console,
            file_sink,
        ),
        ExecutionOutcome::Failure {
            error,
            execution_time,
        } => log_execution(
            label,
            *execution_time,
            &error.to_string(),
            true,
            options.log_result,
            &options.console,
            file_sink,
        ),
    }
}

fn append_entry(path: &Path, message: &str, detail_line: Option<&str>) -> Result<(), SinkError> {
    let lock = path_lock(path);
    let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let mut entry = format!("{message}\n");
    if let Some(detail) = detail_line {
        entry.push_str(detail);
        entry.push('\n');
    }

    file.write_all(entry.as_bytes())
        .map_err(|source| SinkError::Append {
            path: path.to_path_buf(),
            source,
        })
}

// Concurrent invocations may share a log file; appends to the same path are
// serialized process-wide so interleaved partial lines cannot occur.
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let locks = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut locks = locks.lock().unwrap_or_else(|e| e.into_inner());
    locks.entry(path.to_path_buf()).or_default().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn time_ms(ms: u64) -> ExecutionTime {
        ExecutionTime::from_elapsed(Duration::from_millis(ms))
    }

    #[test]
    fn test_status_line_format() {
        let (sink, lines) = ConsoleSink::capture();
        log_execution("fetch_users", time_ms(123), "3 rows", false, false, &sink, None);

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[X8T SUCCESS - "));
        assert!(lines[0].ends_with("] Function \"fetch_users\" executed in 123ms"));
    }

    #[test]
    fn test_success_with_result_emits_debug_line() {
        let (sink, lines) = ConsoleSink::capture();
        log_execution("fetch_users", time_ms(1), "3 rows", false, true, &sink, None);

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Debug Info: 3 rows");
    }

    #[test]
    fn test_error_always_emits_debug_line() {
        let (sink, lines) = ConsoleSink::capture();
        log_execution("fetch_users", time_ms(1), "boom", true, false, &sink, None);

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[X8T ERROR - "));
        assert!(lines[0].contains("\"fetch_users\" failed in 1ms"));
        assert_eq!(lines[1], "Debug Info: boom");
    }

    #[test]
    fn test_file_sink_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exec.log");
        let sink = FileSinkConfig::new(&path);
        let (console, _) = ConsoleSink::capture();

        for i in 0..3 {
            log_execution(&format!("call_{i}"), time_ms(i), "", false, false, &console, Some(&sink));
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.contains(&format!("\"call_{i}\" executed in {i}ms")));
        }
    }

    #[test]
    fn test_file_sink_result_flag_is_independent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exec.log");
        let sink = FileSinkConfig::new(&path).with_result();
        let (console, lines) = ConsoleSink::capture();

        // Stream includeResult is off, sink logResult is on.
        log_execution("calc", time_ms(2), "42", false, false, &console, Some(&sink));

        assert_eq!(lines.lock().unwrap().len(), 1);
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Debug Info: 42");
    }

    #[test]
    fn test_file_sink_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exec.log");
        std::fs::write(&path, "existing line\n").unwrap();
        let (console, _) = ConsoleSink::capture();

        log_execution("calc", time_ms(2), "", false, false, &console, Some(&FileSinkConfig::new(&path)));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("existing line\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exec.log");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                thread::spawn(move || {
                    let (console, _) = ConsoleSink::capture();
                    for _ in 0..10 {
                        log_execution(
                            &format!("worker_{i}"),
                            time_ms(1),
                            "",
                            false,
                            false,
                            &console,
                            Some(&FileSinkConfig::new(&path)),
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 80);
        assert!(content.lines().all(|l| l.starts_with("[X8T SUCCESS - ")));
    }

    #[test]
    fn test_broken_file_sink_does_not_panic() {
        let sink = FileSinkConfig::new("/nonexistent-dir/exec.log");
        let (console, lines) = ConsoleSink::capture();

        log_execution("calc", time_ms(2), "", false, false, &console, Some(&sink));

        // Console output still happened despite the sink fault.
        assert_eq!(lines.lock().unwrap().len(), 1);
    }
}
