//! Options schema - Per-call configuration for the executors

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::ConsoleSink;

/// Per-call execution options.
///
/// Logging is opt-in: nothing is emitted unless `log` is set. All fields
/// have defaults, so `ExecutionOptions::default()` is a silent run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOptions {
    /// Emit a log entry for this call. Default: false.
    #[serde(default)]
    pub log: bool,

    /// Include the success value in the emitted log. Errors are always
    /// included regardless of this flag. Default: false.
    #[serde(default)]
    pub log_result: bool,

    /// Human-readable label for the unit of work. Closures carry no runtime
    /// name, so without this the log falls back to `"anonymous"` (callables)
    /// or `"promise"` (bare futures).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Append the log entry to a file as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_to_file: Option<FileSinkConfig>,

    /// Console capability. Defaults to stderr; tests substitute
    /// [`ConsoleSink::capture`] instead of patching process-wide streams.
    #[serde(skip, default)]
    pub console: ConsoleSink,
}

impl ExecutionOptions {
    /// Options with logging enabled and everything else defaulted.
    pub fn logged() -> Self {
        ExecutionOptions {
            log: true,
            ..ExecutionOptions::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_result(mut self) -> Self {
        self.log_result = true;
        self
    }

    pub fn with_file(mut self, sink: FileSinkConfig) -> Self {
        self.log_to_file = Some(sink);
        self
    }

    pub fn with_console(mut self, console: ConsoleSink) -> Self {
        self.console = console;
        self
    }
}

/// File sink configuration: append entries to `path`.
///
/// `log_result` here is independent of the stream-side flag, so a file can
/// keep full detail while the console stays terse, or vice versa.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSinkConfig {
    pub path: PathBuf,

    /// Also append the `Debug Info:` line on success. Errors always get it.
    #[serde(default)]
    pub log_result: bool,
}

impl FileSinkConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSinkConfig {
            path: path.into(),
            log_result: false,
        }
    }

    pub fn with_result(mut self) -> Self {
        self.log_result = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_silent() {
        let options = ExecutionOptions::default();
        assert!(!options.log);
        assert!(!options.log_result);
        assert!(options.label.is_none());
        assert!(options.log_to_file.is_none());
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let options: ExecutionOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.log);
        assert!(!options.log_result);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let json = r#"{
            "log": true,
            "logResult": true,
            "logToFile": { "path": "/tmp/x8t.log" }
        }"#;

        let options: ExecutionOptions = serde_json::from_str(json).unwrap();
        assert!(options.log);
        assert!(options.log_result);

        let sink = options.log_to_file.unwrap();
        assert_eq!(sink.path, PathBuf::from("/tmp/x8t.log"));
        assert!(!sink.log_result);
    }

    #[test]
    fn test_builder_helpers() {
        let options = ExecutionOptions::logged()
            .with_label("fetch_users")
            .with_result()
            .with_file(FileSinkConfig::new("exec.log").with_result());

        assert!(options.log);
        assert!(options.log_result);
        assert_eq!(options.label.as_deref(), Some("fetch_users"));
        assert!(options.log_to_file.unwrap().log_result);
    }
}
