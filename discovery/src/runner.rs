//! geom invocation.
//!
//! [`run_geom`] validates a [`GeomRequest`], executes geom through a
//! [`GeomExecutor`], rejects unsuccessful exits and parses stdout. The
//! executor is a trait so that captured output can be replayed without a
//! FreeBSD host; [`SystemExecutor`] is the real implementation.
//!
//! # Example
//!
//! ```no_run
//! use geomscan_core::{DeviceClass, GeomCommand, GeomRequest};
//! use geomscan_discovery::config::GeomConfig;
//! use geomscan_discovery::runner::{SystemExecutor, run_geom};
//!
//! let executor = SystemExecutor::from_config(&GeomConfig::default()).unwrap();
//! let request = GeomRequest::new(GeomCommand::List, DeviceClass::Part);
//! let report = run_geom(&executor, &request).unwrap();
//! println!("{} geoms", report.geoms.len());
//! ```

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use geomscan_core::{GeomRequest, validate_request};
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

use crate::config::GeomConfig;
use crate::error::{DiscoverError, Result};
use crate::report::GeomReport;

/// Exit status and output streams of one geom run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes geom with the given arguments (class token first).
pub trait GeomExecutor {
    /// Runs geom and captures its output. A non-zero exit is not an error at
    /// this level; [`run_geom`] decides what to do with it.
    fn execute(&self, argv: &[String]) -> Result<CapturedOutput>;

    /// Human-readable command line, used in errors and logs.
    fn render(&self, argv: &[String]) -> String {
        render_command(Path::new(crate::config::GEOM_BINARY), argv)
    }
}

/// Renders a command line for display.
pub fn render_command(binary: &Path, argv: &[String]) -> String {
    if argv.is_empty() {
        binary.display().to_string()
    } else {
        format!("{} {}", binary.display(), argv.join(" "))
    }
}

/// Runs the real geom binary.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    binary: PathBuf,
    env: Vec<(String, String)>,
    timeout: Duration,
}

impl SystemExecutor {
    /// Resolves the binary and environment from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryNotFound`](DiscoverError::BinaryNotFound) when geom
    /// cannot be located.
    pub fn from_config(config: &GeomConfig) -> Result<Self> {
        Ok(Self {
            binary: config.resolve_binary()?,
            env: config.command_env(),
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

type PipeReader = JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<PipeReader> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(reader: Option<PipeReader>, stream: &str, command: &str) -> String {
    let Some(handle) = reader else {
        return String::new();
    };
    match handle.join() {
        Ok(Ok(buf)) => String::from_utf8_lossy(&buf).into_owned(),
        Ok(Err(err)) => {
            warn!(command, stream, error = %err, "Failed to read geom output");
            String::new()
        }
        Err(_) => {
            warn!(command, stream, "Output reader thread panicked");
            String::new()
        }
    }
}

impl GeomExecutor for SystemExecutor {
    fn execute(&self, argv: &[String]) -> Result<CapturedOutput> {
        let rendered = self.render(argv);
        let mut command = Command::new(&self.binary);
        command
            .args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &self.env {
            command.env(key, value);
        }

        debug!(command = %rendered, "Spawning geom");
        let mut child = command.spawn().map_err(|err| match err.kind() {
            ErrorKind::NotFound => DiscoverError::BinaryNotFound(self.binary.display().to_string()),
            _ => DiscoverError::Io(err),
        })?;

        // Drain both pipes concurrently so a full pipe buffer cannot stall
        // the child before it exits.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let Some(status) = child.wait_timeout(self.timeout)? else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(DiscoverError::Timeout {
                command: rendered,
                timeout_ms: self.timeout.as_millis() as u64,
            });
        };

        Ok(CapturedOutput {
            exit_code: status.code(),
            stdout: collect(stdout, "stdout", &rendered),
            stderr: collect(stderr, "stderr", &rendered),
        })
    }

    fn render(&self, argv: &[String]) -> String {
        render_command(&self.binary, argv)
    }
}

/// Validates the request, runs geom, and parses its output into a report.
///
/// # Errors
///
/// - [`InvalidRequest`](DiscoverError::InvalidRequest) if the device filter
///   is rejected; nothing is executed.
/// - [`SubprocessFailure`](DiscoverError::SubprocessFailure) if geom exits
///   unsuccessfully, carrying both output streams.
/// - [`Parse`](DiscoverError::Parse) if status output is malformed.
/// - Any executor error ([`Timeout`](DiscoverError::Timeout),
///   [`BinaryNotFound`](DiscoverError::BinaryNotFound), I/O).
pub fn run_geom(executor: &dyn GeomExecutor, request: &GeomRequest) -> Result<GeomReport> {
    validate_request(request)?;

    let argv = request.argv();
    let rendered = executor.render(&argv);
    let captured = executor.execute(&argv)?;

    if !captured.success() {
        warn!(command = %rendered, exit_code = ?captured.exit_code, "geom failed");
        return Err(DiscoverError::SubprocessFailure {
            command: rendered,
            exit_code: captured.exit_code,
            stdout: captured.stdout,
            stderr: captured.stderr,
        });
    }

    let run = crate::parse_output_with_report(request.command, &captured.stdout)?;
    info!(
        command = %rendered,
        entries = run.output.len(),
        warnings = run.warnings.len(),
        "Parsed geom output"
    );

    Ok(GeomReport::from_request(request, run))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use geomscan_core::{DeviceClass, GeomCommand};

    use super::*;

    /// Replays canned output and records the arguments it was called with.
    struct ReplayExecutor {
        output: CapturedOutput,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl ReplayExecutor {
        fn new(exit_code: i32, stdout: &str, stderr: &str) -> Self {
            Self {
                output: CapturedOutput {
                    exit_code: Some(exit_code),
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                },
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl GeomExecutor for ReplayExecutor {
        fn execute(&self, argv: &[String]) -> Result<CapturedOutput> {
            self.calls.borrow_mut().push(argv.to_vec());
            Ok(self.output.clone())
        }
    }

    #[test]
    fn test_list_request_passes_class_and_device() {
        let executor = ReplayExecutor::new(0, "Geom name: ada0\nscheme: GPT\n", "");
        let request = GeomRequest::new(GeomCommand::List, DeviceClass::Part).with_device("ada0");

        let report = run_geom(&executor, &request).unwrap();

        assert_eq!(executor.calls.borrow()[0], vec!["PART", "list", "ada0"]);
        let geoms = report.geoms.as_list().unwrap();
        assert_eq!(geoms["ada0"].get("scheme"), Some("GPT"));
        assert!(!report.changed);
    }

    #[test]
    fn test_status_request_uses_short_status() {
        let executor = ReplayExecutor::new(0, "gm0 COMPLETE ada0\n", "");
        let request = GeomRequest::new(GeomCommand::Status, DeviceClass::Mirror);

        let report = run_geom(&executor, &request).unwrap();

        assert_eq!(executor.calls.borrow()[0], vec!["MIRROR", "status", "-s"]);
        let entries = report.geoms.as_status().unwrap();
        assert_eq!(entries["gm0"].components.as_deref(), Some("ada0"));
    }

    #[test]
    fn test_non_zero_exit_is_surfaced_with_both_streams() {
        let executor = ReplayExecutor::new(1, "partial", "geom: Class 'RAID3' not found.");
        let request = GeomRequest::new(GeomCommand::List, DeviceClass::Raid3);

        let err = run_geom(&executor, &request).unwrap_err();
        match err {
            DiscoverError::SubprocessFailure {
                command,
                exit_code,
                stdout,
                stderr,
            } => {
                assert_eq!(command, "geom RAID3 list");
                assert_eq!(exit_code, Some(1));
                assert_eq!(stdout, "partial");
                assert!(stderr.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_device_is_rejected_before_execution() {
        let executor = ReplayExecutor::new(0, "", "");
        let request = GeomRequest::new(GeomCommand::List, DeviceClass::Part).with_device("ada0;ls");

        let err = run_geom(&executor, &request).unwrap_err();
        assert!(matches!(err, DiscoverError::InvalidRequest(_)));
        assert!(executor.calls.borrow().is_empty());
    }

    #[test]
    fn test_mirror_status_keeps_parsable_rows() {
        let executor = ReplayExecutor::new(
            0,
            "mirror/gm0 COMPLETE ada0 (ACTIVE)\n mirror/gm1 DEGRADED ada2\n",
            "",
        );
        let request = GeomRequest::new(GeomCommand::Status, DeviceClass::Mirror);

        let report = run_geom(&executor, &request).unwrap();
        let entries = report.geoms.as_status().unwrap();
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["mirror/gm1"]);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("found 4 field(s)"));
    }

    #[test]
    fn test_unusable_status_output_is_a_parse_error() {
        let executor = ReplayExecutor::new(0, "gm0 COMPLETE\n", "");
        let request = GeomRequest::new(GeomCommand::Status, DeviceClass::Mirror);

        let err = run_geom(&executor, &request).unwrap_err();
        assert!(matches!(err, DiscoverError::Parse(_)));
    }

    #[test]
    fn test_dropped_records_become_report_warnings() {
        let executor = ReplayExecutor::new(0, "scheme: GPT\n\nGeom name: ada1\n", "");
        let request = GeomRequest::default();

        let report = run_geom(&executor, &request).unwrap();
        assert_eq!(report.geoms.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("geom_name"));
    }

    #[test]
    fn test_render_command() {
        let argv = vec!["PART".to_string(), "list".to_string()];
        assert_eq!(render_command(Path::new("/sbin/geom"), &argv), "/sbin/geom PART list");
        assert_eq!(render_command(Path::new("geom"), &[]), "geom");
    }

    #[cfg(unix)]
    mod system {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        fn fake_geom(dir: &Path, script: &str) -> PathBuf {
            let path = dir.join("geom");
            fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn executor_for(path: PathBuf, timeout_ms: u64) -> SystemExecutor {
            let config = GeomConfig {
                geom_path: Some(path),
                timeout_ms,
                ..Default::default()
            };
            SystemExecutor::from_config(&config).unwrap()
        }

        #[test]
        fn test_system_executor_passes_args_and_locale() {
            let dir = tempfile::tempdir().unwrap();
            let path = fake_geom(dir.path(), r#"echo "$@"; echo "$LC_ALL" >&2"#);
            let executor = executor_for(path, 5_000);

            let argv = vec!["PART".to_string(), "list".to_string()];
            let captured = executor.execute(&argv).unwrap();

            assert!(captured.success());
            assert_eq!(captured.stdout.trim(), "PART list");
            assert_eq!(captured.stderr.trim(), "C");
        }

        #[test]
        fn test_system_executor_reports_exit_code() {
            let dir = tempfile::tempdir().unwrap();
            let path = fake_geom(dir.path(), "echo oops >&2; exit 3");
            let executor = executor_for(path, 5_000);

            let captured = executor.execute(&[]).unwrap();
            assert_eq!(captured.exit_code, Some(3));
            assert_eq!(captured.stderr.trim(), "oops");
        }

        #[test]
        fn test_system_executor_times_out() {
            let dir = tempfile::tempdir().unwrap();
            let path = fake_geom(dir.path(), "exec sleep 5");
            let executor = executor_for(path, 100);

            let err = executor.execute(&[]).unwrap_err();
            assert!(matches!(err, DiscoverError::Timeout { timeout_ms: 100, .. }));
        }
    }
}
