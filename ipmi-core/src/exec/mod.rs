//! Bounded execution of the external BMC tool.
//!
//! The collector talks to ipmitool only through the [`CommandExecutor`]
//! trait, so tests (and any non-production caller) can inject a substitute
//! at construction time instead of swapping a global.

use crate::command::CommandSpec;
use crate::error::{IpmiError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, instrument, warn};

/// Time a timed out process group gets between SIGTERM and SIGKILL.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// Runs a built command under a time budget.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `spec` and return its raw stdout.
    ///
    /// Fails with [`IpmiError::Timeout`] when `timeout` elapses (the process
    /// group is killed) and with [`IpmiError::Execution`] on spawn failure or a
    /// non-zero exit. Error command lines are always sanitized.
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<Vec<u8>>;
}

/// Executor backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct TokioExecutor {
    /// Working directory override.
    current_dir: Option<PathBuf>,
    /// Extra environment variables.
    env: Vec<(String, String)>,
}

impl TokioExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands from `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set an environment variable for every spawned command.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl CommandExecutor for TokioExecutor {
    #[instrument(skip_all, fields(command = %spec))]
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout also reaches anything the tool forks.
        #[cfg(unix)]
        cmd.process_group(0);

        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| IpmiError::Execution {
            command: spec.display(),
            reason: format!("failed to spawn: {}", e),
            stderr: String::new(),
            stdout: Vec::new(),
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let collect = async { tokio::join!(child.wait(), read_pipe(stdout), read_pipe(stderr)) };

        let outcome = tokio::time::timeout(timeout, collect).await;
        let (status, stdout, stderr) = match outcome {
            Ok(result) => result,
            Err(_) => {
                terminate(&mut child).await;
                return Err(IpmiError::Timeout { command: spec.display(), timeout });
            }
        };

        let status = status.map_err(|e| IpmiError::Execution {
            command: spec.display(),
            reason: format!("failed to wait: {}", e),
            stderr: String::new(),
            stdout: Vec::new(),
        })?;
        // A read error on either pipe only loses that pipe's content.
        let stdout = stdout.unwrap_or_default();
        let stderr = stderr.unwrap_or_default();

        if !status.success() {
            return Err(IpmiError::Execution {
                command: spec.display(),
                reason: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
                stdout,
            });
        }

        debug!(bytes = stdout.len(), "Command completed");
        Ok(stdout)
    }
}

/// Stop a timed out child and the rest of its process group.
///
/// The group gets SIGTERM, then SIGKILL after [`KILL_GRACE`]. Under sudo the
/// root-owned tool cannot be signalled directly; it is reached through sudo
/// relaying the SIGTERM.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            let group = -(pid as i32);
            unsafe {
                libc::kill(group, libc::SIGTERM);
            }
            let exited = tokio::time::timeout(KILL_GRACE, child.wait()).await.is_ok();
            unsafe {
                libc::kill(group, libc::SIGKILL);
            }
            if exited {
                return;
            }
        }
    }

    if let Err(e) = child.kill().await {
        warn!(error = %e, "Failed to kill timed out command");
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandSpec {
        let mut spec = CommandSpec::new("sh");
        spec.arg("-c").arg(script);
        spec
    }

    #[tokio::test]
    async fn test_returns_stdout() {
        let out = TokioExecutor::new()
            .run(&shell("printf 'Chassis Power is on\\n'"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, b"Chassis Power is on\n");
    }

    #[tokio::test]
    async fn test_env_and_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let executor = TokioExecutor::new().current_dir(dir.path()).env("IPMI_TEST_VALUE", "42");
        let out = executor
            .run(&shell("printf '%s' \"$IPMI_TEST_VALUE\"; pwd"), Duration::from_secs(5))
            .await
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("42"));
        let dir_name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(out.trim_end().ends_with(&dir_name));
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let mut spec = CommandSpec::new("sleep");
        spec.arg("10");
        let started = std::time::Instant::now();
        let err = TokioExecutor::new().run(&spec, Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, IpmiError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    /// True while `pid` runs. Zombies count as gone.
    #[cfg(target_os = "linux")]
    fn process_alive(pid: i32) -> bool {
        if unsafe { libc::kill(pid, 0) } != 0 {
            return false;
        }
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => !stat.rsplit(')').next().is_some_and(|rest| rest.trim_start().starts_with('Z')),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_kills_forked_children() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = dir.path().join("sleeper.pid");
        let script = format!("sleep 30 & echo $! > '{}'; wait", pidfile.display());

        let err = TokioExecutor::new().run(&shell(&script), Duration::from_millis(300)).await.unwrap_err();
        assert!(matches!(err, IpmiError::Timeout { .. }));

        let pid: i32 = std::fs::read_to_string(&pidfile).unwrap().trim().parse().unwrap();
        let mut alive = true;
        for _ in 0..40 {
            if !process_alive(pid) {
                alive = false;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!alive, "forked child {} outlived the timeout", pid);
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_partial_stdout() {
        let err = TokioExecutor::new()
            .run(
                &shell("echo 'Fan1 | 30h | ok | 7.1 | 5040 RPM'; echo boom >&2; exit 3"),
                Duration::from_secs(5),
            )
            .await
            .unwrap_err();
        match err {
            IpmiError::Execution { stderr, stdout, reason, .. } => {
                assert_eq!(stderr, "boom");
                assert!(reason.contains('3'));
                assert!(String::from_utf8_lossy(&stdout).contains("5040 RPM"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_is_sanitized() {
        let mut spec = CommandSpec::new("/nonexistent/ipmitool");
        spec.arg("-P").secret_arg("hunter2").arg("sdr");
        let err = TokioExecutor::new().run(&spec, Duration::from_secs(1)).await.unwrap_err();
        match &err {
            IpmiError::Execution { command, .. } => {
                assert!(!command.contains("hunter2"));
                assert!(command.contains("REDACTED"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!err.to_string().contains("hunter2"));
    }
}
