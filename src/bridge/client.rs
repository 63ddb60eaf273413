// ABOUTME: Process execution through an optional launcher with bounded timeouts.
// ABOUTME: Runs engine CLI commands either directly or inside a bridged profile.

use super::error::{Error, Result};
use super::path::to_bridge_path;
use super::profiles::decode_profile_list;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::borrow::Cow;
use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, Command};

pub const DEFAULT_LAUNCHER: &str = "wsl.exe";
pub const DEFAULT_PROFILE: &str = "Ubuntu";
pub const DEFAULT_MOUNT_PREFIX: &str = "/mnt";

/// Timeout for profile discovery.
const PROFILE_LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// How commands reach the engine CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Launcher program. `None` runs commands directly on this host.
    pub launcher: Option<String>,
    /// Profile (distribution) passed to the launcher.
    pub profile: String,
    /// Where host drives are mounted inside the profile.
    pub mount_prefix: String,
}

impl BridgeConfig {
    /// Run commands on this host without a launcher.
    pub fn direct() -> Self {
        Self {
            launcher: None,
            profile: String::new(),
            mount_prefix: DEFAULT_MOUNT_PREFIX.to_string(),
        }
    }

    /// Run commands inside a WSL distribution.
    pub fn wsl(profile: impl Into<String>) -> Self {
        Self {
            launcher: Some(DEFAULT_LAUNCHER.to_string()),
            profile: profile.into(),
            mount_prefix: DEFAULT_MOUNT_PREFIX.to_string(),
        }
    }

    pub fn launcher(mut self, launcher: impl Into<String>) -> Self {
        self.launcher = Some(launcher.into());
        self
    }

    pub fn mount_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mount_prefix = prefix.into();
        self
    }

    pub fn is_bridged(&self) -> bool {
        self.launcher.is_some()
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::wsl(DEFAULT_PROFILE)
    }
}

/// A fully resolved program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Output from a completed command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, or -1 when the process was terminated by a signal.
    pub exit_code: i32,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }
}

/// Lines from a long-running command, stdout and stderr interleaved.
pub type LineStream = BoxStream<'static, Result<String>>;

/// Executes invocations. Swappable so adapters can be driven by scripts in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, killing the process if `timeout` elapses.
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<CommandOutput>;

    /// Spawn and yield output lines until the process exits or the stream is dropped.
    async fn stream(&self, invocation: &Invocation) -> Result<LineStream>;
}

/// Runs invocations as local child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn(invocation: &Invocation) -> Result<Child> {
        Self::command(invocation).spawn().map_err(|source| Error::Spawn {
            program: invocation.program.clone(),
            source,
        })
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<CommandOutput> {
        let child = Self::spawn(invocation)?;

        // Dropping the pending future drops the child, which kills it.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(CommandOutput {
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: output.stdout,
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Err(_) => Err(Error::CommandTimeout(timeout)),
        }
    }

    async fn stream(&self, invocation: &Invocation) -> Result<LineStream> {
        let mut child = Self::spawn(invocation)?;
        let stdout = child.stdout.take().ok_or(Error::NoOutput)?;
        let stderr = child.stderr.take().ok_or(Error::NoOutput)?;

        let out = read_lines(BufReader::new(stdout).lines(), Some(child));
        let err = read_lines(BufReader::new(stderr).lines(), None);
        Ok(stream::select(out, err).boxed())
    }
}

/// Yield lines until EOF or the first read error. Holds `child` so the
/// process lives exactly as long as the stream.
fn read_lines<R>(lines: Lines<R>, child: Option<Child>) -> impl futures::Stream<Item = Result<String>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    stream::unfold(Some((lines, child)), |state| async move {
        let (mut lines, child) = state?;
        match lines.next_line().await {
            Ok(Some(line)) => Some((Ok(line), Some((lines, child)))),
            Ok(None) => None,
            Err(e) => Some((Err(Error::Io(e)), None)),
        }
    })
}

/// Engine CLI access, optionally through a launcher.
#[derive(Clone)]
pub struct Bridge {
    config: BridgeConfig,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("runner", &"<dyn CommandRunner>")
            .finish()
    }
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    /// Bridge that runs commands on this host.
    pub fn direct() -> Self {
        Self::new(BridgeConfig::direct())
    }

    pub fn with_runner(config: BridgeConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Wrap `program args...` for the launcher, if any.
    pub fn invocation(&self, program: &str, args: &[String]) -> Invocation {
        match &self.config.launcher {
            Some(launcher) => {
                let mut wrapped = Vec::with_capacity(args.len() + 4);
                if !self.config.profile.is_empty() {
                    wrapped.push("-d".to_string());
                    wrapped.push(self.config.profile.clone());
                }
                wrapped.push("--".to_string());
                wrapped.push(program.to_string());
                wrapped.extend(args.iter().cloned());
                Invocation::new(launcher.clone(), wrapped)
            }
            None => Invocation::new(program, args.iter().cloned()),
        }
    }

    /// Run `program args...` and collect its output.
    pub async fn exec(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        let invocation = self.invocation(program, args);
        tracing::debug!(command = %invocation, ?timeout, "bridge exec");
        self.runner.run(&invocation, timeout).await
    }

    /// Spawn `program args...` and stream its output lines.
    pub async fn stream(&self, program: &str, args: &[String]) -> Result<LineStream> {
        let invocation = self.invocation(program, args);
        tracing::debug!(command = %invocation, "bridge stream");
        self.runner.stream(&invocation).await
    }

    /// Translate a host path for use inside the bridge.
    pub fn host_path(&self, path: &str) -> String {
        if self.config.is_bridged() {
            to_bridge_path(path, &self.config.mount_prefix)
        } else {
            path.to_string()
        }
    }

    /// Profiles the launcher knows about. Empty for direct bridges.
    pub async fn profiles(&self) -> Result<Vec<String>> {
        let Some(launcher) = &self.config.launcher else {
            return Ok(Vec::new());
        };
        let invocation = Invocation::new(launcher.clone(), ["-l", "-q"]);
        tracing::debug!(command = %invocation, "listing bridge profiles");
        let output = self.runner.run(&invocation, PROFILE_LIST_TIMEOUT).await?;
        if !output.success() {
            tracing::warn!(stderr = %output.stderr.trim(), "profile listing failed");
            return Ok(Vec::new());
        }
        Ok(decode_profile_list(&output.stdout))
    }
}
