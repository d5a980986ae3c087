//! 外部进程边界：docker / docker compose 的调用契约
//!
//! kernel 只描述"要执行什么"（`CommandSpec`），真正的进程创建由宿主提供的
//! `ProcessSpawner` 完成，便于测试替换。

use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell-like rendering for logs and the output pane.
    pub fn display(&self) -> String {
        let mut out = self.program.clone();
        for arg in &self.args {
            out.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                out.push('"');
                out.push_str(arg);
                out.push('"');
            } else {
                out.push_str(arg);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn with_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

pub type ExitFuture = Pin<Box<dyn Future<Output = ProcessExit> + Send + 'static>>;
pub type OutputFuture =
    Pin<Box<dyn Future<Output = Result<CapturedOutput, ExecError>> + Send + 'static>>;

/// 已启动进程的句柄。
///
/// `wait` 消耗句柄本身，因此每个进程最多只能挂一个完成回调。
pub struct ProcessHandle {
    pid: Option<u32>,
    exit: ExitFuture,
}

impl ProcessHandle {
    pub fn new<F>(pid: Option<u32>, exit: F) -> Self
    where
        F: Future<Output = ProcessExit> + Send + 'static,
    {
        Self {
            pid,
            exit: Box::pin(exit),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub async fn wait(self) -> ProcessExit {
        self.exit.await
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub exit: ProcessExit,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit: ProcessExit::with_code(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// stdout followed by stderr; `docker logs` splits a container's streams across both.
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        if self.stdout.is_empty() {
            return self.stderr.clone();
        }
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        out.push_str(&self.stdout);
        if !self.stdout.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }
}

#[derive(Debug)]
pub enum ExecError {
    SpawnFailed { program: String, source: io::Error },
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    TimedOut { program: String },
    Parse(String),
    HostUnavailable(String),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::SpawnFailed { program, source } => {
                write!(f, "failed to spawn {}: {}", program, source)
            }
            ExecError::Failed {
                program,
                code,
                stderr,
            } => {
                let stderr = stderr.trim();
                match (code, stderr.is_empty()) {
                    (Some(code), true) => write!(f, "{} exited with code {}", program, code),
                    (Some(code), false) => {
                        write!(f, "{} exited with code {}: {}", program, code, stderr)
                    }
                    (None, true) => write!(f, "{} was terminated", program),
                    (None, false) => write!(f, "{} was terminated: {}", program, stderr),
                }
            }
            ExecError::TimedOut { program } => write!(f, "{} timed out", program),
            ExecError::Parse(msg) => write!(f, "unexpected output: {}", msg),
            ExecError::HostUnavailable(msg) => write!(f, "host unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::SpawnFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub trait ProcessSpawner: Send + Sync {
    /// Starts a state-changing command; its output goes to the host's output sink.
    fn spawn(&self, spec: CommandSpec) -> Result<ProcessHandle, ExecError>;

    /// Runs a command to completion and captures its output.
    fn output(&self, spec: CommandSpec) -> OutputFuture;

    /// Hands the terminal to the command (attach / shell).
    fn interactive(&self, spec: CommandSpec) -> Result<(), ExecError>;
}
