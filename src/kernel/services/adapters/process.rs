//! tokio 进程适配器
//!
//! - `spawn`：stdout/stderr 逐行转发到输出面板，返回等待退出的句柄
//! - `output`：带超时的一次性捕获
//! - `interactive`：交给 UI 循环挂起终端后前台执行；没有 UI 时直接前台执行

use super::runtime::AppMessage;
use crate::kernel::services::ports::{
    CapturedOutput, CommandSpec, ExecError, OutputFuture, ProcessExit, ProcessHandle,
    ProcessSpawner,
};
use std::process::{ExitStatus, Stdio};
use std::sync::mpsc::Sender;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

pub const DEFAULT_OUTPUT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TokioProcessSpawner {
    handle: tokio::runtime::Handle,
    ui_tx: Option<Sender<AppMessage>>,
    output_timeout: Duration,
}

impl TokioProcessSpawner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            ui_tx: None,
            output_timeout: DEFAULT_OUTPUT_TIMEOUT,
        }
    }

    /// Routes output lines and terminal handover requests to the UI loop.
    pub fn with_ui(mut self, tx: Sender<AppMessage>) -> Self {
        self.ui_tx = Some(tx);
        self
    }

    pub fn with_output_timeout(mut self, timeout: Duration) -> Self {
        self.output_timeout = timeout;
        self
    }

    fn emit(&self, line: String) {
        if let Some(tx) = &self.ui_tx {
            let _ = tx.send(AppMessage::Output(line));
        }
    }
}

fn command(spec: &CommandSpec) -> Command {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (k, v) in &spec.env {
        cmd.env(k, v);
    }
    cmd
}

/// Reads until EOF. Invalid UTF-8 is decoded lossily and the pipe is never closed early,
/// otherwise the child dies of SIGPIPE on its next write.
async fn forward_lines<R>(reader: Option<R>, program: String, ui_tx: Option<Sender<AppMessage>>)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "output read failed, discarding the rest");
                let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
                return;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        tracing::debug!(program = %program, "{}", line);
        if let Some(tx) = &ui_tx {
            let _ = tx.send(AppMessage::Output(line.to_string()));
        }
    }
}

impl ProcessSpawner for TokioProcessSpawner {
    fn spawn(&self, spec: CommandSpec) -> Result<ProcessHandle, ExecError> {
        let _enter = self.handle.enter();
        let mut child = command(&spec)
            .spawn()
            .map_err(|source| ExecError::SpawnFailed {
                program: spec.program.clone(),
                source,
            })?;
        let pid = child.id();
        tracing::info!(pid = ?pid, command = %spec.display(), "process spawned");
        self.emit(format!("$ {}", spec.display()));

        let stdout_task = self.handle.spawn(forward_lines(
            child.stdout.take(),
            spec.program.clone(),
            self.ui_tx.clone(),
        ));
        let stderr_task = self.handle.spawn(forward_lines(
            child.stderr.take(),
            spec.program.clone(),
            self.ui_tx.clone(),
        ));

        let ui_tx = self.ui_tx.clone();
        let shown = spec.display();
        Ok(ProcessHandle::new(pid, async move {
            let status = child.wait().await;
            let _ = stdout_task.await;
            let _ = stderr_task.await;
            let exit = match status {
                Ok(status) => ProcessExit {
                    code: status.code(),
                },
                Err(e) => {
                    tracing::error!(command = %shown, error = %e, "failed to wait for process");
                    ProcessExit { code: None }
                }
            };
            if let Some(tx) = &ui_tx {
                let _ = tx.send(AppMessage::Output(format!("[{}] {}", exit, shown)));
            }
            exit
        }))
    }

    fn output(&self, spec: CommandSpec) -> OutputFuture {
        let mut cmd = command(&spec);
        cmd.kill_on_drop(true);
        let timeout = self.output_timeout;
        Box::pin(async move {
            let output = match tokio::time::timeout(timeout, cmd.output()).await {
                Ok(result) => result.map_err(|source| ExecError::SpawnFailed {
                    program: spec.program.clone(),
                    source,
                })?,
                Err(_) => {
                    tracing::error!(command = %spec.display(), "command timed out after {:?}", timeout);
                    return Err(ExecError::TimedOut {
                        program: spec.program.clone(),
                    });
                }
            };
            Ok(CapturedOutput {
                exit: ProcessExit {
                    code: output.status.code(),
                },
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        })
    }

    fn interactive(&self, spec: CommandSpec) -> Result<(), ExecError> {
        if let Some(tx) = &self.ui_tx {
            return tx.send(AppMessage::Interactive(spec)).map_err(|_| {
                ExecError::HostUnavailable("terminal handover channel closed".to_string())
            });
        }

        let status = run_foreground(&spec).map_err(|source| ExecError::SpawnFailed {
            program: spec.program.clone(),
            source,
        })?;
        tracing::info!(command = %spec.display(), status = %status, "interactive command finished");
        Ok(())
    }
}

/// Runs `spec` with the caller's stdio and blocks until it exits.
pub fn run_foreground(spec: &CommandSpec) -> std::io::Result<ExitStatus> {
    let mut cmd = std::process::Command::new(&spec.program);
    cmd.args(&spec.args).current_dir(&spec.cwd);
    for (k, v) in &spec.env {
        cmd.env(k, v);
    }
    cmd.status()
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/process.rs"]
mod tests;
