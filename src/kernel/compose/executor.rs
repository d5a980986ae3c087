//! 两类执行器：直接针对单个容器的 `docker`，以及带项目上下文的 `docker compose`。
//!
//! 执行器只负责拼装参数，进程本身交给 `ProcessSpawner`。

use crate::kernel::services::ports::{
    CapturedOutput, CommandSpec, ExecError, ProcessHandle, ProcessSpawner,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Spawned compose output goes to the output pane line by line; no colours or cursor moves.
const PLAIN_OUTPUT_ENV: (&str, &str) = ("COMPOSE_ANSI", "never");

#[derive(Clone)]
pub struct DockerExecutor {
    program: String,
    cwd: PathBuf,
    spawner: Arc<dyn ProcessSpawner>,
}

impl DockerExecutor {
    pub fn new(program: impl Into<String>, cwd: &Path, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            program: program.into(),
            cwd: cwd.to_path_buf(),
            spawner,
        }
    }

    pub fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(self.program.clone(), &self.cwd).args(args)
    }

    pub fn spawn<I, S>(&self, args: I) -> Result<ProcessHandle, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.command(args);
        tracing::debug!(command = %spec.display(), "docker spawn");
        self.spawner.spawn(spec)
    }

    pub async fn output<I, S>(&self, args: I) -> Result<CapturedOutput, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.command(args);
        tracing::debug!(command = %spec.display(), "docker output");
        checked(self.spawner.output(spec.clone()).await?, &spec)
    }

    pub fn interactive<I, S>(&self, args: I) -> Result<(), ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.command(args);
        tracing::debug!(command = %spec.display(), "docker interactive");
        self.spawner.interactive(spec)
    }

    pub fn start(&self, container: &str) -> Result<ProcessHandle, ExecError> {
        self.spawn(["start", container])
    }

    pub fn stop(&self, container: &str) -> Result<ProcessHandle, ExecError> {
        self.spawn(["stop", container])
    }

    pub fn restart(&self, container: &str) -> Result<ProcessHandle, ExecError> {
        self.spawn(["restart", container])
    }

    pub fn kill(&self, container: &str) -> Result<ProcessHandle, ExecError> {
        self.spawn(["kill", container])
    }

    pub fn attach(&self, container: &str) -> Result<(), ExecError> {
        self.interactive(["attach", container])
    }

    pub fn exec_shell(&self, container: &str, shell: &str) -> Result<(), ExecError> {
        self.interactive(["exec", "-it", container, shell])
    }

    pub async fn logs(&self, container: &str, tail: Option<u32>) -> Result<String, ExecError> {
        let mut args = vec!["logs".to_string()];
        if let Some(tail) = tail {
            args.push("--tail".to_string());
            args.push(tail.to_string());
        }
        args.push(container.to_string());
        Ok(self.output(args).await?.combined())
    }
}

impl fmt::Debug for DockerExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockerExecutor")
            .field("program", &self.program)
            .field("cwd", &self.cwd)
            .finish()
    }
}

#[derive(Clone)]
pub struct ComposeExecutor {
    program: String,
    /// Leading args of the compose command itself (`compose` for `docker compose`).
    program_args: Vec<String>,
    files: Vec<String>,
    shell: String,
    project_name: String,
    cwd: PathBuf,
    spawner: Arc<dyn ProcessSpawner>,
}

pub struct ComposeExecutorConfig<'a> {
    pub program: &'a str,
    pub program_args: &'a [String],
    pub files: &'a [String],
    pub shell: &'a str,
    pub project_name: &'a str,
    pub cwd: &'a Path,
}

impl ComposeExecutor {
    pub fn new(config: ComposeExecutorConfig<'_>, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            program: config.program.to_string(),
            program_args: config.program_args.to_vec(),
            files: config.files.to_vec(),
            shell: config.shell.to_string(),
            project_name: config.project_name.to_string(),
            cwd: config.cwd.to_path_buf(),
            spawner,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// `<compose> -p <project> [-f <file>]... <args>`
    pub fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = CommandSpec::new(self.program.clone(), &self.cwd)
            .args(self.program_args.iter().cloned())
            .arg("-p")
            .arg(self.project_name.clone());
        for file in &self.files {
            spec = spec.arg("-f").arg(file.clone());
        }
        spec.args(args)
    }

    pub fn spawn<I, S>(&self, args: I) -> Result<ProcessHandle, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.command(args).env(PLAIN_OUTPUT_ENV.0, PLAIN_OUTPUT_ENV.1);
        tracing::debug!(project = %self.project_name, command = %spec.display(), "compose spawn");
        self.spawner.spawn(spec)
    }

    pub async fn output<I, S>(&self, args: I) -> Result<CapturedOutput, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.command(args);
        tracing::debug!(project = %self.project_name, command = %spec.display(), "compose output");
        checked(self.spawner.output(spec.clone()).await?, &spec)
    }

    pub fn interactive<I, S>(&self, args: I) -> Result<(), ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.command(args);
        tracing::debug!(
            project = %self.project_name,
            command = %spec.display(),
            "compose interactive"
        );
        self.spawner.interactive(spec)
    }

    /// Runs `<verb> [service]`.
    pub fn lifecycle(
        &self,
        verb: ComposeVerb,
        service: Option<&str>,
    ) -> Result<ProcessHandle, ExecError> {
        let mut args: Vec<String> = verb.args().iter().map(|s| s.to_string()).collect();
        if let Some(service) = service {
            if verb == ComposeVerb::Down {
                // `down` has no per-service form; stop and remove just that service.
                args = vec!["rm".into(), "--stop".into(), "--force".into()];
            }
            args.push(service.to_string());
        }
        self.spawn(args)
    }

    pub async fn service_names(&self) -> Result<Vec<String>, ExecError> {
        let out = self.output(["config", "--services"]).await?;
        Ok(out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn ps_json(&self, service: Option<&str>) -> Result<String, ExecError> {
        let mut args = vec!["ps", "--all", "--format", "json"];
        if let Some(service) = service {
            args.push(service);
        }
        Ok(self.output(args).await?.stdout)
    }

    pub fn follow_logs(&self, service: &str) -> Result<(), ExecError> {
        self.interactive(["logs", "--follow", service])
    }

    pub fn exec_shell(&self, service: &str) -> Result<(), ExecError> {
        self.interactive(["exec", service, self.shell.as_str()])
    }

    pub async fn logs(&self, service: &str, tail: Option<u32>) -> Result<String, ExecError> {
        let mut args = vec!["logs".to_string(), "--no-color".to_string()];
        if let Some(tail) = tail {
            args.push("--tail".to_string());
            args.push(tail.to_string());
        }
        args.push(service.to_string());
        Ok(self.output(args).await?.combined())
    }
}

impl fmt::Debug for ComposeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeExecutor")
            .field("program", &self.program)
            .field("project_name", &self.project_name)
            .field("files", &self.files)
            .field("cwd", &self.cwd)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposeVerb {
    Up,
    Down,
    Start,
    Stop,
    Restart,
    Build,
    Kill,
}

impl ComposeVerb {
    fn args(self) -> &'static [&'static str] {
        match self {
            ComposeVerb::Up => &["up", "-d"],
            ComposeVerb::Down => &["down"],
            ComposeVerb::Start => &["start"],
            ComposeVerb::Stop => &["stop"],
            ComposeVerb::Restart => &["restart"],
            ComposeVerb::Build => &["build"],
            ComposeVerb::Kill => &["kill"],
        }
    }
}

fn checked(out: CapturedOutput, spec: &CommandSpec) -> Result<CapturedOutput, ExecError> {
    if out.exit.success() {
        return Ok(out);
    }
    Err(ExecError::Failed {
        program: spec.program.clone(),
        code: out.exit.code,
        stderr: out.stderr,
    })
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compose/executor.rs"]
mod tests;
