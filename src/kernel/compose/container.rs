//! 容器：`docker compose ps --format json` 的解析结果加上直接操作容器的执行器。

use super::executor::DockerExecutor;
use crate::kernel::services::ports::{ExecError, ProcessHandle};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerState {
    Running,
    Paused,
    Restarting,
    Exited,
    Created,
    Dead,
    Unknown,
}

impl ContainerState {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" | "up" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "exited" => ContainerState::Exited,
            "created" => ContainerState::Created,
            "dead" | "removing" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Exited => "exited",
            ContainerState::Created => "created",
            ContainerState::Dead => "dead",
            ContainerState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `ps --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PsEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Service", default)]
    pub service: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Status", default)]
    pub status: String,
}

/// Compose up to 2.20 prints one JSON array; later releases print one object per line.
pub fn parse_ps_json(raw: &str) -> Result<Vec<PsEntry>, ExecError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<PsEntry>>(trimmed)
            .map_err(|e| ExecError::Parse(format!("ps output: {}", e)));
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<PsEntry>(line)
                .map_err(|e| ExecError::Parse(format!("ps output: {}", e)))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Container {
    name: String,
    service: String,
    state: ContainerState,
    status: String,
    shell: String,
    log_tail: Option<u32>,
    docker: DockerExecutor,
}

impl Container {
    pub fn new(
        entry: PsEntry,
        docker: DockerExecutor,
        shell: &str,
        log_tail: Option<u32>,
    ) -> Self {
        Self {
            state: ContainerState::parse(&entry.state),
            name: entry.name,
            service: entry.service,
            status: entry.status,
            shell: shell.to_string(),
            log_tail,
            docker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Human status from compose, e.g. `Up 3 minutes (healthy)`.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn start(&self) -> Result<ProcessHandle, ExecError> {
        self.docker.start(&self.name)
    }

    pub fn stop(&self) -> Result<ProcessHandle, ExecError> {
        self.docker.stop(&self.name)
    }

    pub fn restart(&self) -> Result<ProcessHandle, ExecError> {
        self.docker.restart(&self.name)
    }

    pub fn kill(&self) -> Result<ProcessHandle, ExecError> {
        self.docker.kill(&self.name)
    }

    pub fn attach(&self) -> Result<(), ExecError> {
        self.docker.attach(&self.name)
    }

    pub fn shell(&self) -> Result<(), ExecError> {
        self.docker.exec_shell(&self.name, &self.shell)
    }

    pub async fn logs(&self) -> Result<String, ExecError> {
        self.docker.logs(&self.name, self.log_tail).await
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compose/container.rs"]
mod tests;
