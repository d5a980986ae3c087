use super::container::{Container, PsEntry};
use super::executor::{ComposeExecutor, ComposeExecutorConfig, ComposeVerb, DockerExecutor};
use super::service::Service;
use crate::kernel::services::ports::{ExecError, ProcessHandle, ProcessSpawner, Settings};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFolder {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
}

impl WorkspaceFolder {
    pub fn new(index: usize, path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { index, name, path }
    }
}

/// Mapping entry for the folder's index when present and non-empty, otherwise the folder
/// name restricted to `[A-Za-z0-9_-]`.
pub fn project_name(folder: &WorkspaceFolder, mapping: &[String]) -> String {
    if let Some(name) = mapping.get(folder.index) {
        if !name.is_empty() {
            return name.clone();
        }
    }
    folder
        .name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    docker: DockerExecutor,
    compose: ComposeExecutor,
    log_tail: Option<u32>,
}

impl Project {
    pub fn new(name: String, docker: DockerExecutor, compose: ComposeExecutor) -> Self {
        Self {
            name,
            docker,
            compose,
            log_tail: None,
        }
    }

    pub fn from_folder(
        folder: &WorkspaceFolder,
        settings: &Settings,
        spawner: Arc<dyn ProcessSpawner>,
    ) -> Self {
        let name = project_name(folder, &settings.project_names);
        if name.is_empty() {
            tracing::warn!(
                folder = %folder.path.display(),
                "folder name has no characters usable as a compose project name; set project_names"
            );
        }
        let docker = DockerExecutor::new(settings.docker_program(), &folder.path, spawner.clone());
        let (program, program_args) = settings.compose_program();
        let compose = ComposeExecutor::new(
            ComposeExecutorConfig {
                program: &program,
                program_args: &program_args,
                files: &settings.files,
                shell: &settings.shell,
                project_name: &name,
                cwd: &folder.path,
            },
            spawner,
        );
        let mut project = Self::new(name, docker, compose);
        project.log_tail = settings.log_tail;
        project
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn docker(&self) -> &DockerExecutor {
        &self.docker
    }

    pub fn compose(&self) -> &ComposeExecutor {
        &self.compose
    }

    pub fn log_tail(&self) -> Option<u32> {
        self.log_tail
    }

    pub async fn services(&self) -> Result<Vec<Service>, ExecError> {
        let names = self.compose.service_names().await?;
        Ok(names
            .into_iter()
            .map(|name| Service::new(name, self.clone()))
            .collect())
    }

    pub(crate) fn container(&self, entry: PsEntry) -> Container {
        Container::new(
            entry,
            self.docker.clone(),
            self.compose.shell(),
            self.log_tail,
        )
    }

    pub fn up(&self) -> Result<ProcessHandle, ExecError> {
        self.compose.lifecycle(ComposeVerb::Up, None)
    }

    pub fn down(&self) -> Result<ProcessHandle, ExecError> {
        self.compose.lifecycle(ComposeVerb::Down, None)
    }

    pub fn start(&self) -> Result<ProcessHandle, ExecError> {
        self.compose.lifecycle(ComposeVerb::Start, None)
    }

    pub fn stop(&self) -> Result<ProcessHandle, ExecError> {
        self.compose.lifecycle(ComposeVerb::Stop, None)
    }

    pub fn restart(&self) -> Result<ProcessHandle, ExecError> {
        self.compose.lifecycle(ComposeVerb::Restart, None)
    }

    pub fn build(&self) -> Result<ProcessHandle, ExecError> {
        self.compose.lifecycle(ComposeVerb::Build, None)
    }

    pub fn kill(&self) -> Result<ProcessHandle, ExecError> {
        self.compose.lifecycle(ComposeVerb::Kill, None)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compose/project.rs"]
mod tests;
