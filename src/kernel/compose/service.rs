use super::container::{parse_ps_json, Container};
use super::executor::ComposeVerb;
use super::project::Project;
use crate::kernel::services::ports::{ExecError, ProcessHandle};

#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    project: Project,
}

impl Service {
    pub fn new(name: String, project: Project) -> Self {
        Self { name, project }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub async fn containers(&self) -> Result<Vec<Container>, ExecError> {
        let raw = self.project.compose().ps_json(Some(&self.name)).await?;
        // Older compose releases ignore the service filter for stopped containers.
        Ok(parse_ps_json(&raw)?
            .into_iter()
            .filter(|entry| entry.service.is_empty() || entry.service == self.name)
            .map(|entry| self.project.container(entry))
            .collect())
    }

    fn lifecycle(&self, verb: ComposeVerb) -> Result<ProcessHandle, ExecError> {
        self.project.compose().lifecycle(verb, Some(&self.name))
    }

    pub fn up(&self) -> Result<ProcessHandle, ExecError> {
        self.lifecycle(ComposeVerb::Up)
    }

    pub fn down(&self) -> Result<ProcessHandle, ExecError> {
        self.lifecycle(ComposeVerb::Down)
    }

    pub fn start(&self) -> Result<ProcessHandle, ExecError> {
        self.lifecycle(ComposeVerb::Start)
    }

    pub fn stop(&self) -> Result<ProcessHandle, ExecError> {
        self.lifecycle(ComposeVerb::Stop)
    }

    pub fn restart(&self) -> Result<ProcessHandle, ExecError> {
        self.lifecycle(ComposeVerb::Restart)
    }

    pub fn build(&self) -> Result<ProcessHandle, ExecError> {
        self.lifecycle(ComposeVerb::Build)
    }

    pub fn kill(&self) -> Result<ProcessHandle, ExecError> {
        self.lifecycle(ComposeVerb::Kill)
    }

    pub fn attach(&self) -> Result<(), ExecError> {
        self.project.compose().follow_logs(&self.name)
    }

    pub fn shell(&self) -> Result<(), ExecError> {
        self.project.compose().exec_shell(&self.name)
    }

    pub async fn logs(&self) -> Result<String, ExecError> {
        self.project
            .compose()
            .logs(&self.name, self.project.log_tail())
            .await
    }
}
