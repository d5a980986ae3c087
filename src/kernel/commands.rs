//! 命令门面：把树节点上的操作转成领域对象调用。
//!
//! 状态变更类操作（up/down/start/stop/build/restart/kill）在进程退出后恰好触发一次刷新，
//! 与退出码无关；attach/shell/logs 不触发刷新。错误不在这里拦截，直接返回给调用方。

use super::compose::{Container, Project, Service};
use super::refresh::RefreshSignal;
use super::services::ports::{
    spawn_on, AsyncExecutor, DocumentError, DocumentHost, DocumentId, ExecError, ProcessHandle,
};
use super::tree::{ContainerNode, NodeKind, ProjectNode, ServiceNode, TreeNode};
use std::fmt;
use std::sync::Arc;

pub const LOGS_SUFFIX: &str = ".logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeAction {
    Up,
    Down,
    Start,
    Stop,
    Restart,
    Build,
    Kill,
    Attach,
    Shell,
    Logs,
}

impl NodeAction {
    pub fn label(self) -> &'static str {
        match self {
            NodeAction::Up => "up",
            NodeAction::Down => "down",
            NodeAction::Start => "start",
            NodeAction::Stop => "stop",
            NodeAction::Restart => "restart",
            NodeAction::Build => "build",
            NodeAction::Kill => "kill",
            NodeAction::Attach => "attach",
            NodeAction::Shell => "shell",
            NodeAction::Logs => "logs",
        }
    }

    pub fn is_mutating(self) -> bool {
        !matches!(self, NodeAction::Attach | NodeAction::Shell | NodeAction::Logs)
    }

    pub fn actions_for(kind: NodeKind) -> &'static [NodeAction] {
        use NodeAction::*;
        match kind {
            NodeKind::Project => &[Up, Down, Start, Stop, Restart, Build, Kill],
            NodeKind::Service => &[
                Up, Down, Start, Stop, Restart, Build, Kill, Attach, Shell, Logs,
            ],
            NodeKind::Container => &[Start, Stop, Restart, Kill, Attach, Shell, Logs],
            NodeKind::Root | NodeKind::Explorer => &[],
        }
    }
}

impl fmt::Display for NodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub enum CommandError {
    Exec(ExecError),
    Document(DocumentError),
    Unsupported { action: NodeAction, kind: NodeKind },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Exec(e) => write!(f, "{}", e),
            CommandError::Document(e) => write!(f, "{}", e),
            CommandError::Unsupported { action, kind } => {
                write!(f, "'{}' is not available for {:?} nodes", action, kind)
            }
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Exec(e) => Some(e),
            CommandError::Document(e) => Some(e),
            CommandError::Unsupported { .. } => None,
        }
    }
}

impl From<ExecError> for CommandError {
    fn from(e: ExecError) -> Self {
        CommandError::Exec(e)
    }
}

impl From<DocumentError> for CommandError {
    fn from(e: DocumentError) -> Self {
        CommandError::Document(e)
    }
}

/// What a dispatched action left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// A process is running; a refresh follows its exit.
    Spawned { pid: Option<u32> },
    Interactive,
    Document(DocumentId),
}

pub struct ComposeCommands {
    executor: Arc<dyn AsyncExecutor>,
    refresh: RefreshSignal,
    documents: Arc<dyn DocumentHost>,
}

impl ComposeCommands {
    pub fn new(
        executor: Arc<dyn AsyncExecutor>,
        refresh: RefreshSignal,
        documents: Arc<dyn DocumentHost>,
    ) -> Self {
        Self {
            executor,
            refresh,
            documents,
        }
    }

    /// Attaches the single completion continuation: log the exit, then fire one refresh.
    fn refresh_on_exit(&self, label: String, handle: ProcessHandle) -> Dispatched {
        let pid = handle.pid();
        let refresh = self.refresh.clone();
        spawn_on(self.executor.as_ref(), async move {
            let exit = handle.wait().await;
            if exit.success() {
                tracing::info!(action = %label, "command finished");
            } else {
                tracing::warn!(action = %label, exit = %exit, "command failed");
            }
            refresh.fire();
        });
        Dispatched::Spawned { pid }
    }

    fn mutate(
        &self,
        label: String,
        start: impl FnOnce() -> Result<ProcessHandle, ExecError>,
    ) -> Result<Dispatched, ExecError> {
        tracing::info!(action = %label, "dispatch");
        let handle = start()?;
        Ok(self.refresh_on_exit(label, handle))
    }

    fn project_label(project: &Project, action: NodeAction) -> String {
        format!("{} {}", action, project.name())
    }

    fn service_label(service: &Service, action: NodeAction) -> String {
        format!("{} {}/{}", action, service.project().name(), service.name())
    }

    fn container_label(container: &Container, action: NodeAction) -> String {
        format!("{} {}", action, container.name())
    }

    // ---- project ----

    pub fn project_up(&self, node: &ProjectNode) -> Result<Dispatched, ExecError> {
        let p = node.project();
        self.mutate(Self::project_label(p, NodeAction::Up), || p.up())
    }

    pub fn project_down(&self, node: &ProjectNode) -> Result<Dispatched, ExecError> {
        let p = node.project();
        self.mutate(Self::project_label(p, NodeAction::Down), || p.down())
    }

    pub fn project_start(&self, node: &ProjectNode) -> Result<Dispatched, ExecError> {
        let p = node.project();
        self.mutate(Self::project_label(p, NodeAction::Start), || p.start())
    }

    pub fn project_stop(&self, node: &ProjectNode) -> Result<Dispatched, ExecError> {
        let p = node.project();
        self.mutate(Self::project_label(p, NodeAction::Stop), || p.stop())
    }

    pub fn project_restart(&self, node: &ProjectNode) -> Result<Dispatched, ExecError> {
        let p = node.project();
        self.mutate(Self::project_label(p, NodeAction::Restart), || p.restart())
    }

    pub fn project_build(&self, node: &ProjectNode) -> Result<Dispatched, ExecError> {
        let p = node.project();
        self.mutate(Self::project_label(p, NodeAction::Build), || p.build())
    }

    pub fn project_kill(&self, node: &ProjectNode) -> Result<Dispatched, ExecError> {
        let p = node.project();
        self.mutate(Self::project_label(p, NodeAction::Kill), || p.kill())
    }

    // ---- service ----

    pub fn service_up(&self, node: &ServiceNode) -> Result<Dispatched, ExecError> {
        let s = node.service();
        self.mutate(Self::service_label(s, NodeAction::Up), || s.up())
    }

    pub fn service_down(&self, node: &ServiceNode) -> Result<Dispatched, ExecError> {
        let s = node.service();
        self.mutate(Self::service_label(s, NodeAction::Down), || s.down())
    }

    pub fn service_start(&self, node: &ServiceNode) -> Result<Dispatched, ExecError> {
        let s = node.service();
        self.mutate(Self::service_label(s, NodeAction::Start), || s.start())
    }

    pub fn service_stop(&self, node: &ServiceNode) -> Result<Dispatched, ExecError> {
        let s = node.service();
        self.mutate(Self::service_label(s, NodeAction::Stop), || s.stop())
    }

    pub fn service_restart(&self, node: &ServiceNode) -> Result<Dispatched, ExecError> {
        let s = node.service();
        self.mutate(Self::service_label(s, NodeAction::Restart), || s.restart())
    }

    pub fn service_build(&self, node: &ServiceNode) -> Result<Dispatched, ExecError> {
        let s = node.service();
        self.mutate(Self::service_label(s, NodeAction::Build), || s.build())
    }

    pub fn service_kill(&self, node: &ServiceNode) -> Result<Dispatched, ExecError> {
        let s = node.service();
        self.mutate(Self::service_label(s, NodeAction::Kill), || s.kill())
    }

    pub fn service_attach(&self, node: &ServiceNode) -> Result<(), ExecError> {
        node.service().attach()
    }

    pub fn service_shell(&self, node: &ServiceNode) -> Result<(), ExecError> {
        node.service().shell()
    }

    pub async fn service_logs(&self, node: &ServiceNode) -> Result<DocumentId, CommandError> {
        let service = node.service();
        let text = service.logs().await?;
        self.show_logs(service.name(), &text)
    }

    // ---- container ----

    pub fn container_start(&self, node: &ContainerNode) -> Result<Dispatched, ExecError> {
        let c = node.container();
        self.mutate(Self::container_label(c, NodeAction::Start), || c.start())
    }

    pub fn container_stop(&self, node: &ContainerNode) -> Result<Dispatched, ExecError> {
        let c = node.container();
        self.mutate(Self::container_label(c, NodeAction::Stop), || c.stop())
    }

    pub fn container_restart(&self, node: &ContainerNode) -> Result<Dispatched, ExecError> {
        let c = node.container();
        self.mutate(Self::container_label(c, NodeAction::Restart), || c.restart())
    }

    pub fn container_kill(&self, node: &ContainerNode) -> Result<Dispatched, ExecError> {
        let c = node.container();
        self.mutate(Self::container_label(c, NodeAction::Kill), || c.kill())
    }

    pub fn container_attach(&self, node: &ContainerNode) -> Result<(), ExecError> {
        node.container().attach()
    }

    pub fn container_shell(&self, node: &ContainerNode) -> Result<(), ExecError> {
        node.container().shell()
    }

    /// One-shot snapshot into an unsaved `<name>.logs` document.
    pub async fn container_logs(&self, node: &ContainerNode) -> Result<DocumentId, CommandError> {
        let container = node.container();
        let text = container.logs().await?;
        self.show_logs(container.name(), &text)
    }

    fn show_logs(&self, name: &str, text: &str) -> Result<DocumentId, CommandError> {
        let title = format!("{}{}", name, LOGS_SUFFIX);
        let doc = self.documents.open_untitled(&title)?;
        self.documents.insert(doc, 0, text)?;
        tracing::debug!(document = %title, bytes = text.len(), "logs captured");
        Ok(doc)
    }

    /// Routes `action` to the typed method for `node`'s kind.
    pub async fn dispatch(
        &self,
        node: &TreeNode,
        action: NodeAction,
    ) -> Result<Dispatched, CommandError> {
        use NodeAction::*;
        let unsupported = || CommandError::Unsupported {
            action,
            kind: node.kind(),
        };

        let dispatched = match node {
            TreeNode::Project(n) => match action {
                Up => self.project_up(n)?,
                Down => self.project_down(n)?,
                Start => self.project_start(n)?,
                Stop => self.project_stop(n)?,
                Restart => self.project_restart(n)?,
                Build => self.project_build(n)?,
                Kill => self.project_kill(n)?,
                Attach | Shell | Logs => return Err(unsupported()),
            },
            TreeNode::Service(n) => match action {
                Up => self.service_up(n)?,
                Down => self.service_down(n)?,
                Start => self.service_start(n)?,
                Stop => self.service_stop(n)?,
                Restart => self.service_restart(n)?,
                Build => self.service_build(n)?,
                Kill => self.service_kill(n)?,
                Attach => {
                    self.service_attach(n)?;
                    Dispatched::Interactive
                }
                Shell => {
                    self.service_shell(n)?;
                    Dispatched::Interactive
                }
                Logs => Dispatched::Document(self.service_logs(n).await?),
            },
            TreeNode::Container(n) => match action {
                Start => self.container_start(n)?,
                Stop => self.container_stop(n)?,
                Restart => self.container_restart(n)?,
                Kill => self.container_kill(n)?,
                Attach => {
                    self.container_attach(n)?;
                    Dispatched::Interactive
                }
                Shell => {
                    self.container_shell(n)?;
                    Dispatched::Interactive
                }
                Logs => Dispatched::Document(self.container_logs(n).await?),
                Up | Down | Build => return Err(unsupported()),
            },
            TreeNode::Root(_) | TreeNode::Explorer(_) => return Err(unsupported()),
        };
        Ok(dispatched)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/commands.rs"]
mod tests;
