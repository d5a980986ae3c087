//! 树节点：项目 / 服务 / 容器 / 通用提示节点
//!
//! 节点只是领域对象的包装，负责两件事：枚举子节点、投影成可渲染的 `TreeItem`。

use super::compose::{Container, ContainerState, Project, Service};
use super::services::ports::ExecError;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Project,
    Service,
    Container,
    Explorer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapsible {
    None,
    Collapsed,
    Expanded,
}

/// Stable identity of a node across refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn root() -> Self {
        NodeKey("root".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub label: String,
    pub description: Option<String>,
    pub kind: NodeKind,
    pub collapsible: Collapsible,
    /// Host-side discriminator for menus and key hints, e.g. `container:running`.
    pub context: String,
}

#[derive(Debug)]
pub enum TreeError {
    Enumeration { node: NodeKey, source: ExecError },
}

impl TreeError {
    pub fn node(&self) -> &NodeKey {
        match self {
            TreeError::Enumeration { node, .. } => node,
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Enumeration { source, .. } => write!(f, "{}", source),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TreeError::Enumeration { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RootNode {
    projects: Arc<Vec<Project>>,
}

impl RootNode {
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            projects: Arc::new(projects),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }
}

#[derive(Debug, Clone)]
pub struct ProjectNode {
    project: Project,
}

impl ProjectNode {
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }
}

#[derive(Debug, Clone)]
pub struct ServiceNode {
    service: Service,
}

impl ServiceNode {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }
}

#[derive(Debug, Clone)]
pub struct ContainerNode {
    container: Container,
}

impl ContainerNode {
    pub fn new(container: Container) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }
}

/// Plain text node: empty states and enumeration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerNode {
    parent: NodeKey,
    message: String,
}

impl ExplorerNode {
    pub fn new(parent: NodeKey, message: impl Into<String>) -> Self {
        Self {
            parent,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone)]
pub enum TreeNode {
    Root(RootNode),
    Project(ProjectNode),
    Service(ServiceNode),
    Container(ContainerNode),
    Explorer(ExplorerNode),
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::Root(_) => NodeKind::Root,
            TreeNode::Project(_) => NodeKind::Project,
            TreeNode::Service(_) => NodeKind::Service,
            TreeNode::Container(_) => NodeKind::Container,
            TreeNode::Explorer(_) => NodeKind::Explorer,
        }
    }

    pub fn key(&self) -> NodeKey {
        match self {
            TreeNode::Root(_) => NodeKey::root(),
            TreeNode::Project(node) => NodeKey(format!("project:{}", node.project.name())),
            TreeNode::Service(node) => NodeKey(format!(
                "service:{}/{}",
                node.service.project().name(),
                node.service.name()
            )),
            TreeNode::Container(node) => {
                NodeKey(format!("container:{}", node.container.name()))
            }
            TreeNode::Explorer(node) => {
                NodeKey(format!("explorer:{}/{}", node.parent, node.message))
            }
        }
    }

    pub fn has_children(&self) -> bool {
        matches!(
            self,
            TreeNode::Root(_) | TreeNode::Project(_) | TreeNode::Service(_)
        )
    }

    pub async fn children(&self) -> Result<Vec<TreeNode>, TreeError> {
        match self {
            TreeNode::Root(root) => Ok(root
                .projects
                .iter()
                .cloned()
                .map(|p| TreeNode::Project(ProjectNode::new(p)))
                .collect()),
            TreeNode::Project(node) => {
                let services = node.project.services().await.map_err(|source| {
                    TreeError::Enumeration {
                        node: self.key(),
                        source,
                    }
                })?;
                if services.is_empty() {
                    return Ok(vec![TreeNode::Explorer(ExplorerNode::new(
                        self.key(),
                        "No services",
                    ))]);
                }
                Ok(services
                    .into_iter()
                    .map(|s| TreeNode::Service(ServiceNode::new(s)))
                    .collect())
            }
            TreeNode::Service(node) => {
                let containers = node.service.containers().await.map_err(|source| {
                    TreeError::Enumeration {
                        node: self.key(),
                        source,
                    }
                })?;
                Ok(containers
                    .into_iter()
                    .map(|c| TreeNode::Container(ContainerNode::new(c)))
                    .collect())
            }
            TreeNode::Container(_) | TreeNode::Explorer(_) => Ok(Vec::new()),
        }
    }

    /// Degraded child list shown in place of a failed enumeration.
    pub fn fallback_children(&self, err: &TreeError) -> Vec<TreeNode> {
        match self {
            TreeNode::Project(_) | TreeNode::Service(_) => {
                vec![TreeNode::Explorer(ExplorerNode::new(
                    self.key(),
                    format!("Failed: {}", err),
                ))]
            }
            TreeNode::Root(_) | TreeNode::Container(_) | TreeNode::Explorer(_) => Vec::new(),
        }
    }

    pub fn tree_item(&self) -> TreeItem {
        match self {
            TreeNode::Root(root) => TreeItem {
                label: "Docker Compose".to_string(),
                description: Some(format!("{} projects", root.projects.len())),
                kind: NodeKind::Root,
                collapsible: Collapsible::Expanded,
                context: "root".to_string(),
            },
            TreeNode::Project(node) => TreeItem {
                label: node.project.name().to_string(),
                description: None,
                kind: NodeKind::Project,
                collapsible: Collapsible::Collapsed,
                context: "project".to_string(),
            },
            TreeNode::Service(node) => TreeItem {
                label: node.service.name().to_string(),
                description: None,
                kind: NodeKind::Service,
                collapsible: Collapsible::Collapsed,
                context: "service".to_string(),
            },
            TreeNode::Container(node) => {
                let container = &node.container;
                let description = if container.status().is_empty() {
                    container.state().to_string()
                } else {
                    container.status().to_string()
                };
                TreeItem {
                    label: container.name().to_string(),
                    description: Some(description),
                    kind: NodeKind::Container,
                    collapsible: Collapsible::None,
                    context: format!("container:{}", container.state()),
                }
            }
            TreeNode::Explorer(node) => TreeItem {
                label: node.message.clone(),
                description: None,
                kind: NodeKind::Explorer,
                collapsible: Collapsible::None,
                context: "explorer".to_string(),
            },
        }
    }

    pub fn container_state(&self) -> Option<ContainerState> {
        match self {
            TreeNode::Container(node) => Some(node.container.state()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/tree.rs"]
mod tests;
