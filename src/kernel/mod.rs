//! Headless core: compose domain, tree model, refresh notifier, command façade.

pub mod commands;
pub mod compose;
pub mod provider;
pub mod refresh;
pub mod services;
pub mod tree;

pub use commands::{CommandError, ComposeCommands, Dispatched, NodeAction};
pub use compose::{project_name, Container, ContainerState, Project, Service, WorkspaceFolder};
pub use provider::ComposeTreeProvider;
pub use refresh::{RefreshEvent, RefreshNotifier, RefreshReceiver, RefreshSignal};
pub use tree::{
    Collapsible, ContainerNode, ExplorerNode, NodeKey, NodeKind, ProjectNode, ServiceNode,
    TreeError, TreeItem, TreeNode,
};

#[cfg(test)]
#[path = "../../tests/unit/kernel/support.rs"]
pub(crate) mod test_support;
