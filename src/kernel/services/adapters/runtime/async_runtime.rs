use super::message::AppMessage;
use crate::kernel::commands::{ComposeCommands, NodeAction};
use crate::kernel::provider::ComposeTreeProvider;
use crate::kernel::services::ports::{AsyncExecutor, BoxFuture};
use crate::kernel::tree::TreeNode;
use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// `AsyncExecutor` backed by a tokio runtime handle.
#[derive(Clone)]
pub struct TokioExecutor {
    handle: tokio::runtime::Handle,
}

impl TokioExecutor {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl AsyncExecutor for TokioExecutor {
    fn spawn(&self, task: BoxFuture) {
        self.handle.spawn(task);
    }
}

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
}

impl AsyncRuntime {
    pub fn new(tx: Sender<AppMessage>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self { runtime, tx })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn executor(&self) -> Arc<dyn AsyncExecutor> {
        Arc::new(TokioExecutor::new(self.tokio_handle()))
    }

    pub fn sender(&self) -> Sender<AppMessage> {
        self.tx.clone()
    }

    pub fn load_children(&self, provider: Arc<ComposeTreeProvider>, node: Option<TreeNode>) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let key = node
                .as_ref()
                .map(TreeNode::key)
                .unwrap_or_else(|| provider.root().key());
            let children = provider.get_children(node.as_ref()).await;
            let _ = tx.send(AppMessage::ChildrenLoaded { key, children });
        });
    }

    pub fn dispatch(&self, commands: Arc<ComposeCommands>, node: TreeNode, action: NodeAction) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let target = node.tree_item().label;
            let result = commands
                .dispatch(&node, action)
                .await
                .map_err(|e| e.to_string());
            if let Err(error) = &result {
                tracing::warn!(node = %target, action = %action, error = %error, "action failed");
            }
            let _ = tx.send(AppMessage::ActionFinished {
                target,
                action,
                result,
            });
        });
    }
}
