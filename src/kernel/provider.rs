//! 树数据提供者：项目根 + 查询接口
//!
//! 同一时间最多跟踪一次进行中的子节点加载：
//! - 同一节点的并发请求共享这一次加载的结果
//! - 其他节点的请求先等待它完成，再开始自己的加载

use super::compose::{Project, WorkspaceFolder};
use super::refresh::RefreshNotifier;
use super::services::ports::{prefixed, MessageSink, ProcessSpawner, Settings};
use super::tree::{NodeKey, RootNode, TreeItem, TreeNode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

type LoadResult = Option<Vec<TreeNode>>;

struct PendingLoad {
    id: u64,
    key: NodeKey,
    done: watch::Receiver<LoadResult>,
}

enum Slot {
    Join(watch::Receiver<LoadResult>),
    WaitFor(watch::Receiver<LoadResult>),
    Lead(u64, watch::Sender<LoadResult>),
}

pub struct ComposeTreeProvider {
    root: TreeNode,
    notifier: Arc<RefreshNotifier>,
    messages: Arc<dyn MessageSink>,
    loading: Mutex<Option<PendingLoad>>,
    next_load_id: AtomicU64,
}

impl ComposeTreeProvider {
    pub fn new(
        settings: &Settings,
        folders: &[WorkspaceFolder],
        spawner: Arc<dyn ProcessSpawner>,
        messages: Arc<dyn MessageSink>,
        notifier: Arc<RefreshNotifier>,
    ) -> Self {
        let projects = folders
            .iter()
            .map(|folder| Project::from_folder(folder, settings, Arc::clone(&spawner)))
            .collect::<Vec<_>>();
        tracing::info!(
            projects = ?projects.iter().map(Project::name).collect::<Vec<_>>(),
            "compose tree provider created"
        );
        Self::with_projects(projects, messages, notifier)
    }

    pub fn with_projects(
        projects: Vec<Project>,
        messages: Arc<dyn MessageSink>,
        notifier: Arc<RefreshNotifier>,
    ) -> Self {
        Self {
            root: TreeNode::Root(RootNode::new(projects)),
            notifier,
            messages,
            loading: Mutex::new(None),
            next_load_id: AtomicU64::new(1),
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn projects(&self) -> &[Project] {
        match &self.root {
            TreeNode::Root(root) => root.projects(),
            _ => &[],
        }
    }

    pub fn notifier(&self) -> &Arc<RefreshNotifier> {
        &self.notifier
    }

    pub fn refresh(&self, hint: Option<&TreeNode>) {
        self.notifier.refresh(hint);
    }

    pub fn get_tree_item(&self, node: &TreeNode) -> TreeItem {
        node.tree_item()
    }

    /// Children of `node` (the root when `None`). Never fails: enumeration errors are
    /// reported to the user once and replaced by the node's fallback children.
    pub async fn get_children(&self, node: Option<&TreeNode>) -> Vec<TreeNode> {
        let node = node.unwrap_or(&self.root);
        let key = node.key();

        loop {
            match self.claim(&key) {
                Slot::Join(rx) => {
                    if let Some(children) = wait_loaded(rx).await {
                        return children;
                    }
                    // The leader was dropped before finishing; retry.
                }
                Slot::WaitFor(rx) => {
                    let _ = wait_loaded(rx).await;
                }
                Slot::Lead(id, tx) => {
                    let _release = ReleaseOnDrop {
                        provider: self,
                        id,
                    };
                    let children = self.load(node).await;
                    tx.send_replace(Some(children.clone()));
                    return children;
                }
            }
        }
    }

    fn claim(&self, key: &NodeKey) -> Slot {
        let Ok(mut slot) = self.loading.lock() else {
            // Poisoned lock: load without coordination.
            let (tx, _rx) = watch::channel(None);
            return Slot::Lead(0, tx);
        };

        match slot.as_ref() {
            Some(pending) if pending.key == *key => Slot::Join(pending.done.clone()),
            Some(pending) => Slot::WaitFor(pending.done.clone()),
            None => {
                let id = self.next_load_id.fetch_add(1, Ordering::Relaxed);
                let (tx, rx) = watch::channel(None);
                *slot = Some(PendingLoad {
                    id,
                    key: key.clone(),
                    done: rx,
                });
                Slot::Lead(id, tx)
            }
        }
    }

    fn release(&self, id: u64) {
        if let Ok(mut slot) = self.loading.lock() {
            if slot.as_ref().is_some_and(|pending| pending.id == id) {
                *slot = None;
            }
        }
    }

    async fn load(&self, node: &TreeNode) -> Vec<TreeNode> {
        match node.children().await {
            Ok(children) => children,
            Err(err) => {
                tracing::warn!(node = %err.node(), error = %err, "failed to enumerate children");
                self.messages.show_error(&prefixed(&err.to_string()));
                node.fallback_children(&err)
            }
        }
    }
}

struct ReleaseOnDrop<'a> {
    provider: &'a ComposeTreeProvider,
    id: u64,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.provider.release(self.id);
    }
}

async fn wait_loaded(mut rx: watch::Receiver<LoadResult>) -> LoadResult {
    let loaded = match rx.wait_for(|result| result.is_some()).await {
        Ok(result) => result.clone(),
        Err(_) => None,
    };
    loaded
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/provider.rs"]
mod tests;
