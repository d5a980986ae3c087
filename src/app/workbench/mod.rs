//! 工作台：树状态、输入分发、异步结果回收

use super::keymap::{Key, KeyCommand, Keymap};
use super::theme::UiTheme;
use crate::kernel::services::adapters::{
    AppMessage, AsyncRuntime, LogDocuments, MessageLevel, UserMessage,
};
use crate::kernel::services::ports::{prefixed, CommandSpec, DocumentId};
use crate::kernel::{
    ComposeCommands, ComposeTreeProvider, Dispatched, ExplorerNode, NodeAction, NodeKey,
    TreeNode,
};
use crossterm::event::KeyEvent;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::process::ExitStatus;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

mod render;
mod tick;

const OUTPUT_BUFFER_CAP: usize = 500;
const LOG_BUFFER_CAP: usize = 500;
const MAX_LOG_DRAIN_PER_TICK: usize = 256;
const LOADING_LABEL: &str = "Loading…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Ignored,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BottomPanel {
    Output,
    Log,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub node: TreeNode,
    pub depth: usize,
}

pub struct Workbench {
    runtime: AsyncRuntime,
    provider: Arc<ComposeTreeProvider>,
    commands: Arc<ComposeCommands>,
    documents: Arc<LogDocuments>,
    keymap: Keymap,
    theme: UiTheme,
    children: FxHashMap<NodeKey, Vec<TreeNode>>,
    expanded: FxHashSet<NodeKey>,
    loading: FxHashSet<NodeKey>,
    rows: Vec<Row>,
    selected: usize,
    tree_scroll: usize,
    tree_height: usize,
    output: VecDeque<String>,
    logs: VecDeque<String>,
    log_rx: Option<Receiver<String>>,
    panel: BottomPanel,
    status: Option<UserMessage>,
    active_doc: Option<DocumentId>,
    doc_scroll: usize,
}

impl Workbench {
    pub fn new(
        runtime: AsyncRuntime,
        provider: Arc<ComposeTreeProvider>,
        commands: Arc<ComposeCommands>,
        documents: Arc<LogDocuments>,
        log_rx: Option<Receiver<String>>,
    ) -> Self {
        let mut theme = UiTheme::default();
        theme.adapt_to_terminal_capabilities();

        let mut workbench = Self {
            runtime,
            provider,
            commands,
            documents,
            keymap: Keymap::with_defaults(),
            theme,
            children: FxHashMap::default(),
            expanded: FxHashSet::default(),
            loading: FxHashSet::default(),
            rows: Vec::new(),
            selected: 0,
            tree_scroll: 0,
            tree_height: 0,
            output: VecDeque::new(),
            logs: VecDeque::new(),
            log_rx,
            panel: BottomPanel::Output,
            status: None,
            active_doc: None,
            doc_scroll: 0,
        };
        workbench.request_children(None);
        workbench
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.rows.get(self.selected).map(|row| &row.node)
    }

    pub fn status(&self) -> Option<&UserMessage> {
        self.status.as_ref()
    }

    pub fn active_document(&self) -> Option<DocumentId> {
        self.active_doc
    }

    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.output.iter().map(String::as_str)
    }

    pub fn is_expanded(&self, key: &NodeKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn is_loading(&self, key: &NodeKey) -> bool {
        self.loading.contains(key)
    }

    fn request_children(&mut self, node: Option<TreeNode>) {
        let key = node
            .as_ref()
            .map(TreeNode::key)
            .unwrap_or_else(|| self.provider.root().key());
        self.loading.insert(key);
        self.runtime.load_children(Arc::clone(&self.provider), node);
    }

    /// Re-queries the root and every expanded node that is currently visible.
    pub fn refresh(&mut self) {
        tracing::debug!(expanded = self.expanded.len(), "refreshing tree");
        self.request_children(None);
        let expanded = self
            .rows
            .iter()
            .filter(|row| self.expanded.contains(&row.node.key()))
            .map(|row| row.node.clone())
            .collect::<Vec<_>>();
        for node in expanded {
            self.request_children(Some(node));
        }
    }

    /// Applies an async result. Returns a command that needs the terminal in the foreground.
    pub fn handle_message(&mut self, msg: AppMessage) -> Option<CommandSpec> {
        match msg {
            AppMessage::ChildrenLoaded { key, children } => {
                self.loading.remove(&key);
                self.children.insert(key, children);
                self.rebuild_rows();
            }
            AppMessage::ActionFinished {
                target,
                action,
                result,
            } => self.on_action_finished(&target, action, result),
            AppMessage::Output(line) => push_capped(&mut self.output, line, OUTPUT_BUFFER_CAP),
            AppMessage::Interactive(spec) => return Some(spec),
        }
        None
    }

    fn on_action_finished(
        &mut self,
        target: &str,
        action: NodeAction,
        result: Result<Dispatched, String>,
    ) {
        match result {
            Ok(Dispatched::Spawned { pid }) => {
                let pid = pid.map(|p| format!(" (pid {})", p)).unwrap_or_default();
                self.set_status(
                    MessageLevel::Info,
                    format!("{} {} started{}", action, target, pid),
                );
            }
            Ok(Dispatched::Interactive) => {}
            Ok(Dispatched::Document(id)) => {
                self.active_doc = Some(id);
                self.doc_scroll = usize::MAX;
                let title = self
                    .documents
                    .get(id)
                    .map(|doc| doc.title)
                    .unwrap_or_else(|| target.to_string());
                self.set_status(MessageLevel::Info, format!("Opened {}", title));
            }
            Err(error) => self.set_status(
                MessageLevel::Error,
                prefixed(&format!("{} {} failed: {}", action, target, error)),
            ),
        }
    }

    pub fn show_message(&mut self, message: UserMessage) {
        self.status = Some(message);
    }

    fn set_status(&mut self, level: MessageLevel, text: String) {
        self.status = Some(UserMessage { level, text });
    }

    /// Records the result of a foreground command run by the host loop.
    pub fn interactive_finished(
        &mut self,
        spec: &CommandSpec,
        result: std::io::Result<ExitStatus>,
    ) {
        match result {
            Ok(status) => {
                push_capped(
                    &mut self.output,
                    format!("[{}] {}", status, spec.display()),
                    OUTPUT_BUFFER_CAP,
                );
                self.set_status(MessageLevel::Info, format!("{} finished", spec.display()));
            }
            Err(e) => {
                tracing::error!(command = %spec.display(), error = %e, "foreground command failed");
                self.set_status(
                    MessageLevel::Error,
                    prefixed(&format!("{} failed: {}", spec.display(), e)),
                );
            }
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        let Some(command) = self.keymap.resolve(&Key::from(event)) else {
            return KeyOutcome::Ignored;
        };

        match command {
            KeyCommand::Quit => return KeyOutcome::Quit,
            KeyCommand::Action(action) => self.run_action(action),
            KeyCommand::CursorUp => self.move_selection(-1),
            KeyCommand::CursorDown => self.move_selection(1),
            KeyCommand::PageUp => self.page(-1),
            KeyCommand::PageDown => self.page(1),
            KeyCommand::Home => {
                if self.active_doc.is_some() {
                    self.doc_scroll = 0;
                } else {
                    self.selected = 0;
                }
            }
            KeyCommand::End => {
                if self.active_doc.is_some() {
                    self.doc_scroll = usize::MAX;
                } else {
                    self.selected = self.rows.len().saturating_sub(1);
                }
            }
            KeyCommand::Toggle => self.toggle_selected(),
            KeyCommand::Collapse => self.collapse_selected(),
            KeyCommand::Refresh => {
                self.provider.refresh(self.selected_node());
                self.set_status(MessageLevel::Info, "Refreshing…".to_string());
            }
            KeyCommand::ToggleAutoRefresh => self.toggle_auto_refresh(),
            KeyCommand::TogglePanel => {
                self.panel = match self.panel {
                    BottomPanel::Output => BottomPanel::Log,
                    BottomPanel::Log => BottomPanel::Output,
                };
            }
            KeyCommand::CloseDocument => {
                let Some(id) = self.active_doc.take() else {
                    return KeyOutcome::Ignored;
                };
                self.documents.close(id);
            }
        }
        KeyOutcome::Consumed
    }

    fn run_action(&mut self, action: NodeAction) {
        let Some(node) = self.selected_node().cloned() else {
            return;
        };
        let label = node.tree_item().label;
        if !NodeAction::actions_for(node.kind()).contains(&action) {
            self.set_status(
                MessageLevel::Info,
                format!("{} is not available for {}", action, label),
            );
            return;
        }
        self.set_status(MessageLevel::Info, format!("{} {}…", action, label));
        self.runtime
            .dispatch(Arc::clone(&self.commands), node, action);
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        let max = self.rows.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(max);
    }

    fn page(&mut self, direction: isize) {
        let step = self.tree_height.max(1);
        if self.active_doc.is_some() {
            self.doc_scroll = if direction < 0 {
                self.doc_scroll.saturating_sub(step)
            } else {
                self.doc_scroll.saturating_add(step)
            };
            return;
        }
        self.move_selection(direction.saturating_mul(step as isize));
    }

    fn toggle_selected(&mut self) {
        let Some(node) = self.selected_node().cloned() else {
            return;
        };
        if !node.has_children() {
            return;
        }
        let key = node.key();
        if self.expanded.remove(&key) {
            self.rebuild_rows();
            return;
        }
        self.expanded.insert(key);
        self.request_children(Some(node));
        self.rebuild_rows();
    }

    fn collapse_selected(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        let key = node.key();
        if self.expanded.remove(&key) {
            self.rebuild_rows();
            return;
        }
        // Already collapsed: jump to the parent row.
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };
        let depth = row.depth;
        if let Some(parent) = self.rows[..self.selected]
            .iter()
            .rposition(|r| r.depth + 1 == depth)
        {
            self.selected = parent;
        }
    }

    fn toggle_auto_refresh(&mut self) {
        let notifier = Arc::clone(self.provider.notifier());
        if notifier.auto_refresh_interval().is_none() {
            self.set_status(
                MessageLevel::Info,
                "Auto refresh is off (auto_refresh_interval is 0)".to_string(),
            );
            return;
        }
        if notifier.is_auto_refresh_enabled() {
            notifier.disable_auto_refresh();
            self.set_status(MessageLevel::Info, "Auto refresh paused".to_string());
        } else {
            notifier.enable_auto_refresh();
            self.set_status(MessageLevel::Info, "Auto refresh resumed".to_string());
        }
    }

    fn rebuild_rows(&mut self) {
        let selected_key = self.selected_node().map(TreeNode::key);

        let mut rows = Vec::new();
        let root = self.provider.root().key();
        self.push_rows(&root, 0, &mut rows);
        self.rows = rows;

        self.selected = selected_key
            .and_then(|key| self.rows.iter().position(|row| row.node.key() == key))
            .unwrap_or(self.selected)
            .min(self.rows.len().saturating_sub(1));
    }

    fn push_rows(&self, parent: &NodeKey, depth: usize, rows: &mut Vec<Row>) {
        let Some(children) = self.children.get(parent) else {
            if self.loading.contains(parent) {
                rows.push(Row {
                    node: TreeNode::Explorer(ExplorerNode::new(parent.clone(), LOADING_LABEL)),
                    depth,
                });
            }
            return;
        };
        for child in children {
            let key = child.key();
            rows.push(Row {
                node: child.clone(),
                depth,
            });
            if child.has_children() && self.expanded.contains(&key) {
                self.push_rows(&key, depth + 1, rows);
            }
        }
    }
}

fn push_capped(buf: &mut VecDeque<String>, line: String, cap: usize) {
    if buf.len() >= cap {
        buf.pop_front();
    }
    buf.push_back(line);
}

#[cfg(test)]
#[path = "../../../tests/unit/app/workbench.rs"]
mod tests;
