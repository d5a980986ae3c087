use super::super::keymap;
use super::{BottomPanel, Workbench};
use crate::kernel::services::adapters::MessageLevel;
use crate::kernel::{NodeKind, TreeNode};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const STATUS_HEIGHT: u16 = 1;
const HINTS_HEIGHT: u16 = 1;
const PANEL_HEIGHT: u16 = 8;
const TREE_WIDTH_PERCENT: u16 = 40;

impl Workbench {
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(PANEL_HEIGHT),
                Constraint::Length(STATUS_HEIGHT),
                Constraint::Length(HINTS_HEIGHT),
            ])
            .split(area);

        let body_area = chunks[0];
        if self.active_doc.is_some() {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(TREE_WIDTH_PERCENT),
                    Constraint::Min(0),
                ])
                .split(body_area);
            self.render_tree(frame, columns[0]);
            self.render_document(frame, columns[1]);
        } else {
            self.render_tree(frame, body_area);
        }

        self.render_panel(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
        self.render_hints(frame, chunks[3]);
    }

    fn render_tree(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.active_doc.is_none();
        let block = self.block(" Docker Compose ", focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height as usize;
        self.tree_height = height;
        if self.selected < self.tree_scroll {
            self.tree_scroll = self.selected;
        } else if height > 0 && self.selected >= self.tree_scroll + height {
            self.tree_scroll = self.selected + 1 - height;
        }

        if self.rows.is_empty() {
            let text = if self.provider.projects().is_empty() {
                "No workspace folders"
            } else {
                "Loading…"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(self.theme.muted_fg))),
                inner,
            );
            return;
        }

        let lines = self
            .rows
            .iter()
            .enumerate()
            .skip(self.tree_scroll)
            .take(height)
            .map(|(index, row)| self.tree_line(&row.node, row.depth, index == self.selected))
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn tree_line(&self, node: &TreeNode, depth: usize, selected: bool) -> Line<'static> {
        let item = node.tree_item();
        let key = node.key();
        let marker = if !node.has_children() {
            "  "
        } else if self.expanded.contains(&key) {
            "▾ "
        } else {
            "▸ "
        };

        let label_style = match (node.kind(), node.container_state()) {
            (_, Some(state)) => Style::default().fg(self.theme.container_fg(state)),
            (NodeKind::Project, _) => Style::default()
                .fg(self.theme.project_fg)
                .add_modifier(Modifier::BOLD),
            (NodeKind::Service, _) => Style::default().fg(self.theme.service_fg),
            _ => Style::default()
                .fg(self.theme.muted_fg)
                .add_modifier(Modifier::ITALIC),
        };

        let mut spans = vec![
            Span::raw("  ".repeat(depth)),
            Span::raw(marker),
            Span::styled(item.label, label_style),
        ];
        if let Some(description) = item.description {
            spans.push(Span::styled(
                format!("  {}", description),
                Style::default().fg(self.theme.muted_fg),
            ));
        }
        if self.loading.contains(&key) && self.expanded.contains(&key) {
            spans.push(Span::styled(" …", Style::default().fg(self.theme.muted_fg)));
        }

        let line = Line::from(spans);
        if selected {
            line.style(
                Style::default()
                    .bg(self.theme.selected_bg)
                    .fg(self.theme.selected_fg),
            )
        } else {
            line
        }
    }

    fn render_document(&mut self, frame: &mut Frame, area: Rect) {
        let Some(doc) = self.active_doc.and_then(|id| self.documents.get(id)) else {
            self.active_doc = None;
            return;
        };
        let block = self.block(&format!(" {} ", doc.title), true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height as usize;
        let total = doc.text.len_lines();
        self.doc_scroll = self.doc_scroll.min(total.saturating_sub(height));

        let lines = doc
            .text
            .lines()
            .skip(self.doc_scroll)
            .take(height)
            .map(|line| {
                let text = line.to_string();
                Line::raw(text.trim_end_matches(['\n', '\r']).to_string())
            })
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect) {
        let (title, buf) = match self.panel {
            BottomPanel::Output => (" Output ", &self.output),
            BottomPanel::Log => (" Log ", &self.logs),
        };
        let block = self.block(title, false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height as usize;
        let lines = buf
            .iter()
            .skip(buf.len().saturating_sub(height))
            .map(|line| Line::raw(line.clone()))
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let notifier = self.provider.notifier();
        let auto = match notifier.auto_refresh_interval() {
            None => "auto refresh: off".to_string(),
            Some(_) if !notifier.is_auto_refresh_enabled() => "auto refresh: paused".to_string(),
            Some(interval) => format!("auto refresh: {}s", interval.as_secs()),
        };

        let mut spans = Vec::new();
        if let Some(message) = &self.status {
            let color = match message.level {
                MessageLevel::Error => self.theme.error_fg,
                MessageLevel::Info => self.theme.info_fg,
            };
            spans.push(Span::styled(message.text.clone(), Style::default().fg(color)));
            spans.push(Span::raw(" | "));
        }
        spans.push(Span::styled(auto, Style::default().fg(self.theme.muted_fg)));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let kind = self
            .selected_node()
            .map(TreeNode::kind)
            .unwrap_or(NodeKind::Root);
        let key_style = Style::default().fg(self.theme.key_fg);
        let mut spans = Vec::new();
        for (key, label) in keymap::hints(kind) {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(format!(" {}  ", label)));
        }
        for (key, label) in [
            ("R", "refresh"),
            ("p", "auto"),
            ("o", "panel"),
            ("Esc", "close"),
            ("q", "quit"),
        ] {
            spans.push(Span::styled(key, key_style));
            spans.push(Span::raw(format!(" {}  ", label)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn block(&self, title: &str, focused: bool) -> Block<'static> {
        let border = if focused {
            self.theme.focus_border
        } else {
            self.theme.inactive_border
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title.to_string())
    }
}
