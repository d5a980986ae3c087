//! 快捷键：按键 → 工作台命令

use crate::kernel::{NodeAction, NodeKind};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rustc_hash::FxHashMap;

/// Normalized key: SHIFT is folded into the character itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    pub fn plain(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }
}

impl From<&KeyEvent> for Key {
    fn from(event: &KeyEvent) -> Self {
        Key::new(event.code, event.modifiers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Action(NodeAction),
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    Home,
    End,
    Toggle,
    Collapse,
    Refresh,
    ToggleAutoRefresh,
    TogglePanel,
    CloseDocument,
    Quit,
}

pub struct Keymap {
    bindings: FxHashMap<Key, KeyCommand>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Keymap {
    pub fn with_defaults() -> Self {
        let mut bindings = FxHashMap::default();
        for action in ALL_ACTIONS {
            bindings.insert(Key::plain(action_key(action)), KeyCommand::Action(action));
        }

        let controls = [
            (Key::plain('k'), KeyCommand::CursorUp),
            (Key::plain('j'), KeyCommand::CursorDown),
            (Key::new(KeyCode::Up, KeyModifiers::NONE), KeyCommand::CursorUp),
            (Key::new(KeyCode::Down, KeyModifiers::NONE), KeyCommand::CursorDown),
            (Key::new(KeyCode::PageUp, KeyModifiers::NONE), KeyCommand::PageUp),
            (Key::new(KeyCode::PageDown, KeyModifiers::NONE), KeyCommand::PageDown),
            (Key::new(KeyCode::Home, KeyModifiers::NONE), KeyCommand::Home),
            (Key::new(KeyCode::End, KeyModifiers::NONE), KeyCommand::End),
            (Key::new(KeyCode::Enter, KeyModifiers::NONE), KeyCommand::Toggle),
            (Key::plain(' '), KeyCommand::Toggle),
            (Key::new(KeyCode::Right, KeyModifiers::NONE), KeyCommand::Toggle),
            (Key::new(KeyCode::Left, KeyModifiers::NONE), KeyCommand::Collapse),
            (Key::plain('R'), KeyCommand::Refresh),
            (Key::plain('p'), KeyCommand::ToggleAutoRefresh),
            (Key::plain('o'), KeyCommand::TogglePanel),
            (Key::new(KeyCode::Esc, KeyModifiers::NONE), KeyCommand::CloseDocument),
            (Key::plain('q'), KeyCommand::Quit),
            (Key::new(KeyCode::Char('c'), KeyModifiers::CONTROL), KeyCommand::Quit),
        ];
        bindings.extend(controls);

        Self { bindings }
    }

    pub fn resolve(&self, key: &Key) -> Option<KeyCommand> {
        self.bindings.get(key).copied()
    }
}

const ALL_ACTIONS: [NodeAction; 10] = [
    NodeAction::Up,
    NodeAction::Down,
    NodeAction::Start,
    NodeAction::Stop,
    NodeAction::Restart,
    NodeAction::Build,
    NodeAction::Kill,
    NodeAction::Attach,
    NodeAction::Shell,
    NodeAction::Logs,
];

pub fn action_key(action: NodeAction) -> char {
    match action {
        NodeAction::Up => 'u',
        NodeAction::Down => 'd',
        NodeAction::Start => 's',
        NodeAction::Stop => 'x',
        NodeAction::Restart => 'r',
        NodeAction::Build => 'b',
        NodeAction::Kill => 'K',
        NodeAction::Attach => 'a',
        NodeAction::Shell => 'e',
        NodeAction::Logs => 'l',
    }
}

/// `(key, label)` pairs for the actions a node of `kind` offers.
pub fn hints(kind: NodeKind) -> Vec<(char, &'static str)> {
    NodeAction::actions_for(kind)
        .iter()
        .map(|action| (action_key(*action), action.label()))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/app/keymap.rs"]
mod tests;
