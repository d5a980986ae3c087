//! TUI integration layer (crossterm + ratatui).
//!
//! Kept apart from `kernel` so the compose core can be hosted by other frontends without
//! depending on terminal crates.

pub mod terminal_guard;

pub use terminal_guard::{
    install_termination_signals, TerminalGuard, TerminalRestorer, TerminationSignal,
};
