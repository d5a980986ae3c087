//! 应用层：终端前端（工作台、键位、主题、命令行）

pub mod cli;
pub mod keymap;
pub mod theme;
pub mod workbench;

pub use workbench::{BottomPanel, KeyOutcome, Row, Workbench};
