//! docktree - Docker Compose 项目树（终端版）
//!
//! 模块结构：
//! - kernel: 无界面核心（compose 领域对象、树模型、刷新通知、命令门面、端口/适配器）
//! - app: 终端前端（Workbench、键位、渲染、命令行解析）
//! - tui: 终端生命周期（raw mode / alternate screen 的获取与恢复）

pub mod kernel;

#[cfg(feature = "tui")]
pub mod app;
#[cfg(feature = "tui")]
pub mod tui;
