//! Async runtime adapter: runs tree loads and commands, sends results back to the UI layer.

mod async_runtime;
mod message;

pub use async_runtime::{AsyncRuntime, TokioExecutor};
pub use message::AppMessage;
