//! Service ports: traits + data contracts.

pub mod host;
pub mod process;
pub mod runtime;
pub mod settings;

pub use host::{prefixed, DocumentError, DocumentHost, DocumentId, MessageSink, MESSAGE_PREFIX};
pub use process::{
    CapturedOutput, CommandSpec, ExecError, OutputFuture, ProcessExit, ProcessHandle,
    ProcessSpawner,
};
pub use runtime::{spawn_on, AsyncExecutor, BoxFuture};
pub use settings::Settings;
