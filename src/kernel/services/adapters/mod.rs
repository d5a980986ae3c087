//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod documents;
pub mod messages;
pub mod paths;
pub mod process;
pub mod runtime;
pub mod settings;

pub use documents::{LogDocument, LogDocuments};
pub use messages::{ChannelMessageSink, MessageLevel, UserMessage};
pub use paths::{ensure_log_dir, get_log_dir};
pub use process::{run_foreground, TokioProcessSpawner};
pub use runtime::{AppMessage, AsyncRuntime, TokioExecutor};
pub use settings::{
    ensure_settings_file, get_settings_path, load_settings, load_settings_from, SettingsError,
};
