//! 日志：按天滚动的文件 + 底部 Log 面板
//!
//! 两个 fmt layer 共用同一个 registry：文件保留完整上下文（target/file/line），
//! 面板只收 INFO 及以上的简短行。

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE: &str = "docktree.log";
const DEFAULT_FILTER: &str = "docktree=info";

pub struct LoggingGuard {
    _guard: WorkerGuard,
    panel_rx: Option<Receiver<String>>,
}

impl LoggingGuard {
    pub fn take_log_rx(&mut self) -> Option<Receiver<String>> {
        self.panel_rx.take()
    }
}

/// Collects one formatted event; the fmt layer creates a writer per event,
/// so the lines go out when it is dropped.
struct PanelWriter {
    pending: Vec<u8>,
    tx: Sender<String>,
}

impl Write for PanelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PanelWriter {
    fn drop(&mut self) {
        String::from_utf8_lossy(&self.pending)
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .for_each(|line| {
                let _ = self.tx.send(line.to_string());
            });
    }
}

fn log_dir() -> Option<PathBuf> {
    docktree::kernel::services::adapters::ensure_log_dir()
        .or_else(|_| {
            let dir = std::env::temp_dir().join("docktree").join("logs");
            std::fs::create_dir_all(&dir).map(|_| dir)
        })
        .ok()
}

pub fn init() -> Option<LoggingGuard> {
    let log_dir = log_dir()?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE));

    let (panel_tx, panel_rx) = mpsc::channel::<String>();
    let panel_layer = tracing_subscriber::fmt::layer()
        .with_writer(move || PanelWriter {
            pending: Vec::with_capacity(128),
            tx: panel_tx.clone(),
        })
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .compact()
        .with_filter(LevelFilter::INFO);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(panel_layer)
        .try_init()
        .ok()?;

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));
    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        panel_rx: Some(panel_rx),
    })
}

#[cfg(test)]
#[path = "../tests/unit/logging.rs"]
mod tests;
