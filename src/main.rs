use crossterm::event::{self, Event, KeyEventKind};
use docktree::app::cli::{self, CliCommand};
use docktree::app::{KeyOutcome, Workbench};
use docktree::kernel::services::adapters::{
    load_settings, run_foreground, AppMessage, AsyncRuntime, ChannelMessageSink, LogDocuments,
    TokioProcessSpawner, UserMessage,
};
use docktree::kernel::services::ports::{
    CommandSpec, DocumentHost, MessageSink, ProcessSpawner,
};
use docktree::kernel::{
    ComposeCommands, ComposeTreeProvider, RefreshNotifier, RefreshReceiver, WorkspaceFolder,
};
use docktree::tui::{TerminalGuard, TerminationSignal};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

mod logging;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

struct Channels {
    app: Receiver<AppMessage>,
    messages: Receiver<UserMessage>,
    refresh: RefreshReceiver,
    signals: Receiver<TerminationSignal>,
}

fn main() -> io::Result<()> {
    let cwd = std::env::current_dir()?;
    let folders = match cli::parse(std::env::args().skip(1), &cwd) {
        Ok(CliCommand::Run { folders }) => folders,
        Ok(CliCommand::Help) => {
            print!("{}", cli::USAGE);
            return Ok(());
        }
        Ok(CliCommand::Version) => {
            println!("{}", cli::version());
            return Ok(());
        }
        Err(e) => {
            eprintln!("docktree: {}\n\n{}", e, cli::USAGE);
            std::process::exit(2);
        }
    };

    let mut logging_guard = logging::init();
    let log_rx = logging_guard.as_mut().and_then(|g| g.take_log_rx());

    run(folders, log_rx)
}

fn run(folders: Vec<PathBuf>, log_rx: Option<Receiver<String>>) -> io::Result<()> {
    let settings = load_settings();
    tracing::info!(folders = folders.len(), "starting");

    let (app_tx, app_rx) = mpsc::channel::<AppMessage>();
    let (msg_tx, msg_rx) = mpsc::channel::<UserMessage>();
    let runtime = AsyncRuntime::new(app_tx.clone())?;
    let handle = runtime.tokio_handle();

    let spawner: Arc<dyn ProcessSpawner> =
        Arc::new(TokioProcessSpawner::new(handle.clone()).with_ui(app_tx));
    let notifier = Arc::new(RefreshNotifier::new(handle));
    notifier.set_auto_refresh_millis(settings.auto_refresh_interval);
    let refresh_rx = notifier.subscribe();

    let messages: Arc<dyn MessageSink> = Arc::new(ChannelMessageSink::new(msg_tx));
    let folders = folders
        .into_iter()
        .enumerate()
        .map(|(index, path)| WorkspaceFolder::new(index, path))
        .collect::<Vec<_>>();
    let provider = Arc::new(ComposeTreeProvider::new(
        &settings,
        &folders,
        spawner,
        messages,
        Arc::clone(&notifier),
    ));

    let documents = Arc::new(LogDocuments::new());
    let host: Arc<dyn DocumentHost> = documents.clone();
    let commands = Arc::new(ComposeCommands::new(
        runtime.executor(),
        notifier.signal(),
        host,
    ));

    let mut workbench = Workbench::new(runtime, provider, commands, documents, log_rx);

    let guard = TerminalGuard::new()?;
    let (sig_tx, sig_rx) = mpsc::channel();
    #[cfg(unix)]
    {
        if let Err(e) = docktree::tui::install_termination_signals(guard.restorer(), sig_tx) {
            tracing::warn!(error = %e, "failed to install signal handlers");
        }
    }
    #[cfg(not(unix))]
    drop(sig_tx);

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let channels = Channels {
        app: app_rx,
        messages: msg_rx,
        refresh: refresh_rx,
        signals: sig_rx,
    };

    let result = event_loop(&mut terminal, &guard, &mut workbench, &channels);

    notifier.close();
    drop(guard);
    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    tracing::info!("exiting");
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    guard: &TerminalGuard,
    workbench: &mut Workbench,
    channels: &Channels,
) -> io::Result<()> {
    let mut dirty = true;

    loop {
        if let Ok(signal) = channels.signals.try_recv() {
            tracing::info!(signal = ?signal, "termination signal received");
            return Ok(());
        }

        while let Ok(msg) = channels.app.try_recv() {
            dirty = true;
            if let Some(spec) = workbench.handle_message(msg) {
                run_interactive(terminal, guard, workbench, &spec)?;
            }
        }
        while let Ok(message) = channels.messages.try_recv() {
            dirty = true;
            workbench.show_message(message);
        }

        let mut refresh = false;
        while channels.refresh.try_recv().is_ok() {
            refresh = true;
        }
        if refresh {
            dirty = true;
            workbench.refresh();
        }
        dirty |= workbench.poll_logs();

        if dirty {
            terminal.draw(|frame| {
                let area = frame.area();
                workbench.render(frame, area);
            })?;
            dirty = false;
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match workbench.handle_key(&key) {
                    KeyOutcome::Quit => return Ok(()),
                    KeyOutcome::Consumed => dirty = true,
                    KeyOutcome::Ignored => {}
                }
            }
            Event::Resize(_, _) => dirty = true,
            _ => {}
        }
    }
}

/// Leaves the alternate screen, runs `spec` with inherited stdio, then takes the terminal back.
fn run_interactive(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    guard: &TerminalGuard,
    workbench: &mut Workbench,
    spec: &CommandSpec,
) -> io::Result<()> {
    tracing::info!(command = %spec.display(), "handing terminal to foreground command");
    guard.suspend()?;
    println!("$ {}", spec.display());
    let status = run_foreground(spec);
    guard.resume()?;
    terminal.clear()?;
    workbench.interactive_finished(spec, status);
    Ok(())
}
