use super::*;
use crate::kernel::refresh::RefreshNotifier;
use crate::kernel::test_support::{project, FakeMessages, FakeSpawner, WEB_PS};
use crossterm::event::{KeyCode, KeyModifiers};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

struct Fixture {
    workbench: Workbench,
    rx: Receiver<AppMessage>,
    spawner: Arc<FakeSpawner>,
    notifier: Arc<RefreshNotifier>,
    documents: Arc<LogDocuments>,
}

fn fixture() -> Fixture {
    let (tx, rx) = mpsc::channel();
    let runtime = AsyncRuntime::new(tx).unwrap();
    let spawner = FakeSpawner::new();
    spawner.on_output("config --services", "web\ndb\n");
    spawner.on_output("ps --all", WEB_PS);
    spawner.on_output("logs", "web | ready\n");

    let notifier = Arc::new(RefreshNotifier::new(runtime.tokio_handle()));
    let provider = Arc::new(ComposeTreeProvider::with_projects(
        vec![project("shop", spawner.clone())],
        FakeMessages::new(),
        Arc::clone(&notifier),
    ));
    let documents = Arc::new(LogDocuments::new());
    let commands = Arc::new(ComposeCommands::new(
        runtime.executor(),
        notifier.signal(),
        documents.clone(),
    ));
    let workbench = Workbench::new(runtime, provider, commands, documents.clone(), None);

    Fixture {
        workbench,
        rx,
        spawner,
        notifier,
        documents,
    }
}

impl Fixture {
    /// Feeds async results into the workbench until `done` holds.
    fn settle(&mut self, done: impl Fn(&Workbench) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !done(&self.workbench) {
            let left = deadline.saturating_duration_since(Instant::now());
            assert!(!left.is_zero(), "workbench did not settle");
            if let Ok(msg) = self.rx.recv_timeout(left) {
                assert!(self.workbench.handle_message(msg).is_none());
            }
        }
    }

    fn press(&mut self, code: KeyCode) -> KeyOutcome {
        self.workbench
            .handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn labels(&self) -> Vec<String> {
        self.workbench
            .rows()
            .iter()
            .map(|row| row.node.tree_item().label)
            .collect()
    }

    fn status_text(&self) -> String {
        self.workbench
            .status()
            .map(|m| m.text.clone())
            .unwrap_or_default()
    }

    fn expanded_project(mut self) -> Self {
        self.settle(|wb| !wb.rows().is_empty());
        self.press(KeyCode::Enter);
        self.settle(|wb| wb.rows().len() == 3);
        self
    }
}

#[test]
fn root_projects_load_on_start() {
    let mut f = fixture();
    f.settle(|wb| !wb.rows().is_empty());

    assert_eq!(f.labels(), ["shop"]);
    assert_eq!(f.workbench.rows()[0].depth, 0);
}

#[test]
fn expanding_shows_placeholder_then_children() {
    let mut f = fixture();
    f.settle(|wb| !wb.rows().is_empty());

    f.press(KeyCode::Enter);
    let key = f.workbench.rows()[0].node.key();
    assert!(f.workbench.is_expanded(&key));
    assert!(f.workbench.is_loading(&key));
    assert_eq!(f.labels(), ["shop", LOADING_LABEL]);

    f.settle(|wb| wb.rows().len() == 3);
    assert_eq!(f.labels(), ["shop", "web", "db"]);
    assert_eq!(f.workbench.rows()[1].depth, 1);
    assert!(!f.workbench.is_loading(&key));
}

#[test]
fn collapse_jumps_to_parent_then_folds() {
    let mut f = fixture().expanded_project();

    f.press(KeyCode::Down);
    assert_eq!(f.workbench.selected_node().unwrap().tree_item().label, "web");

    f.press(KeyCode::Left);
    assert_eq!(f.workbench.selected_node().unwrap().tree_item().label, "shop");

    f.press(KeyCode::Left);
    assert_eq!(f.labels(), ["shop"]);
}

#[test]
fn cursor_stays_in_bounds() {
    let mut f = fixture().expanded_project();

    f.press(KeyCode::Up);
    assert_eq!(f.workbench.selected_node().unwrap().tree_item().label, "shop");
    f.press(KeyCode::End);
    f.press(KeyCode::Down);
    assert_eq!(f.workbench.selected_node().unwrap().tree_item().label, "db");
    f.press(KeyCode::Home);
    assert_eq!(f.workbench.selected_node().unwrap().tree_item().label, "shop");
}

#[test]
fn selection_survives_reload() {
    let mut f = fixture().expanded_project();
    f.press(KeyCode::Down);
    f.press(KeyCode::Down);

    f.workbench.refresh();
    f.settle(|wb| wb.rows().len() == 3 && !wb.is_loading(&wb.rows()[0].node.key()));

    assert_eq!(f.workbench.selected_node().unwrap().tree_item().label, "db");
}

#[test]
fn unavailable_action_is_reported_without_running() {
    let mut f = fixture();
    f.settle(|wb| !wb.rows().is_empty());

    assert_eq!(f.press(KeyCode::Char('l')), KeyOutcome::Consumed);

    assert!(f.status_text().contains("is not available for shop"));
    assert!(f.spawner.outputs().iter().all(|s| !s.args.contains(&"logs".to_string())));
}

#[test]
fn mutating_action_reports_start() {
    let mut f = fixture();
    f.settle(|wb| !wb.rows().is_empty());

    f.press(KeyCode::Char('u'));
    f.settle(|wb| {
        wb.status()
            .map(|m| m.text.contains("started"))
            .unwrap_or(false)
    });

    assert_eq!(f.spawner.spawned().len(), 1);
    assert!(f.status_text().contains("shop"));
    f.spawner.finish(0, 0);
}

#[test]
fn logs_open_a_document_and_escape_closes_it() {
    let mut f = fixture().expanded_project();
    f.press(KeyCode::Down);

    f.press(KeyCode::Char('l'));
    f.settle(|wb| wb.active_document().is_some());

    let id = f.workbench.active_document().unwrap();
    let doc = f.documents.get(id).unwrap();
    assert_eq!(doc.title, "web.logs");
    assert_eq!(doc.text.to_string(), "web | ready\n");
    assert_eq!(f.status_text(), "Opened web.logs");

    assert_eq!(f.press(KeyCode::Esc), KeyOutcome::Consumed);
    assert_eq!(f.workbench.active_document(), None);
    assert!(f.documents.get(id).is_none());
    assert_eq!(f.press(KeyCode::Esc), KeyOutcome::Ignored);
}

#[test]
fn failed_action_becomes_prefixed_error() {
    let mut f = fixture();

    f.workbench.handle_message(AppMessage::ActionFinished {
        target: "web".to_string(),
        action: NodeAction::Restart,
        result: Err("daemon not running".to_string()),
    });

    let status = f.workbench.status().unwrap();
    assert_eq!(status.level, MessageLevel::Error);
    assert!(status.text.starts_with("Docker Compose: "));
    assert!(status.text.contains("daemon not running"));
}

#[test]
fn interactive_request_is_returned_to_the_host() {
    let mut f = fixture();
    let spec = CommandSpec::new("docker", std::path::Path::new("/")).args(["attach", "x"]);

    let got = f
        .workbench
        .handle_message(AppMessage::Interactive(spec.clone()));
    assert_eq!(got, Some(spec.clone()));

    f.workbench
        .interactive_finished(&spec, Err(std::io::Error::other("no tty")));
    assert_eq!(f.workbench.status().unwrap().level, MessageLevel::Error);
}

#[test]
fn output_buffer_is_capped() {
    let mut f = fixture();
    for i in 0..OUTPUT_BUFFER_CAP + 100 {
        f.workbench.handle_message(AppMessage::Output(format!("line {}", i)));
    }

    let lines = f.workbench.output_lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), OUTPUT_BUFFER_CAP);
    assert_eq!(lines[0], "line 100");
}

#[test]
fn auto_refresh_toggle_follows_notifier() {
    let mut f = fixture();

    f.press(KeyCode::Char('p'));
    assert!(f.status_text().contains("off"));

    f.notifier.set_auto_refresh(Duration::from_secs(60));
    f.press(KeyCode::Char('p'));
    assert!(!f.notifier.is_auto_refresh_enabled());
    f.press(KeyCode::Char('p'));
    assert!(f.notifier.is_auto_refresh_enabled());
    f.notifier.close();
}

#[test]
fn quit_and_unbound_keys() {
    let mut f = fixture();
    assert_eq!(f.press(KeyCode::Char('q')), KeyOutcome::Quit);
    assert_eq!(f.press(KeyCode::Char('z')), KeyOutcome::Ignored);
}
