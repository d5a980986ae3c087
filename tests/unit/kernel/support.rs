//! Test doubles shared by the kernel unit tests.

use crate::kernel::compose::{Project, WorkspaceFolder};
use crate::kernel::services::ports::{
    AsyncExecutor, BoxFuture, CapturedOutput, CommandSpec, DocumentError, DocumentHost,
    DocumentId, ExecError, MessageSink, OutputFuture, ProcessExit, ProcessHandle,
    ProcessSpawner, Settings,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

pub(crate) fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

struct OutputRule {
    needle: String,
    output: CapturedOutput,
}

/// Records every command; spawned processes exit only when the test says so.
#[derive(Default)]
pub(crate) struct FakeSpawner {
    spawned: Mutex<Vec<CommandSpec>>,
    exits: Mutex<Vec<Option<oneshot::Sender<ProcessExit>>>>,
    outputs: Mutex<Vec<CommandSpec>>,
    interactive: Mutex<Vec<CommandSpec>>,
    rules: Mutex<Vec<OutputRule>>,
    output_calls: AtomicUsize,
    output_delay: Mutex<Option<Duration>>,
    fail_spawn: AtomicBool,
    next_pid: AtomicU32,
}

impl FakeSpawner {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Captured commands whose args contain `needle` answer with `stdout`.
    pub(crate) fn on_output(&self, needle: &str, stdout: &str) {
        self.push_rule(needle, CapturedOutput::ok(stdout));
    }

    pub(crate) fn on_output_failure(&self, needle: &str, code: i32, stderr: &str) {
        self.push_rule(
            needle,
            CapturedOutput {
                exit: ProcessExit::with_code(code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
    }

    pub(crate) fn on_output_captured(&self, needle: &str, output: CapturedOutput) {
        self.push_rule(needle, output);
    }

    fn push_rule(&self, needle: &str, output: CapturedOutput) {
        self.rules.lock().unwrap().push(OutputRule {
            needle: needle.to_string(),
            output,
        });
    }

    pub(crate) fn set_output_delay(&self, delay: Duration) {
        *self.output_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn fail_spawns(&self) {
        self.fail_spawn.store(true, Ordering::SeqCst);
    }

    pub(crate) fn spawned(&self) -> Vec<CommandSpec> {
        self.spawned.lock().unwrap().clone()
    }

    pub(crate) fn outputs(&self) -> Vec<CommandSpec> {
        self.outputs.lock().unwrap().clone()
    }

    pub(crate) fn interactive_calls(&self) -> Vec<CommandSpec> {
        self.interactive.lock().unwrap().clone()
    }

    pub(crate) fn output_calls(&self) -> usize {
        self.output_calls.load(Ordering::SeqCst)
    }

    /// Lets the `index`-th spawned process exit with `code`.
    pub(crate) fn finish(&self, index: usize, code: i32) {
        let tx = self.exits.lock().unwrap()[index].take();
        if let Some(tx) = tx {
            let _ = tx.send(ProcessExit::with_code(code));
        }
    }
}

fn args_line(spec: &CommandSpec) -> String {
    spec.args.join(" ")
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, spec: CommandSpec) -> Result<ProcessHandle, ExecError> {
        if self.fail_spawn.load(Ordering::SeqCst) {
            return Err(ExecError::SpawnFailed {
                program: spec.program,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            });
        }
        let (tx, rx) = oneshot::channel();
        self.spawned.lock().unwrap().push(spec);
        self.exits.lock().unwrap().push(Some(tx));
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst) + 100;
        Ok(ProcessHandle::new(Some(pid), async move {
            rx.await.unwrap_or(ProcessExit { code: None })
        }))
    }

    fn output(&self, spec: CommandSpec) -> OutputFuture {
        self.output_calls.fetch_add(1, Ordering::SeqCst);
        let line = args_line(&spec);
        let output = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|rule| line.contains(&rule.needle))
            .map(|rule| rule.output.clone())
            .unwrap_or_else(|| CapturedOutput::ok(""));
        self.outputs.lock().unwrap().push(spec);
        let delay = *self.output_delay.lock().unwrap();
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(output)
        })
    }

    fn interactive(&self, spec: CommandSpec) -> Result<(), ExecError> {
        if self.fail_spawn.load(Ordering::SeqCst) {
            return Err(ExecError::HostUnavailable("no terminal".to_string()));
        }
        self.interactive.lock().unwrap().push(spec);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeMessages {
    errors: Mutex<Vec<String>>,
}

impl FakeMessages {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl MessageSink for FakeMessages {
    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// In-memory untitled documents: `(title, text)` in open order.
#[derive(Default)]
pub(crate) struct FakeDocuments {
    docs: Mutex<Vec<(String, String)>>,
}

impl FakeDocuments {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn docs(&self) -> Vec<(String, String)> {
        self.docs.lock().unwrap().clone()
    }
}

impl DocumentHost for FakeDocuments {
    fn open_untitled(&self, title: &str) -> Result<DocumentId, DocumentError> {
        let mut docs = self.docs.lock().unwrap();
        docs.push((title.to_string(), String::new()));
        Ok(DocumentId(docs.len() as u64))
    }

    fn insert(&self, id: DocumentId, offset: usize, text: &str) -> Result<(), DocumentError> {
        let mut docs = self.docs.lock().unwrap();
        let Some((_, body)) = docs.get_mut((id.0 as usize).wrapping_sub(1)) else {
            return Err(DocumentError::NotFound(id));
        };
        let len = body.chars().count();
        if offset > len {
            return Err(DocumentError::OutOfRange { id, offset, len });
        }
        let byte = body
            .char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        body.insert_str(byte, text);
        Ok(())
    }
}

pub(crate) struct HandleExecutor(pub tokio::runtime::Handle);

impl AsyncExecutor for HandleExecutor {
    fn spawn(&self, task: BoxFuture) {
        self.0.spawn(task);
    }
}

pub(crate) fn folder(index: usize, name: &str) -> WorkspaceFolder {
    WorkspaceFolder::new(index, PathBuf::from("/work").join(name))
}

pub(crate) fn project(name: &str, spawner: Arc<FakeSpawner>) -> Project {
    Project::from_folder(&folder(0, name), &Settings::default(), spawner)
}

pub(crate) const WEB_PS: &str = r#"{"Name":"shop-web-1","Service":"web","State":"running","Status":"Up 3 minutes"}"#;
pub(crate) const DB_PS: &str = r#"{"Name":"shop-db-1","Service":"db","State":"exited","Status":"Exited (0) 1 hour ago"}"#;
