use super::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::prompt::scripted::{Answer, ScriptedPrompter};
use crate::render::SharedBuffer;
use crate::theme::ThemeName;

#[derive(Default)]
struct MockRunner {
    tasks: Mutex<Vec<(String, String)>>,
    fail: bool,
    hang: bool,
    aborted: AtomicBool,
    shut_down: AtomicBool,
}

#[async_trait]
impl TaskRunner for MockRunner {
    async fn run(&self, task: &str, api_key: &str) -> anyhow::Result<String> {
        self.tasks.lock().push((task.to_string(), api_key.to_string()));
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail {
            anyhow::bail!("Provider error: Network error: refused");
        }
        Ok(format!("done: {}", task))
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

struct Harness {
    session: Session,
    store: Arc<ConfigStore>,
    themes: Arc<ThemeRegistry>,
    prompter: Arc<ScriptedPrompter>,
    runner: Arc<MockRunner>,
    output: SharedBuffer,
    _dir: tempfile::TempDir,
}

fn line(s: &str) -> Answer {
    Answer::Line(s.to_string())
}

fn harness(answers: Vec<Answer>, runner: MockRunner, configured: bool) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ConfigStore::load_in(dir.path()));
    if configured {
        store.set_api_key("sk-configured-key");
        store.set_first_run(false);
    }
    let themes = Arc::new(ThemeRegistry::new());
    let output = SharedBuffer::default();
    let renderer = Arc::new(Renderer::with_writer(themes.clone(), Box::new(output.clone())));
    let prompter = Arc::new(ScriptedPrompter::new(answers));
    let runner = Arc::new(runner);
    let session = Session::new(
        store.clone(),
        themes.clone(),
        renderer,
        prompter.clone(),
        runner.clone(),
    );
    Harness {
        session,
        store,
        themes,
        prompter,
        runner,
        output,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_first_run_setup() {
    let h = harness(
        vec![
            Answer::ApiKey("sk-first-run-key".to_string()),
            Answer::Theme(ThemeName::Forest),
            line(""),
            line("/exit"),
        ],
        MockRunner::default(),
        false,
    );
    assert!(h.store.is_first_run());

    h.session.run().await.unwrap();

    assert!(!h.store.is_first_run());
    assert_eq!(h.store.theme(), "forest");
    assert_eq!(h.store.api_key().as_deref(), Some("sk-first-run-key"));
    assert_eq!(h.themes.current(), ThemeName::Forest);

    let out = h.output.contents();
    assert!(out.contains("Welcome to WebVision AI!"));
    assert!(out.contains("Setup completed successfully!"));
    assert!(out.contains("Goodbye!"));
    assert_eq!(h.prompter.asked()[2], "Press Enter to continue...");
}

#[tokio::test]
async fn test_tasks_and_commands() {
    let h = harness(
        vec![line("   "), line("open example.com"), line("/status"), line("/exit")],
        MockRunner::default(),
        true,
    );

    h.session.run().await.unwrap();

    let tasks = h.runner.tasks.lock().clone();
    assert_eq!(tasks, vec![("open example.com".to_string(), "sk-configured-key".to_string())]);
    let out = h.output.contents();
    assert!(out.contains("Agent started with task:"));
    assert!(out.contains("done: open example.com"));
    assert!(out.contains("✅ Configured"));
    assert!(h.runner.shut_down.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_missing_api_key_blocks_run() {
    let h = harness(vec![line("do something"), line("/exit")], MockRunner::default(), false);
    h.store.set_first_run(false);

    h.session.run().await.unwrap();

    assert!(h.runner.tasks.lock().is_empty());
    assert!(h.output.contents().contains("API key is not set"));
}

#[tokio::test]
async fn test_fallback_api_key() {
    let h = harness(vec![line("task"), line("/exit")], MockRunner::default(), false);
    h.store.set_first_run(false);
    let session = h.session.with_fallback_api_key(Some("sk-from-env-123".to_string()));

    session.run().await.unwrap();

    assert_eq!(h.runner.tasks.lock()[0].1, "sk-from-env-123");
}

#[tokio::test]
async fn test_agent_failure_keeps_looping() {
    let runner = MockRunner {
        fail: true,
        ..Default::default()
    };
    let h = harness(vec![line("first"), line("second"), line("/exit")], runner, true);

    h.session.run().await.unwrap();

    assert_eq!(h.runner.tasks.lock().len(), 2);
    assert!(h.output.contents().contains("Network error: refused"));
}

#[tokio::test]
async fn test_cancelled_prompt_ends_session() {
    let h = harness(vec![Answer::Cancel], MockRunner::default(), true);

    h.session.run().await.unwrap();

    assert!(h.output.contents().contains("Goodbye!"));
    assert!(h.runner.shut_down.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_during_run_exits() {
    let runner = MockRunner {
        hang: true,
        ..Default::default()
    };
    let h = harness(vec![line("slow task")], runner, true);

    let interrupt = h.session.interrupt_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        interrupt.interrupt();
    });

    h.session.run().await.unwrap();

    assert!(h.runner.aborted.load(Ordering::SeqCst));
    assert!(h.runner.shut_down.load(Ordering::SeqCst));
    assert!(h.output.contents().contains("Interrupted"));
}

#[tokio::test]
async fn test_interrupt_outside_run_is_not_kept() {
    let h = harness(
        vec![line("open example.com"), line("/status"), line("/exit")],
        MockRunner::default(),
        true,
    );

    h.session.interrupt_handle().interrupt();
    h.session.run().await.unwrap();

    assert_eq!(h.runner.tasks.lock().len(), 1);
    assert!(!h.runner.aborted.load(Ordering::SeqCst));
    let out = h.output.contents();
    assert!(out.contains("done: open example.com"));
    assert!(out.contains("✅ Configured"));
    assert!(!out.contains("Interrupted"));
}

#[tokio::test]
async fn test_interrupt_at_prompt_ends_session() {
    let h = harness(
        vec![Answer::Slow(Duration::from_millis(500), "late task".to_string())],
        MockRunner::default(),
        true,
    );

    let interrupt = h.session.interrupt_handle();
    let signals = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(20)).await;
            interrupt.interrupt();
        }
    });

    h.session.run().await.unwrap();
    signals.abort();

    assert!(h.runner.tasks.lock().is_empty());
    assert!(h.runner.shut_down.load(Ordering::SeqCst));
    assert!(h.output.contents().contains("Goodbye!"));
}
