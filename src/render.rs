//! Panel rendering for the interactive session.

use std::io::{self, Write};
use std::sync::Arc;

use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, execute};
use parking_lot::Mutex;
use tracing::warn;

use crate::commands::Command;
use crate::theme::{Role, ThemeRegistry};

/// Writes themed panels to an output stream.
pub struct Renderer {
    themes: Arc<ThemeRegistry>,
    out: Mutex<Box<dyn Write + Send>>,
    /// Whether `clear_screen` should emit terminal control codes.
    terminal: bool,
}

impl Renderer {
    pub fn stdout(themes: Arc<ThemeRegistry>) -> Self {
        Self {
            themes,
            out: Mutex::new(Box::new(io::stdout())),
            terminal: true,
        }
    }

    /// Render into an arbitrary writer. Screen clearing is skipped.
    pub fn with_writer(themes: Arc<ThemeRegistry>, out: Box<dyn Write + Send>) -> Self {
        Self {
            themes,
            out: Mutex::new(out),
            terminal: false,
        }
    }

    fn paint(&self, role: Role, text: &str) -> String {
        self.themes.paint(role, text)
    }

    fn emit(&self, lines: &[String]) {
        let mut out = self.out.lock();
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(out, "{}", line))
            .and_then(|_| out.flush());
        if let Err(e) = result {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    pub fn clear_screen(&self) {
        if !self.terminal {
            return;
        }
        let mut out = self.out.lock();
        if let Err(e) = execute!(out, Clear(ClearType::All), cursor::MoveTo(0, 0)) {
            warn!("Failed to clear screen: {}", e);
        }
    }

    fn banner(&self, subtitle: bool) -> Vec<String> {
        let bar = |s: &str| self.paint(Role::Primary, s);
        let mut lines = vec![
            bar("╭─────────────────────────────────────────╮"),
            format!(
                "{}           {}              {}",
                bar("│"),
                self.paint(Role::Highlight, " WebVision AI "),
                bar("│")
            ),
        ];
        if subtitle {
            lines.push(format!(
                "{}        {}            {}",
                bar("│"),
                self.paint(Role::Secondary, "Your AI Agent CLI"),
                bar("│")
            ));
        }
        lines.push(bar("╰─────────────────────────────────────────╯"));
        lines.push(String::new());
        lines
    }

    pub fn welcome(&self) {
        self.emit(&self.banner(true));
    }

    pub fn first_time_setup(&self) {
        self.emit(&[
            self.paint(Role::Warning, "🚀 Welcome to WebVision AI!"),
            self.paint(Role::Text, "Let's get you set up for the first time."),
            String::new(),
        ]);
    }

    pub fn setup_complete(&self) {
        self.emit(&[
            String::new(),
            self.paint(Role::Success, "✅ Setup completed successfully!"),
            self.paint(Role::Text, "You can now start using WebVision AI."),
            String::new(),
        ]);
    }

    pub fn help(&self) {
        let mut lines = vec![
            String::new(),
            self.paint(Role::Primary, "📋 Available Commands:"),
            String::new(),
        ];
        lines.extend(Command::ALL.iter().map(|cmd| {
            format!(
                "{}{} - {}",
                self.paint(Role::Secondary, cmd.name()),
                " ".repeat(9 - cmd.name().len()),
                cmd.description()
            )
        }));
        lines.extend([
            String::new(),
            self.paint(Role::Dim, "Type any other text to chat with AI"),
            String::new(),
        ]);
        self.emit(&lines);
    }

    pub fn status(&self, api_key_set: bool, theme: &str) {
        let key_state = if api_key_set {
            self.paint(Role::Success, "✅ Configured")
        } else {
            self.paint(Role::Error, "❌ Not set")
        };
        self.emit(&[
            String::new(),
            self.paint(Role::Primary, "📊 Current Status:"),
            String::new(),
            format!("{}{}", self.paint(Role::Text, "API Key: "), key_state),
            format!("{}{}", self.paint(Role::Text, "Theme: "), self.paint(Role::Secondary, theme)),
            String::new(),
        ]);
    }

    pub fn error(&self, message: &str) {
        self.emit(&[
            String::new(),
            format!("{}{}", self.paint(Role::Error, "❌ Error: "), self.paint(Role::Text, message)),
            String::new(),
        ]);
    }

    pub fn success(&self, message: &str) {
        self.emit(&[
            String::new(),
            format!("{}{}", self.paint(Role::Success, "✅ "), self.paint(Role::Text, message)),
            String::new(),
        ]);
    }

    pub fn unknown_command(&self, input: &str) {
        self.emit(&[
            String::new(),
            format!(
                "{}{}",
                self.paint(Role::Error, "❌ Unknown command: "),
                self.paint(Role::Text, input)
            ),
            self.paint(Role::Dim, "Type /help to see available commands"),
            String::new(),
        ]);
    }

    pub fn agent_start(&self, task: &str) {
        self.emit(&[
            String::new(),
            self.paint(Role::Primary, "🤖 Agent started with task:"),
            self.paint(Role::Text, task),
            String::new(),
        ]);
    }

    pub fn agent_end(&self, response: &str) {
        self.emit(&[
            String::new(),
            self.paint(Role::Success, "✅ Agent completed the task!"),
            self.paint(Role::Text, "Response:"),
            self.paint(Role::Text, response),
            String::new(),
        ]);
    }

    pub fn goodbye(&self) {
        self.emit(&[
            String::new(),
            self.paint(Role::Success, "👋 Thank you for using WebVision AI!"),
            self.paint(Role::Dim, "Goodbye!"),
            String::new(),
        ]);
    }

    /// Prompt label in the active theme.
    pub fn prompt_label(&self, text: &str) -> String {
        self.paint(Role::Primary, text)
    }
}

/// Cloneable in-memory writer for capturing rendered output.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
