//! Slash command dispatch.

use std::sync::Arc;

use tracing::info;
use webvision_config::ConfigStore;

use crate::prompt::Prompter;
use crate::render::Renderer;
use crate::theme::ThemeRegistry;

/// Built-in slash commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    ApiKey,
    Theme,
    Status,
    Exit,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Help,
        Command::Clear,
        Command::ApiKey,
        Command::Theme,
        Command::Status,
        Command::Exit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "/help",
            Command::Clear => "/clear",
            Command::ApiKey => "/apikey",
            Command::Theme => "/theme",
            Command::Status => "/status",
            Command::Exit => "/exit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Help => "Show this help message",
            Command::Clear => "Clear the screen",
            Command::ApiKey => "Update OpenAI API key",
            Command::Theme => "Change color theme",
            Command::Status => "Show current configuration",
            Command::Exit => "Exit the application",
        }
    }

    /// Case-insensitive exact match.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == lowered)
    }
}

/// Whether the session loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub const THEME_PROMPT: &str = "Choose your preferred color theme:";

pub struct Dispatcher {
    store: Arc<ConfigStore>,
    themes: Arc<ThemeRegistry>,
    renderer: Arc<Renderer>,
    prompter: Arc<dyn Prompter>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<ConfigStore>,
        themes: Arc<ThemeRegistry>,
        renderer: Arc<Renderer>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            store,
            themes,
            renderer,
            prompter,
        }
    }

    pub fn execute(&self, input: &str) -> anyhow::Result<Flow> {
        let Some(command) = Command::parse(input) else {
            self.renderer.unknown_command(input);
            return Ok(Flow::Continue);
        };

        match command {
            Command::Help => self.renderer.help(),
            Command::Clear => self.renderer.clear_screen(),
            Command::ApiKey => self.update_api_key()?,
            Command::Theme => self.change_theme()?,
            Command::Status => self
                .renderer
                .status(self.store.api_key().is_some(), &self.store.theme()),
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn update_api_key(&self) -> anyhow::Result<()> {
        let Some(key) = self.prompter.api_key("Enter new OpenAI API key:")? else {
            return Ok(());
        };
        self.store.set_api_key(key);
        info!("API key updated");
        self.renderer.success("API key updated successfully!");
        Ok(())
    }

    fn change_theme(&self) -> anyhow::Result<()> {
        let Some(theme) = self.prompter.theme(THEME_PROMPT)? else {
            return Ok(());
        };
        self.store.set_theme(theme.key());
        self.themes.set_theme(theme.key());
        info!("Theme changed to {}", theme.key());
        self.renderer.success("Theme changed successfully!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::scripted::{Answer, ScriptedPrompter};
    use crate::render::SharedBuffer;
    use crate::theme::ThemeName;

    struct Harness {
        dispatcher: Dispatcher,
        store: Arc<ConfigStore>,
        themes: Arc<ThemeRegistry>,
        output: SharedBuffer,
        _dir: tempfile::TempDir,
    }

    fn harness(answers: Vec<Answer>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ConfigStore::load_in(dir.path()));
        let themes = Arc::new(ThemeRegistry::new());
        let output = SharedBuffer::default();
        let renderer = Arc::new(Renderer::with_writer(themes.clone(), Box::new(output.clone())));
        let dispatcher = Dispatcher::new(
            store.clone(),
            themes.clone(),
            renderer,
            Arc::new(ScriptedPrompter::new(answers)),
        );
        Harness {
            dispatcher,
            store,
            themes,
            output,
            _dir: dir,
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Command::parse("/HELP"), Some(Command::Help));
        assert_eq!(Command::parse("/ApiKey"), Some(Command::ApiKey));
        assert_eq!(Command::parse("/help me"), None);
        assert_eq!(Command::parse("help"), None);
    }

    #[test]
    fn test_unknown_command_continues() {
        let h = harness(vec![]);
        assert_eq!(h.dispatcher.execute("/Bogus").unwrap(), Flow::Continue);
        let out = h.output.contents();
        assert!(out.contains("Unknown command: "));
        assert!(out.contains("/Bogus"));
    }

    #[test]
    fn test_exit_returns_exit() {
        let h = harness(vec![]);
        assert_eq!(h.dispatcher.execute("/EXIT").unwrap(), Flow::Exit);
    }

    #[test]
    fn test_theme_updates_store_and_registry() {
        let h = harness(vec![Answer::Theme(ThemeName::Sakura)]);
        assert_eq!(h.dispatcher.execute("/theme").unwrap(), Flow::Continue);
        assert_eq!(h.store.theme(), "sakura");
        assert_eq!(h.themes.current(), ThemeName::Sakura);
        assert!(h.output.contents().contains("Theme changed successfully!"));

        let reloaded = ConfigStore::load_from(h.store.path());
        assert_eq!(reloaded.theme(), "sakura");
    }

    #[test]
    fn test_apikey_persists() {
        let h = harness(vec![Answer::ApiKey("sk-test-1234567890".to_string())]);
        h.dispatcher.execute("/apikey").unwrap();
        assert_eq!(h.store.api_key().as_deref(), Some("sk-test-1234567890"));
        assert!(h.output.contents().contains("API key updated successfully!"));
    }

    #[test]
    fn test_cancelled_prompt_changes_nothing() {
        let h = harness(vec![Answer::Cancel]);
        assert_eq!(h.dispatcher.execute("/theme").unwrap(), Flow::Continue);
        assert_eq!(h.store.theme(), "default");
        assert_eq!(h.themes.current(), ThemeName::Default);
    }

    #[test]
    fn test_status_reports_configuration() {
        let h = harness(vec![]);
        h.dispatcher.execute("/status").unwrap();
        let out = h.output.contents();
        assert!(out.contains("❌ Not set"));
        assert!(out.contains("default"));
    }
}
