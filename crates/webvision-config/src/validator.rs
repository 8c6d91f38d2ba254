//! Settings validation.
//!
//! Nothing here is fatal: out-of-range values are reported as warnings and
//! clamped by [`SettingsValidator::sanitize`].

use crate::schema::Settings;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            path: path.to_string(),
            message: message.to_string(),
        });
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Settings validator.
pub struct SettingsValidator;

impl SettingsValidator {
    /// Check the settings without modifying them.
    pub fn validate(settings: &Settings) -> ValidationResult {
        let mut result = ValidationResult::default();

        if settings.agent.model.trim().is_empty() {
            result.warn("agent.model", "empty model name, using gpt-4o");
        }
        if settings.agent.max_turns == 0 {
            result.warn("agent.max_turns", "must be at least 1, using 1");
        }
        if settings.browser.viewport_width == 0 || settings.browser.viewport_height == 0 {
            result.warn("browser.viewport", "zero-sized viewport, using 1920x1080");
        }
        if settings.orchestrator.max_retries == 0 {
            result.warn("orchestrator.max_retries", "must be at least 1, using 1");
        }
        if settings.orchestrator.load_attempts == 0 {
            result.warn("orchestrator.load_attempts", "must be at least 1, using 1");
        }

        result
    }

    /// Validate and clamp invalid values to usable ones.
    pub fn sanitize(mut settings: Settings) -> (Settings, ValidationResult) {
        let result = Self::validate(&settings);

        if settings.agent.model.trim().is_empty() {
            settings.agent.model = "gpt-4o".to_string();
        }
        settings.agent.max_turns = settings.agent.max_turns.max(1);
        if settings.browser.viewport_width == 0 || settings.browser.viewport_height == 0 {
            settings.browser.viewport_width = 1920;
            settings.browser.viewport_height = 1080;
        }
        settings.orchestrator.max_retries = settings.orchestrator.max_retries.max(1);
        settings.orchestrator.load_attempts = settings.orchestrator.load_attempts.max(1);

        (settings, result)
    }
}
