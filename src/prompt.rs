//! Interactive prompts.
//!
//! [`InquirePrompter`] drives the terminal; tests substitute a scripted
//! implementation. Every prompt returns `Ok(None)` when the user cancels
//! with Esc or Ctrl-C.

use std::io::{self, BufRead, Write};

use inquire::validator::Validation;
use inquire::{CustomUserError, InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::theme::ThemeName;

pub const INVALID_API_KEY: &str = "Please enter a valid API key";
const MIN_API_KEY_LEN: usize = 10;

/// Reject keys that are obviously not keys.
pub fn validate_api_key(input: &str) -> Result<(), &'static str> {
    if input.len() < MIN_API_KEY_LEN {
        Err(INVALID_API_KEY)
    } else {
        Ok(())
    }
}

pub trait Prompter: Send + Sync {
    /// Read one line of free text.
    fn line(&self, message: &str) -> anyhow::Result<Option<String>>;

    /// Read an API key, masked and validated.
    fn api_key(&self, message: &str) -> anyhow::Result<Option<String>>;

    /// Pick a color theme.
    fn theme(&self, message: &str) -> anyhow::Result<Option<ThemeName>>;

    /// Wait for Enter.
    fn pause(&self) -> anyhow::Result<()> {
        self.line("Press Enter to continue...").map(|_| ())
    }
}

/// Terminal prompts with a plain stdin fallback when no TTY is attached.
pub struct InquirePrompter;

impl InquirePrompter {
    fn read_line() -> anyhow::Result<Option<String>> {
        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn fallback_prompt(message: &str) -> anyhow::Result<Option<String>> {
        print!("{} ", message);
        io::stdout().flush()?;
        Self::read_line()
    }
}

fn cancelled(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

impl Prompter for InquirePrompter {
    fn line(&self, message: &str) -> anyhow::Result<Option<String>> {
        match Text::new(message).prompt() {
            Ok(v) => Ok(Some(v)),
            Err(e) if cancelled(&e) => Ok(None),
            Err(InquireError::NotTTY) => Self::fallback_prompt(message),
            Err(e) => Err(e.into()),
        }
    }

    fn api_key(&self, message: &str) -> anyhow::Result<Option<String>> {
        let result = Password::new(message)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_validator(|input: &str| {
                Ok::<_, CustomUserError>(match validate_api_key(input) {
                    Ok(()) => Validation::Valid,
                    Err(msg) => Validation::Invalid(msg.into()),
                })
            })
            .prompt();

        match result {
            Ok(v) => Ok(Some(v)),
            Err(e) if cancelled(&e) => Ok(None),
            Err(InquireError::NotTTY) => loop {
                let Some(input) = Self::fallback_prompt(message)? else {
                    return Ok(None);
                };
                match validate_api_key(input.trim()) {
                    Ok(()) => return Ok(Some(input.trim().to_string())),
                    Err(msg) => println!("  {}", msg),
                }
            },
            Err(e) => Err(e.into()),
        }
    }

    fn theme(&self, message: &str) -> anyhow::Result<Option<ThemeName>> {
        match Select::new(message, ThemeName::ALL.to_vec()).prompt() {
            Ok(v) => Ok(Some(v)),
            Err(e) if cancelled(&e) => Ok(None),
            Err(InquireError::NotTTY) => {
                println!();
                for (i, theme) in ThemeName::ALL.iter().enumerate() {
                    println!("  [{}] {}", i, theme);
                }
                loop {
                    let Some(input) = Self::fallback_prompt(message)? else {
                        return Ok(None);
                    };
                    if let Some(theme) = input
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| ThemeName::ALL.get(i))
                    {
                        return Ok(Some(*theme));
                    }
                    println!("  (enter a valid number)");
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::{Prompter, validate_api_key};
    use crate::theme::ThemeName;

    /// One scripted answer.
    #[derive(Debug, Clone)]
    pub enum Answer {
        Line(String),
        ApiKey(String),
        Theme(ThemeName),
        /// A line the user takes a while to type.
        Slow(std::time::Duration, String),
        /// The user pressed Esc or Ctrl-C.
        Cancel,
    }

    /// Replays queued answers in order and records every prompt message.
    #[derive(Default)]
    pub struct ScriptedPrompter {
        answers: Mutex<VecDeque<Answer>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().collect()),
                asked: Mutex::new(Vec::new()),
            }
        }

        pub fn asked(&self) -> Vec<String> {
            self.asked.lock().clone()
        }

        fn next(&self, message: &str) -> anyhow::Result<Answer> {
            self.asked.lock().push(message.to_string());
            self.answers
                .lock()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("No scripted answer for prompt: {}", message))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn line(&self, message: &str) -> anyhow::Result<Option<String>> {
            match self.next(message)? {
                Answer::Line(v) => Ok(Some(v)),
                Answer::Slow(delay, v) => {
                    std::thread::sleep(delay);
                    Ok(Some(v))
                }
                Answer::Cancel => Ok(None),
                other => anyhow::bail!("Expected a line answer, got {:?}", other),
            }
        }

        fn api_key(&self, message: &str) -> anyhow::Result<Option<String>> {
            match self.next(message)? {
                Answer::ApiKey(v) => {
                    validate_api_key(&v).map_err(anyhow::Error::msg)?;
                    Ok(Some(v))
                }
                Answer::Cancel => Ok(None),
                other => anyhow::bail!("Expected an API key answer, got {:?}", other),
            }
        }

        fn theme(&self, message: &str) -> anyhow::Result<Option<ThemeName>> {
            match self.next(message)? {
                Answer::Theme(v) => Ok(Some(v)),
                Answer::Cancel => Ok(None),
                other => anyhow::bail!("Expected a theme answer, got {:?}", other),
            }
        }
    }
}
