//! Input (mouse and keyboard) operations for CDP page session.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{KeyEventType, MouseButton, MouseEventType};

use super::core::PageSession;

/// Key code and produced text for a named key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct KeyDefinition {
    pub code: &'static str,
    pub key_code: u32,
    pub text: Option<&'static str>,
}

impl PageSession {
    /// Click at coordinates.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": MouseEventType::MouseMoved,
                "x": x,
                "y": y,
                "button": MouseButton::None,
            })),
        )
        .await?;

        for event_type in [MouseEventType::MousePressed, MouseEventType::MouseReleased] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": MouseButton::Left,
                    "clickCount": 1,
                })),
            )
            .await?;
        }

        debug!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    /// Type text one character at a time, pausing `delay` between keystrokes.
    pub async fn type_text(&self, text: &str, delay: Duration) -> Result<(), CdpError> {
        let mut buf = [0u8; 4];
        for (i, ch) in text.chars().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let s: &str = ch.encode_utf8(&mut buf);
            match s {
                "\n" | "\r" => self.press_key("Enter").await?,
                "\t" => self.press_key("Tab").await?,
                _ => {
                    self.call(
                        "Input.dispatchKeyEvent",
                        Some(json!({"type": KeyEventType::KeyDown, "key": s, "text": s})),
                    )
                    .await?;
                    self.call(
                        "Input.dispatchKeyEvent",
                        Some(json!({"type": KeyEventType::KeyUp, "key": s})),
                    )
                    .await?;
                }
            }
        }
        debug!("Typed {} characters", text.chars().count());
        Ok(())
    }

    /// Press a key or a combination such as `Control+a`.
    pub async fn press_key(&self, combo: &str) -> Result<(), CdpError> {
        let parts: Vec<&str> = combo.split('+').filter(|p| !p.is_empty()).collect();
        let Some((key, modifier_names)) = parts.split_last() else {
            return Err(CdpError::InvalidResponse(format!("Empty key: {:?}", combo)));
        };
        let modifiers = Self::get_modifiers(modifier_names);

        let mut down = json!({
            "type": KeyEventType::RawKeyDown,
            "key": key,
            "modifiers": modifiers,
        });
        let mut up = json!({
            "type": KeyEventType::KeyUp,
            "key": key,
            "modifiers": modifiers,
        });

        if let Some(def) = Self::key_definition(key) {
            for event in [&mut down, &mut up] {
                event["code"] = json!(def.code);
                event["windowsVirtualKeyCode"] = json!(def.key_code);
            }
            if let Some(text) = def.text.filter(|_| modifiers == 0) {
                down["type"] = json!(KeyEventType::KeyDown);
                down["text"] = json!(text);
            }
        } else if key.chars().count() == 1 && modifiers == 0 {
            down["type"] = json!(KeyEventType::KeyDown);
            down["text"] = json!(key);
        }

        self.call("Input.dispatchKeyEvent", Some(down)).await?;
        self.call("Input.dispatchKeyEvent", Some(up)).await?;
        Ok(())
    }

    /// Get modifier flags from modifier names.
    pub(super) fn get_modifiers(modifiers: &[&str]) -> i32 {
        let mut flags = 0;
        for m in modifiers {
            match m.to_lowercase().as_str() {
                "alt" => flags |= 1,
                "control" | "ctrl" => flags |= 2,
                "meta" | "command" | "cmd" => flags |= 4,
                "shift" => flags |= 8,
                _ => {}
            }
        }
        flags
    }

    pub(super) fn key_definition(key: &str) -> Option<KeyDefinition> {
        let (code, key_code, text) = match key {
            "Enter" => ("Enter", 13, Some("\r")),
            "Tab" => ("Tab", 9, None),
            "Escape" => ("Escape", 27, None),
            "Backspace" => ("Backspace", 8, None),
            "Delete" => ("Delete", 46, None),
            " " | "Space" => ("Space", 32, Some(" ")),
            "ArrowUp" => ("ArrowUp", 38, None),
            "ArrowDown" => ("ArrowDown", 40, None),
            "ArrowLeft" => ("ArrowLeft", 37, None),
            "ArrowRight" => ("ArrowRight", 39, None),
            "Home" => ("Home", 36, None),
            "End" => ("End", 35, None),
            "PageUp" => ("PageUp", 33, None),
            "PageDown" => ("PageDown", 34, None),
            _ => return None,
        };
        Some(KeyDefinition { code, key_code, text })
    }
}
