//! Color themes for terminal output.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crossterm::style::{Color, ContentStyle, Stylize};
use parking_lot::RwLock;

/// Built-in theme names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeName {
    Default,
    Dark,
    Ocean,
    Sakura,
    Forest,
}

impl ThemeName {
    pub const ALL: [ThemeName; 5] = [
        ThemeName::Default,
        ThemeName::Dark,
        ThemeName::Ocean,
        ThemeName::Sakura,
        ThemeName::Forest,
    ];

    /// Key persisted in the config file.
    pub fn key(&self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::Dark => "dark",
            ThemeName::Ocean => "ocean",
            ThemeName::Sakura => "sakura",
            ThemeName::Forest => "forest",
        }
    }

    /// Label shown in the theme picker.
    pub fn label(&self) -> &'static str {
        match self {
            ThemeName::Default => "🌟 Default (Blue)",
            ThemeName::Dark => "🌙 Dark (Purple)",
            ThemeName::Ocean => "🌊 Ocean (Cyan)",
            ThemeName::Sakura => "🌸 Sakura (Pink)",
            ThemeName::Forest => "🍃 Forest (Green)",
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeName::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| format!("Unknown theme: {}", s))
    }
}

/// Semantic text roles a theme assigns styles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Primary,
    Secondary,
    Success,
    Warning,
    Error,
    Text,
    Dim,
    Highlight,
}

const PURPLE: Color = Color::Rgb { r: 160, g: 90, b: 220 };
const PINK: Color = Color::Rgb { r: 255, g: 135, b: 190 };

/// Role to style mapping.
pub struct Theme {
    styles: HashMap<Role, ContentStyle>,
}

impl Theme {
    fn build(name: ThemeName) -> Self {
        let (primary, secondary, highlight) = match name {
            ThemeName::Default => (
                Color::Blue,
                Color::Cyan,
                ContentStyle::new().on(Color::Blue).with(Color::White),
            ),
            ThemeName::Dark => (
                Color::Magenta,
                PURPLE,
                ContentStyle::new().on(Color::Magenta).with(Color::White),
            ),
            ThemeName::Ocean => (
                Color::Cyan,
                Color::Blue,
                ContentStyle::new().on(Color::Cyan).with(Color::Black),
            ),
            ThemeName::Sakura => (
                Color::Magenta,
                PINK,
                ContentStyle::new().on(Color::Magenta).with(Color::White),
            ),
            ThemeName::Forest => (
                Color::DarkGreen,
                Color::Green,
                ContentStyle::new().on(Color::DarkGreen).with(Color::Black),
            ),
        };

        let styles = HashMap::from([
            (Role::Primary, ContentStyle::new().with(primary)),
            (Role::Secondary, ContentStyle::new().with(secondary)),
            (Role::Success, ContentStyle::new().with(Color::Green)),
            (Role::Warning, ContentStyle::new().with(Color::Yellow)),
            (Role::Error, ContentStyle::new().with(Color::Red)),
            (Role::Text, ContentStyle::new().with(Color::White)),
            (Role::Dim, ContentStyle::new().with(Color::DarkGrey)),
            (Role::Highlight, highlight),
        ]);

        Self { styles }
    }

    pub fn style(&self, role: Role) -> Option<&ContentStyle> {
        self.styles.get(&role)
    }
}

/// All known themes plus the active selection.
pub struct ThemeRegistry {
    themes: HashMap<ThemeName, Theme>,
    current: RwLock<ThemeName>,
}

impl ThemeRegistry {
    pub fn new() -> Self {
        let themes = ThemeName::ALL
            .into_iter()
            .map(|name| (name, Theme::build(name)))
            .collect();
        Self {
            themes,
            current: RwLock::new(ThemeName::Default),
        }
    }

    pub fn current(&self) -> ThemeName {
        *self.current.read()
    }

    /// Switch themes. Unknown names keep the current theme and return false.
    pub fn set_theme(&self, name: &str) -> bool {
        match name.parse::<ThemeName>() {
            Ok(theme) if self.themes.contains_key(&theme) => {
                *self.current.write() = theme;
                true
            }
            _ => false,
        }
    }

    /// Style for a role in the active theme; unstyled when the theme has none.
    pub fn style_for(&self, role: Role) -> ContentStyle {
        self.themes
            .get(&self.current())
            .and_then(|t| t.style(role))
            .copied()
            .unwrap_or_default()
    }

    pub fn paint(&self, role: Role, text: &str) -> String {
        self.style_for(role).apply(text).to_string()
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_name_roundtrip() {
        for name in ThemeName::ALL {
            assert_eq!(name.key().parse::<ThemeName>().unwrap(), name);
        }
        assert!("neon".parse::<ThemeName>().is_err());
    }

    #[test]
    fn test_set_theme() {
        let registry = ThemeRegistry::new();
        assert_eq!(registry.current(), ThemeName::Default);
        assert!(registry.set_theme("sakura"));
        assert_eq!(registry.current(), ThemeName::Sakura);
    }

    #[test]
    fn test_unknown_theme_keeps_selection() {
        let registry = ThemeRegistry::new();
        registry.set_theme("ocean");
        assert!(!registry.set_theme("neon"));
        assert_eq!(registry.current(), ThemeName::Ocean);
    }

    #[test]
    fn test_style_follows_selection() {
        let registry = ThemeRegistry::new();
        assert_eq!(registry.style_for(Role::Primary).foreground_color, Some(Color::Blue));
        registry.set_theme("forest");
        assert_eq!(registry.style_for(Role::Primary).foreground_color, Some(Color::DarkGreen));
        assert_eq!(registry.style_for(Role::Error).foreground_color, Some(Color::Red));
    }

    #[test]
    fn test_paint_keeps_text() {
        let registry = ThemeRegistry::new();
        assert!(registry.paint(Role::Success, "done").contains("done"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(ThemeName::Sakura.to_string(), "🌸 Sakura (Pink)");
    }
}
