//! TUI palette.
//!
//! The `[colors]` section names seven base colors; every widget style is
//! derived from them. Values are anything ratatui understands as a color:
//! a name ("LightBlue", "dark gray"), a 256-color index ("208") or "#RRGGBB".

use ratatui::style::{Color, Modifier, Style};
use serde::{de, Deserialize, Deserializer};

use crate::bookmarks::BookmarkList;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Focused borders, the active tab and the focused selection.
    #[serde(deserialize_with = "deserialize_color")]
    pub accent: Color,
    /// Unfocused borders and selection, the status bar background.
    #[serde(deserialize_with = "deserialize_color")]
    pub muted: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub text: Color,
    /// Publisher names.
    #[serde(deserialize_with = "deserialize_color")]
    pub source: Color,
    /// Favorite marker, author and dates.
    #[serde(deserialize_with = "deserialize_color")]
    pub highlight: Color,
    /// URLs and the read-later marker.
    #[serde(deserialize_with = "deserialize_color")]
    pub link: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub error: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            text: Color::White,
            source: Color::Green,
            highlight: Color::Yellow,
            link: Color::LightBlue,
            error: Color::LightRed,
        }
    }
}

impl ColorConfig {
    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.accent } else { self.muted })
    }

    pub fn selection(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .bg(self.accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(self.muted).fg(self.text)
        }
    }

    pub fn tab(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text)
        }
    }

    pub fn marker(&self, list: BookmarkList) -> Style {
        match list {
            BookmarkList::Favorites => Style::default().fg(self.highlight),
            BookmarkList::ReadLater => Style::default().fg(self.link),
        }
    }

    pub fn headline(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn source(&self) -> Style {
        Style::default().fg(self.source)
    }

    pub fn metadata(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    pub fn link(&self) -> Style {
        Style::default().fg(self.link)
    }

    /// Dimmed text, e.g. saved links whose article is not loaded.
    pub fn faint(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn status_bar(&self, is_error: bool) -> Style {
        let fg = if is_error { self.error } else { self.text };
        Style::default().fg(fg).bg(self.muted)
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .parse::<Color>()
        .map_err(|_| de::Error::custom(format!("unknown color {:?}", raw)))
}
