//! `[keybindings]`: one list of keys per TUI action.
//!
//! Bindings are parsed when the config is loaded, so a typo is reported as a
//! config error instead of a key that silently does nothing.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{de, Deserialize, Deserializer};

use crate::tui::event::Action;

/// A key plus the modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn key(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// Shift is ignored when the binding does not ask for it: terminals
    /// report "R" as `Char('R')` with SHIFT held.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (key.modifiers == self.modifiers
                || key.modifiers - KeyModifiers::SHIFT == self.modifiers)
    }
}

/// Accepts "j", "R", "/", "PageDown", "F5", "Ctrl+c", "Shift+Tab",
/// "Ctrl+Alt+x". Names and modifiers are case-insensitive.
impl FromStr for KeyBinding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, key) = match s.rsplit_once('+') {
            Some((prefix, key)) if !key.is_empty() => (prefix, key),
            _ => ("", s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for name in prefix.split('+').filter(|m| !m.is_empty()) {
            modifiers |= match name.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "shift" => KeyModifiers::SHIFT,
                "alt" | "meta" => KeyModifiers::ALT,
                _ => return Err(format!("unknown modifier {:?} in {:?}", name, s)),
            };
        }

        let code = key_code(key.trim()).ok_or_else(|| format!("unknown key {:?}", s))?;
        Ok(Self { code, modifiers })
    }
}

fn key_code(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let lower = name.to_ascii_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then_some(KeyCode::F(n));
    }

    Some(match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys(Vec<KeyBinding>);

impl Keys {
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.0.iter().any(|binding| binding.matches(key))
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.0
    }
}

impl<const N: usize> From<[KeyBinding; N]> for Keys {
    fn from(bindings: [KeyBinding; N]) -> Self {
        Keys(bindings.to_vec())
    }
}

impl<'de> Deserialize<'de> for Keys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| raw.parse().map_err(de::Error::custom))
            .collect::<Result<Vec<_>, _>>()
            .map(Keys)
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::F(n) => write!(f, "F{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Keys,
    pub move_up: Keys,
    pub move_down: Keys,
    pub next_page: Keys,
    pub prev_page: Keys,
    pub next_pane: Keys,
    pub prev_pane: Keys,
    pub next_tab: Keys,
    pub prev_tab: Keys,
    pub select: Keys,
    pub toggle_favorite: Keys,
    pub toggle_read_later: Keys,
    pub open_in_browser: Keys,
    pub refresh: Keys,
    pub retry: Keys,
    pub search: Keys,
    pub cycle_category: Keys,
    pub cycle_date_filter: Keys,
    pub switch_bookmark_list: Keys,
    pub toggle_maximize: Keys,
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        use KeyBinding as K;
        Self {
            quit: [K::char('q'), K::ctrl('c')].into(),
            move_up: [K::char('k'), K::key(KeyCode::Up)].into(),
            move_down: [K::char('j'), K::key(KeyCode::Down)].into(),
            next_page: [K::char('n'), K::key(KeyCode::PageDown)].into(),
            prev_page: [K::char('p'), K::key(KeyCode::PageUp)].into(),
            next_pane: [K::key(KeyCode::Tab)].into(),
            prev_pane: [K::key(KeyCode::BackTab)].into(),
            next_tab: [K::char(']'), K::key(KeyCode::Right)].into(),
            prev_tab: [K::char('['), K::key(KeyCode::Left)].into(),
            select: [K::key(KeyCode::Enter)].into(),
            toggle_favorite: [K::char('f')].into(),
            toggle_read_later: [K::char('l')].into(),
            open_in_browser: [K::char('o')].into(),
            refresh: [K::char('R')].into(),
            retry: [K::char('r')].into(),
            search: [K::char('/')].into(),
            cycle_category: [K::char('c')].into(),
            cycle_date_filter: [K::char('d')].into(),
            switch_bookmark_list: [K::char('b')].into(),
            toggle_maximize: [K::char('m')].into(),
        }
    }
}

impl KeybindingConfig {
    /// First action whose keys match; `Action::None` if nothing does.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        [
            (&self.quit, Action::Quit),
            (&self.move_up, Action::MoveUp),
            (&self.move_down, Action::MoveDown),
            (&self.next_page, Action::NextPage),
            (&self.prev_page, Action::PrevPage),
            (&self.next_pane, Action::NextPane),
            (&self.prev_pane, Action::PrevPane),
            (&self.next_tab, Action::NextTab),
            (&self.prev_tab, Action::PrevTab),
            (&self.select, Action::Select),
            (&self.toggle_favorite, Action::ToggleFavorite),
            (&self.toggle_read_later, Action::ToggleReadLater),
            (&self.open_in_browser, Action::OpenInBrowser),
            (&self.refresh, Action::Refresh),
            (&self.retry, Action::Retry),
            (&self.search, Action::Search),
            (&self.cycle_category, Action::CycleCategory),
            (&self.cycle_date_filter, Action::CycleDateFilter),
            (&self.switch_bookmark_list, Action::SwitchBookmarkList),
            (&self.toggle_maximize, Action::ToggleMaximize),
        ]
        .into_iter()
        .find(|(keys, _)| keys.matches(key))
        .map_or(Action::None, |(_, action)| action)
    }
}
