// ClipGuardian - Raccourcis clavier
//
// Parse les combinaisons du fichier de configuration ("Ctrl+Alt+Down")
// et associe une combinaison pressee a une action du moteur.
//
// # Syntaxe
// Elements separes par `+` ou `-`, insensibles a la casse :
// - modificateurs : ctrl/control/strg, alt/option, shift, win/meta/super/cmd
// - exactement une touche : A-Z, 0-9, F1-F24 ou une touche nommee
//
// L'enregistrement aupres du systeme reste a la charge de l'UI : le
// moteur recoit la combinaison pressee via `Action::Hotkey`.

use crate::error::{CgError, CgResult};
use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Modificateurs d'un raccourci.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL  = 0b0001;
        const ALT   = 0b0010;
        const SHIFT = 0b0100;
        const WIN   = 0b1000;
    }
}

/// Touche principale d'un raccourci.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Lettre majuscule ou chiffre
    Char(char),
    /// Touche de fonction F1-F24
    F(u8),
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,
    Space,
    Tab,
    Escape,
    Enter,
    Backspace,
    Plus,
    Minus,
    Comma,
    Period,
}

impl Key {
    fn parse(token: &str) -> Option<Self> {
        let lower = token.to_ascii_lowercase();
        let named = match lower.as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "pageup" | "pgup" => Some(Self::PageUp),
            "pagedown" | "pgdn" => Some(Self::PageDown),
            "home" => Some(Self::Home),
            "end" => Some(Self::End),
            "insert" | "ins" => Some(Self::Insert),
            "delete" | "del" => Some(Self::Delete),
            "space" => Some(Self::Space),
            "tab" => Some(Self::Tab),
            "esc" | "escape" => Some(Self::Escape),
            "enter" | "return" => Some(Self::Enter),
            "backspace" => Some(Self::Backspace),
            "plus" => Some(Self::Plus),
            "minus" => Some(Self::Minus),
            "comma" => Some(Self::Comma),
            "period" | "dot" => Some(Self::Period),
            _ => None,
        };
        if named.is_some() {
            return named;
        }

        let mut chars = lower.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => Some(Self::Char(c.to_ascii_uppercase())),
            (Some('f'), Some(_)) => match lower[1..].parse::<u8>() {
                Ok(n) if (1..=24).contains(&n) => Some(Self::F(n)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c),
            Self::F(n) => write!(f, "F{}", n),
            other => {
                let name = match other {
                    Self::Up => "Up",
                    Self::Down => "Down",
                    Self::Left => "Left",
                    Self::Right => "Right",
                    Self::PageUp => "PageUp",
                    Self::PageDown => "PageDown",
                    Self::Home => "Home",
                    Self::End => "End",
                    Self::Insert => "Insert",
                    Self::Delete => "Delete",
                    Self::Space => "Space",
                    Self::Tab => "Tab",
                    Self::Escape => "Escape",
                    Self::Enter => "Enter",
                    Self::Backspace => "Backspace",
                    Self::Plus => "Plus",
                    Self::Minus => "Minus",
                    Self::Comma => "Comma",
                    _ => "Period",
                };
                f.write_str(name)
            }
        }
    }
}

/// Combinaison modificateurs + touche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl Hotkey {
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// Parse une combinaison ("Ctrl+Alt+Down").
    ///
    /// # Errors
    /// `CgError::Configuration` si la chaine est vide, sans touche, avec
    /// plusieurs touches ou une touche inconnue.
    pub fn parse(s: &str) -> CgResult<Self> {
        let tokens: Vec<&str> = s
            .split(['+', '-'])
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(CgError::Configuration("empty hotkey".into()));
        }

        let mut modifiers = Modifiers::empty();
        let mut key = None;
        for token in tokens {
            let modifier = match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "strg" => Some(Modifiers::CTRL),
                "alt" | "option" => Some(Modifiers::ALT),
                "shift" => Some(Modifiers::SHIFT),
                "win" | "meta" | "super" | "cmd" => Some(Modifiers::WIN),
                _ => None,
            };
            if let Some(m) = modifier {
                modifiers |= m;
                continue;
            }
            let parsed = Key::parse(token)
                .ok_or_else(|| CgError::Configuration(format!("unknown key '{}' in hotkey '{}'", token, s)))?;
            if key.replace(parsed).is_some() {
                return Err(CgError::Configuration(format!("hotkey '{}' has several keys", s)));
            }
        }

        let key = key.ok_or_else(|| CgError::Configuration(format!("hotkey '{}' has no key", s)))?;
        Ok(Self { modifiers, key })
    }
}

impl FromStr for Hotkey {
    type Err = CgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::WIN, "Win"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{}+", name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}

/// Action declenchee par un raccourci.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Advance,
    Retreat,
    Commit,
    Cancel,
    OpenBrowser,
}

/// Raccourcis resolus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBindings {
    pub advance: Hotkey,
    pub retreat: Hotkey,
    pub commit: Hotkey,
    pub cancel: Hotkey,
    pub open_browser: Hotkey,
}

impl HotkeyBindings {
    /// Retourne l'action associee a une combinaison pressee.
    pub fn action_for(&self, pressed: &Hotkey) -> Option<HotkeyAction> {
        [
            (&self.advance, HotkeyAction::Advance),
            (&self.retreat, HotkeyAction::Retreat),
            (&self.commit, HotkeyAction::Commit),
            (&self.cancel, HotkeyAction::Cancel),
            (&self.open_browser, HotkeyAction::OpenBrowser),
        ]
        .into_iter()
        .find(|(hotkey, _)| *hotkey == pressed)
        .map(|(_, action)| action)
    }
}
