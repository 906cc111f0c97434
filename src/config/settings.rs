// ClipGuardian - Structure de configuration et valeurs par defaut
//
// Ce module definit la structure `Settings` qui centralise tous les
// parametres du moteur : historique, scrutation, persistance, apercu
// et raccourcis.
//
// # Chargement
// `Settings::load(path)` lit le fichier TOML et ne echoue jamais :
// fichier absent -> defauts ; fichier illisible -> defauts + warn.
// Les sections et champs manquants conservent leur defaut.
// Les valeurs hors bornes sont clampees ou remplacees par le defaut
// (`sanitized`).
//
// # Fichier par defaut
// `Settings::save_default(path)` genere un fichier de configuration
// commente avec toutes les options disponibles et leurs valeurs.
//
// # Repertoire de donnees
// `dirs::data_dir()/ClipGuardian` (ex: %APPDATA%\ClipGuardian,
// ~/.local/share/ClipGuardian), sinon le repertoire courant.

use crate::config::hotkey::{Hotkey, HotkeyBindings, Key, Modifiers};
use crate::constants::*;
use crate::error::{CgError, CgResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration complete du moteur.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub history: HistorySettings,
    pub watcher: WatcherSettings,
    pub persistence: PersistenceSettings,
    pub preview: PreviewSettings,
    pub hotkeys: HotkeySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub capacity: usize,
    pub max_entry_size_kb: usize,
    pub auto_clear_enabled: bool,
    pub auto_clear_interval_minutes: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            max_entry_size_kb: DEFAULT_MAX_ENTRY_SIZE_KB,
            auto_clear_enabled: false,
            auto_clear_interval_minutes: DEFAULT_AUTO_CLEAR_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    pub poll_interval_ms: u64,
    pub echo_window_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            echo_window_ms: DEFAULT_ECHO_WINDOW_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    pub save_debounce_ms: u64,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self { save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub enabled: bool,
    pub capture_protection: bool,
    pub duration_ms: u64,
    pub scale: f64,
    pub opacity: u8,
    pub accent_start: String,
    pub accent_end: String,
    pub anchor: String,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capture_protection: true,
            duration_ms: DEFAULT_PREVIEW_DURATION_MS,
            scale: 1.0,
            opacity: 90,
            accent_start: "#7f5af0".into(),
            accent_end: "#2cb67d".into(),
            anchor: Anchor::BottomRight.as_str().into(),
            offset_x: 24,
            offset_y: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeySettings {
    pub advance: String,
    pub retreat: String,
    pub commit: String,
    pub cancel: String,
    pub open_browser: String,
}

impl Default for HotkeySettings {
    fn default() -> Self {
        let b = HotkeyBindings::default();
        Self {
            advance: b.advance.to_string(),
            retreat: b.retreat.to_string(),
            commit: b.commit.to_string(),
            cancel: b.cancel.to_string(),
            open_browser: b.open_browser.to_string(),
        }
    }
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        let ctrl_alt = Modifiers::CTRL | Modifiers::ALT;
        Self {
            advance: Hotkey::new(ctrl_alt, Key::Down),
            retreat: Hotkey::new(ctrl_alt, Key::Up),
            commit: Hotkey::new(ctrl_alt, Key::Enter),
            cancel: Hotkey::new(ctrl_alt, Key::Escape),
            open_browser: Hotkey::new(ctrl_alt, Key::Char('V')),
        }
    }
}

impl HotkeySettings {
    /// Resout les raccourcis ; une combinaison invalide prend sa valeur par defaut.
    pub fn bindings(&self) -> HotkeyBindings {
        let d = HotkeyBindings::default();
        HotkeyBindings {
            advance: parse_or("hotkeys.advance", &self.advance, d.advance),
            retreat: parse_or("hotkeys.retreat", &self.retreat, d.retreat),
            commit: parse_or("hotkeys.commit", &self.commit, d.commit),
            cancel: parse_or("hotkeys.cancel", &self.cancel, d.cancel),
            open_browser: parse_or("hotkeys.open_browser", &self.open_browser, d.open_browser),
        }
    }
}

fn parse_or(field: &str, value: &str, fallback: Hotkey) -> Hotkey {
    Hotkey::parse(value).unwrap_or_else(|e| {
        warn!(field, error = %e, "invalid hotkey, using default");
        fallback
    })
}

/// Coin d'ancrage de l'apercu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    /// Parse depuis une chaine.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "top-left" => Some(Self::TopLeft),
            "top-right" => Some(Self::TopRight),
            "bottom-left" => Some(Self::BottomLeft),
            "bottom-right" => Some(Self::BottomRight),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

/// Parametres de rendu de l'apercu transmis a l'UI.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub scale: f64,
    pub duration: Duration,
    /// Opacite en pourcentage (20..=100)
    pub opacity: u8,
    pub accent_start: String,
    pub accent_end: String,
    pub anchor: Anchor,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Exclure l'apercu des captures d'ecran
    pub capture_protection: bool,
}

impl PreviewSettings {
    pub fn style(&self) -> OverlayStyle {
        OverlayStyle {
            scale: self.scale,
            duration: Duration::from_millis(self.duration_ms),
            opacity: self.opacity,
            accent_start: self.accent_start.clone(),
            accent_end: self.accent_end.clone(),
            anchor: Anchor::parse(&self.anchor).unwrap_or(Anchor::BottomRight),
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            capture_protection: self.capture_protection,
        }
    }
}

impl Settings {
    /// Charge la configuration depuis un fichier. Utilise les defauts pour les valeurs manquantes.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Charge la configuration sans absorber les erreurs (fichier absent -> defauts).
    pub fn try_load(path: &Path) -> CgResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_toml(&text)
    }

    /// Parse un document TOML (non nettoye).
    pub fn from_toml(text: &str) -> CgResult<Self> {
        toml::from_str(text).map_err(|e| CgError::Configuration(e.to_string()))
    }

    /// Retourne une copie dont chaque valeur est dans ses bornes.
    pub fn sanitized(mut self) -> Self {
        let h = &mut self.history;
        if h.capacity == 0 {
            let err = CgError::CapacityViolation { requested: 0 };
            warn!(error = %err, "using default capacity");
            h.capacity = DEFAULT_HISTORY_CAPACITY;
        }
        h.capacity = clamp("history.capacity", h.capacity, 1, MAX_HISTORY_CAPACITY);
        h.max_entry_size_kb = clamp("history.max_entry_size_kb", h.max_entry_size_kb, 1, 102_400);
        h.auto_clear_interval_minutes =
            clamp("history.auto_clear_interval_minutes", h.auto_clear_interval_minutes, 5, 10_080);

        let w = &mut self.watcher;
        w.poll_interval_ms = clamp("watcher.poll_interval_ms", w.poll_interval_ms, 50, 5_000);
        w.echo_window_ms = clamp("watcher.echo_window_ms", w.echo_window_ms, 100, 10_000);

        let p = &mut self.persistence;
        p.save_debounce_ms = clamp("persistence.save_debounce_ms", p.save_debounce_ms, 50, 60_000);

        let defaults = PreviewSettings::default();
        let v = &mut self.preview;
        v.duration_ms = clamp("preview.duration_ms", v.duration_ms, 600, 10_000);
        if !v.scale.is_finite() {
            warn!(field = "preview.scale", "invalid value, using default");
            v.scale = defaults.scale;
        }
        v.scale = clamp("preview.scale", v.scale, 0.6, 1.6);
        v.opacity = clamp("preview.opacity", v.opacity, 20, 100);
        v.offset_x = clamp("preview.offset_x", v.offset_x, -500, 500);
        v.offset_y = clamp("preview.offset_y", v.offset_y, -500, 500);
        if !is_hex_color(&v.accent_start) {
            warn!(field = "preview.accent_start", value = %v.accent_start, "invalid colour, using default");
            v.accent_start = defaults.accent_start;
        }
        if !is_hex_color(&v.accent_end) {
            warn!(field = "preview.accent_end", value = %v.accent_end, "invalid colour, using default");
            v.accent_end = defaults.accent_end;
        }
        match Anchor::parse(&v.anchor) {
            Some(anchor) => v.anchor = anchor.as_str().into(),
            None => {
                warn!(field = "preview.anchor", value = %v.anchor, "invalid anchor, using default");
                v.anchor = defaults.anchor;
            }
        }

        // Forme canonique des raccourcis (les invalides prennent leur defaut)
        let b = self.hotkeys.bindings();
        self.hotkeys = HotkeySettings {
            advance: b.advance.to_string(),
            retreat: b.retreat.to_string(),
            commit: b.commit.to_string(),
            cancel: b.cancel.to_string(),
            open_browser: b.open_browser.to_string(),
        };
        self
    }

    /// Ecrit le fichier de configuration par defaut, commente.
    pub fn save_default(path: &Path) -> CgResult<()> {
        let body = toml::to_string_pretty(&Settings::default())
            .map_err(|e| CgError::Configuration(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, format!("{}{}", DEFAULT_CONFIG_HEADER, body))?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watcher.poll_interval_ms)
    }

    pub fn echo_window(&self) -> Duration {
        Duration::from_millis(self.watcher.echo_window_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.persistence.save_debounce_ms)
    }

    /// Duree de l'apercu, aussi delai d'expiration de la navigation.
    pub fn preview_duration(&self) -> Duration {
        Duration::from_millis(self.preview.duration_ms)
    }

    /// Intervalle de purge automatique, `None` si desactivee.
    pub fn auto_clear_interval(&self) -> Option<Duration> {
        self.history
            .auto_clear_enabled
            .then(|| Duration::from_secs(self.history.auto_clear_interval_minutes * 60))
    }

    /// Taille max d'une entree capturee, en octets.
    pub fn max_entry_size(&self) -> usize {
        self.history.max_entry_size_kb * 1024
    }
}

fn clamp<T: PartialOrd + Copy + Display>(field: &str, value: T, min: T, max: T) -> T {
    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };
    if clamped != value {
        warn!(field, %value, %clamped, "config value out of range, clamped");
    }
    clamped
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Repertoire de donnees de l'application.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
}

/// Chemin par defaut du fichier de configuration.
pub fn default_config_path() -> PathBuf {
    default_data_dir().join(CONFIG_FILENAME)
}

const DEFAULT_CONFIG_HEADER: &str = "\
# ClipGuardian Configuration
#
# [history]     capacity 1..10000, max_entry_size_kb, auto-clear (minutes, 5..10080)
# [watcher]     poll_interval_ms 50..5000, echo_window_ms 100..10000
# [persistence] save_debounce_ms 50..60000
# [preview]     duration_ms 600..10000, scale 0.6..1.6, opacity 20..100,
#               anchor top-left | top-right | bottom-left | bottom-right,
#               offsets -500..500, colours #rrggbb
# [hotkeys]     modifiers ctrl, alt, shift, win ; keys A-Z, 0-9, F1-F24, Up, Down, Enter, Escape...

";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.history.capacity, 50);
        assert_eq!(s.watcher.poll_interval_ms, 300);
        assert_eq!(s.preview.duration_ms, 2600);
        assert_eq!(s.hotkeys.advance, "Ctrl+Alt+Down");
        assert_eq!(s.hotkeys.open_browser, "Ctrl+Alt+V");
        assert!(s.auto_clear_interval().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let s = Settings::from_toml("[history]\ncapacity = 7\n").unwrap().sanitized();
        assert_eq!(s.history.capacity, 7);
        assert_eq!(s.history.max_entry_size_kb, DEFAULT_MAX_ENTRY_SIZE_KB);
        assert_eq!(s.preview, PreviewSettings::default());
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let text = r##"
[history]
capacity = 0
auto_clear_interval_minutes = 1

[watcher]
poll_interval_ms = 1

[preview]
scale = 9.0
opacity = 5
offset_x = -9000
accent_start = "purple"
anchor = "middle"

[hotkeys]
advance = "Ctrl+Banana"
"##;
        let s = Settings::from_toml(text).unwrap().sanitized();
        assert_eq!(s.history.capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(s.history.auto_clear_interval_minutes, 5);
        assert_eq!(s.watcher.poll_interval_ms, 50);
        assert_eq!(s.preview.scale, 1.6);
        assert_eq!(s.preview.opacity, 20);
        assert_eq!(s.preview.offset_x, -500);
        assert_eq!(s.preview.accent_start, "#7f5af0");
        assert_eq!(s.preview.anchor, "bottom-right");
        assert_eq!(s.hotkeys.advance, "Ctrl+Alt+Down");
    }

    #[test]
    fn test_load_missing_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_eq!(Settings::load(&missing), Settings::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[history\ncapacity = ").unwrap();
        assert!(Settings::try_load(&broken).is_err());
        assert_eq!(Settings::load(&broken), Settings::default());
    }

    #[test]
    fn test_save_default_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.toml");
        Settings::save_default(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# ClipGuardian Configuration"));
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_style_and_durations() {
        let mut s = Settings::default();
        s.history.auto_clear_enabled = true;
        s.history.auto_clear_interval_minutes = 10;
        assert_eq!(s.auto_clear_interval(), Some(Duration::from_secs(600)));
        assert_eq!(s.max_entry_size(), 1024 * 1024);
        let style = s.preview.style();
        assert_eq!(style.anchor, Anchor::BottomRight);
        assert_eq!(style.duration, Duration::from_millis(2600));
        assert!(style.capture_protection);
    }

    #[test]
    fn test_hotkey_bindings_from_settings() {
        let mut s = Settings::default();
        s.hotkeys.commit = "Shift+F2".into();
        let b = s.hotkeys.bindings();
        assert_eq!(b.commit, Hotkey::new(Modifiers::SHIFT, Key::F(2)));
        assert_eq!(b.advance, HotkeyBindings::default().advance);
    }
}
