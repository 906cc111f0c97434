// ClipGuardian - Module config
// Lecture/ecriture de la configuration utilisateur
//
// Ce module gere la configuration de ClipGuardian via un fichier TOML
// situe dans le repertoire de donnees utilisateur (config.toml).
//
// # Sous-modules
// - `hotkey`   : parsing des combinaisons ("Ctrl+Alt+Down") et
//                correspondance combinaison -> action
// - `settings` : structure Settings contenant tous les parametres du moteur
//                avec valeurs par defaut robustes et validation des plages.
//
// # Utilisation
// ```rust,ignore
// let settings = Settings::load(&config_path);
// // Les valeurs manquantes utilisent les defauts
// ```

/// Raccourcis clavier.
pub mod hotkey;
/// Structure de configuration et valeurs par defaut.
pub mod settings;

pub use hotkey::{Hotkey, HotkeyAction, HotkeyBindings, Key, Modifiers};
pub use settings::{Anchor, OverlayStyle, Settings};
