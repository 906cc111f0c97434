// ClipGuardian - Constantes globales
//
// Ce module centralise les constantes de la crate :
// - Format des fichiers persistes (magic, version, tailles)
// - Valeurs par defaut de la configuration
// - Tailles cryptographiques
// - Noms de fichiers et repertoires

/// Magic number du fichier d'historique : "CGVAULT1"
pub const VAULT_MAGIC: &[u8; 8] = b"CGVAULT1";

/// Version du format du fichier d'historique
pub const VAULT_FORMAT_VERSION: u16 = 1;

/// Magic number du fichier de cle
pub const KEY_MAGIC: &[u8; 4] = b"CGKY";

/// Version du format du fichier de cle
pub const KEY_FORMAT_VERSION: u8 = 1;

/// Taille de la cle ChaCha20-Poly1305 (octets)
pub const KEY_SIZE: usize = 32;

/// Taille du nonce ChaCha20-Poly1305 (octets)
pub const NONCE_SIZE: usize = 12;

/// Taille du tag Poly1305 (octets)
pub const TAG_SIZE: usize = 16;

/// Taille d'une empreinte SHA-256 (octets)
pub const FINGERPRINT_SIZE: usize = 32;

/// Nombre max d'entrees par defaut
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Plafond de capacite accepte par la configuration
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

/// Taille max par entree par defaut (Ko)
pub const DEFAULT_MAX_ENTRY_SIZE_KB: usize = 1024;

/// Intervalle de scrutation du presse-papiers (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;

/// Fenetre de suppression d'echo apres une ecriture (ms)
pub const DEFAULT_ECHO_WINDOW_MS: u64 = 1500;

/// Nombre max d'observations avalees apres une ecriture
pub const ECHO_SUPPRESS_COUNT: u8 = 2;

/// Delai de regroupement des sauvegardes (ms)
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 750;
/// Attente maximale d'une sauvegarde differee, en multiples du debounce.
pub const SAVE_MAX_WAIT_FACTOR: u32 = 4;

/// Duree d'affichage de l'apercu, aussi delai d'expiration de la session (ms)
pub const DEFAULT_PREVIEW_DURATION_MS: u64 = 2600;

/// Intervalle de purge automatique par defaut (minutes)
pub const DEFAULT_AUTO_CLEAR_MINUTES: u64 = 1440;

/// Taille du canal d'actions (hotkeys, UI)
pub const ACTION_CHANNEL_SIZE: usize = 64;

/// Taille du canal d'evenements vers l'UI
pub const UI_EVENT_CHANNEL_SIZE: usize = 64;

/// Longueur d'apercu par defaut (caracteres)
pub const DEFAULT_PREVIEW_LENGTH: usize = 60;

/// Nom du dossier application dans le repertoire de donnees utilisateur
pub const APP_DIR_NAME: &str = "ClipGuardian";

/// Nom du fichier d'historique chiffre
pub const HISTORY_FILENAME: &str = "history.bin";

/// Nom du fichier de cle
pub const KEY_FILENAME: &str = "key.bin";

/// Nom du fichier de configuration
pub const CONFIG_FILENAME: &str = "config.toml";
