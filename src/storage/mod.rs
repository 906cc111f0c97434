// ClipGuardian - Module storage
// Persistance chiffree de l'historique sur disque
//
// Ce module gere la sauvegarde et le chargement de l'historique
// dans un fichier history.bin chiffre avec ChaCha20-Poly1305.
//
// # Sous-modules
// - `atomic`   : ecriture atomique (temp + sync + rename), 0600 sous Unix
// - `format`   : serialisation/deserialisation binaire des ClipboardEntry
//                Format proprietaire compact avec prefixe de taille par entree
// - `vault`    : lecture/ecriture du fichier history.bin, cle separee
// - `autosave` : tache de sauvegarde differee et regroupee
//
// # Format du fichier history.bin
// ```text
// [MAGIC 8B][VERSION 2B][NONCE 12B][CT_LEN 4B][CIPHERTEXT + TAG 16B]
// ```

/// Ecriture atomique de fichiers.
pub mod atomic;
/// Tache de sauvegarde differee.
pub mod autosave;
/// Serialisation/deserialisation binaire des entrees de l'historique.
pub mod format;
/// Lecture/ecriture du fichier history.bin chiffre.
pub mod vault;

pub use autosave::{AutoSaver, SaveStats};
pub use vault::Vault;
