// ClipGuardian - Lecture/ecriture du fichier history.bin
// Sauvegarde et chargement chiffre de l'historique
//
// Ce module gere la persistance chiffree de l'historique sur disque.
//
// # Format du fichier history.bin
// ```text
// [CGVAULT1]   magic number (8 octets)
// [version]    format version u16 LE (2 octets)
// [nonce]      ChaCha20-Poly1305 nonce (12 octets)
// [ct_len]     taille ciphertext u32 LE (4 octets, tag inclus)
// [ciphertext] donnees chiffrees + tag Poly1305 (ct_len octets)
// ```
//
// # Securite
// - Le nonce est genere aleatoirement a chaque sauvegarde (OsRng)
// - L'en-tete (magic + version) est l'AAD : le modifier invalide le tag
// - L'ecriture est atomique (fichier temporaire + rename), 0600 sous Unix
// - La cle vit dans un fichier separe (`key.bin`)
//
// # Degradation
// `load` ne fait jamais echouer le demarrage : un fichier absent,
// tronque, d'une autre version ou non authentifiable donne un
// historique vide (avec un avertissement). `try_load` expose l'erreur.

use crate::constants::{
    HISTORY_FILENAME, KEY_FILENAME, NONCE_SIZE, TAG_SIZE, VAULT_FORMAT_VERSION, VAULT_MAGIC,
};
use crate::crypto::{self, keyfile};
use crate::error::{CgError, CgResult};
use crate::history::{ClipboardEntry, HistoryStore};
use crate::storage::atomic::write_atomic;
use crate::storage::format;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Taille de l'en-tete authentifie (magic + version).
const HEADER_SIZE: usize = VAULT_MAGIC.len() + 2;

/// Taille minimale d'un fichier valide : en-tete, nonce, longueur, tag.
const MIN_FILE_SIZE: usize = HEADER_SIZE + NONCE_SIZE + 4 + TAG_SIZE;

/// Emplacement du blob chiffre et de sa cle.
#[derive(Debug, Clone)]
pub struct Vault {
    blob_path: PathBuf,
    key_path: PathBuf,
}

impl Vault {
    /// Vault standard dans le repertoire de donnees donne.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            blob_path: data_dir.join(HISTORY_FILENAME),
            key_path: data_dir.join(KEY_FILENAME),
        }
    }

    /// Vault avec des chemins explicites.
    pub fn with_paths(blob_path: PathBuf, key_path: PathBuf) -> Self {
        Self { blob_path, key_path }
    }

    pub fn blob_path(&self) -> &Path {
        &self.blob_path
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Chiffre et ecrit les entrees. La cle est creee au premier appel.
    pub fn save(&self, entries: &[ClipboardEntry]) -> CgResult<()> {
        let key = keyfile::load_or_create_key(&self.key_path)?;
        let plaintext = Zeroizing::new(format::serialize_entries(entries));
        let header = header_bytes();
        let (nonce, ciphertext) = crypto::seal(&key, &header, &plaintext)?;

        let mut data = Vec::with_capacity(MIN_FILE_SIZE + ciphertext.len());
        data.extend_from_slice(&header);
        data.extend_from_slice(&nonce);
        data.extend_from_slice(&(ciphertext.len() as u32).to_le_bytes());
        data.extend_from_slice(&ciphertext);

        write_atomic(&self.blob_path, &data)?;
        debug!(count = entries.len(), bytes = data.len(), "vault written");
        Ok(())
    }

    /// Sauvegarde le contenu d'un store.
    pub fn save_store(&self, store: &HistoryStore) -> CgResult<()> {
        self.save(store.as_slice())
    }

    /// Charge les entrees persistees.
    ///
    /// Un blob absent est un premier lancement : liste vide, pas d'erreur.
    ///
    /// # Errors
    /// - `CgError::Corruption` : cle absente, fichier tronque, version
    ///   inconnue, echec d'authentification ou clair malforme
    /// - `CgError::Io` : erreur de lecture
    pub fn try_load(&self) -> CgResult<Vec<ClipboardEntry>> {
        let data = match fs::read(&self.blob_path) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if data.len() < MIN_FILE_SIZE {
            return Err(CgError::Corruption("Vault file too small".into()));
        }
        if &data[..VAULT_MAGIC.len()] != VAULT_MAGIC {
            return Err(CgError::Corruption("Invalid vault magic number".into()));
        }

        let mut pos = VAULT_MAGIC.len();
        let version = u16::from_le_bytes([data[pos], data[pos + 1]]);
        pos += 2;
        if version != VAULT_FORMAT_VERSION {
            return Err(CgError::Corruption(format!("Unsupported vault version: {}", version)));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[pos..pos + NONCE_SIZE]);
        pos += NONCE_SIZE;

        let ct_len = u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;
        if data.len() - pos != ct_len {
            return Err(CgError::Corruption("Ciphertext size does not match file".into()));
        }

        let key = keyfile::read_key(&self.key_path)?;
        let plaintext = crypto::open(&key, &nonce, &data[..HEADER_SIZE], &data[pos..])?;
        format::deserialize_entries(&plaintext)
    }

    /// Charge l'historique, en repartant d'un store vide sur toute erreur.
    ///
    /// # Errors
    /// `CgError::CapacityViolation` si `capacity == 0` (seule erreur possible).
    pub fn load(&self, capacity: usize) -> CgResult<HistoryStore> {
        match self.try_load() {
            Ok(entries) => {
                let store = HistoryStore::from_entries(capacity, entries)?;
                debug!(count = store.len(), "vault loaded");
                Ok(store)
            }
            Err(e) => {
                warn!(error = %e, path = %self.blob_path.display(), "history unreadable, starting empty");
                HistoryStore::new(capacity)
            }
        }
    }
}

fn header_bytes() -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[..VAULT_MAGIC.len()].copy_from_slice(VAULT_MAGIC);
    header[VAULT_MAGIC.len()..].copy_from_slice(&VAULT_FORMAT_VERSION.to_le_bytes());
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::EntryFormat;

    fn sample_store() -> HistoryStore {
        let mut store = HistoryStore::new(10).unwrap();
        store.insert_at(EntryFormat::Text, b"alpha".to_vec(), 1_000);
        store.insert_at(EntryFormat::Html, b"<b>beta</b>".to_vec(), 2_000);
        store.insert_at(EntryFormat::Image, vec![1, 0, 0, 0, 1, 0, 0, 0, 9, 9, 9, 9], 3_000);
        store
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        let store = sample_store();
        vault.save_store(&store).unwrap();
        let loaded = vault.load(10).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_blob_is_not_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        vault.save_store(&sample_store()).unwrap();
        let raw = fs::read(vault.blob_path()).unwrap();
        assert!(!raw.windows(5).any(|w| w == b"alpha"));
    }

    #[test]
    fn test_missing_blob_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        assert!(vault.try_load().unwrap().is_empty());
        assert!(vault.load(5).unwrap().is_empty());
    }

    #[test]
    fn test_flipped_byte_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        vault.save_store(&sample_store()).unwrap();

        let mut raw = fs::read(vault.blob_path()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        fs::write(vault.blob_path(), &raw).unwrap();

        assert!(vault.try_load().unwrap_err().is_corruption());
        assert!(vault.load(10).unwrap().is_empty());
    }

    #[test]
    fn test_header_is_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        vault.save_store(&sample_store()).unwrap();

        let mut raw = fs::read(vault.blob_path()).unwrap();
        raw[VAULT_MAGIC.len()] ^= 0x02;
        fs::write(vault.blob_path(), &raw).unwrap();
        assert!(vault.try_load().unwrap_err().is_corruption());
    }

    #[test]
    fn test_missing_key_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        vault.save_store(&sample_store()).unwrap();
        fs::remove_file(vault.key_path()).unwrap();

        assert!(vault.try_load().unwrap_err().is_corruption());
        assert!(vault.load(10).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        vault.save_store(&sample_store()).unwrap();
        let raw = fs::read(vault.blob_path()).unwrap();
        fs::write(vault.blob_path(), &raw[..raw.len() / 2]).unwrap();
        assert!(vault.try_load().unwrap_err().is_corruption());
    }

    #[test]
    fn test_load_applies_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        vault.save_store(&sample_store()).unwrap();
        let loaded = vault.load(2).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(0).unwrap().format(), EntryFormat::Image);
        assert!(vault.load(0).is_err());
    }
}
