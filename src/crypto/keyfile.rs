// ClipGuardian - Cle maitre et fichier de cle
//
// Ce module gere la cle symetrique qui protege le fichier d'historique.
// La cle est stockee dans un fichier separe du blob chiffre, dans le
// meme repertoire de donnees utilisateur.
//
// # Format du fichier de cle
// ```text
// [CGKY]      magic (4 octets)
// [version]   u8 (1 octet)
// [key]       cle ChaCha20-Poly1305 (32 octets)
// ```
//
// # Fonctionnement
// - `read_key` : lit une cle existante ; absente ou malformee -> `Corruption`
// - `load_or_create_key` : au premier lancement, genere une cle aleatoire
//   et l'ecrit de facon atomique (0600 sous Unix). Une cle malformee est
//   remplacee : le blob qu'elle protegeait est de toute facon illisible.
//
// # Securite
// - La cle est effacee de la memoire a la liberation (zeroize)
// - `Debug` n'affiche jamais la cle

use crate::constants::{KEY_FORMAT_VERSION, KEY_MAGIC, KEY_SIZE};
use crate::error::{CgError, CgResult};
use crate::storage::atomic::write_atomic;
use chacha20poly1305::aead::{KeyInit, OsRng};
use chacha20poly1305::ChaCha20Poly1305;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Taille totale du fichier de cle.
const KEY_FILE_SIZE: usize = KEY_MAGIC.len() + 1 + KEY_SIZE;

/// Cle maitre, effacee a la liberation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl MasterKey {
    /// Genere une cle aleatoire (OsRng).
    pub fn generate() -> Self {
        let generated = ChaCha20Poly1305::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&generated);
        Self(bytes)
    }

    /// Construit une cle a partir d'octets bruts.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encode la cle au format du fichier de cle.
    fn encode(&self) -> Zeroizing<Vec<u8>> {
        let mut data = Zeroizing::new(Vec::with_capacity(KEY_FILE_SIZE));
        data.extend_from_slice(KEY_MAGIC);
        data.push(KEY_FORMAT_VERSION);
        data.extend_from_slice(&self.0);
        data
    }

    /// Decode le contenu d'un fichier de cle.
    fn decode(data: &[u8]) -> CgResult<Self> {
        if data.len() != KEY_FILE_SIZE {
            return Err(CgError::Corruption(format!("Key file has invalid size: {}", data.len())));
        }
        if &data[..KEY_MAGIC.len()] != KEY_MAGIC {
            return Err(CgError::Corruption("Invalid key file magic".into()));
        }
        let version = data[KEY_MAGIC.len()];
        if version != KEY_FORMAT_VERSION {
            return Err(CgError::Corruption(format!("Unsupported key file version: {}", version)));
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&data[KEY_MAGIC.len() + 1..]);
        Ok(Self(bytes))
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}

/// Lit la cle existante.
///
/// # Errors
/// - `CgError::Corruption` : fichier absent ou malforme
/// - `CgError::Io` : autre erreur de lecture
pub fn read_key(path: &Path) -> CgResult<MasterKey> {
    let data = match fs::read(path) {
        Ok(d) => Zeroizing::new(d),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CgError::Corruption("Key file missing".into()));
        }
        Err(e) => return Err(e.into()),
    };
    MasterKey::decode(&data)
}

/// Charge la cle ou en genere une nouvelle si elle est absente ou malformee.
pub fn load_or_create_key(path: &Path) -> CgResult<MasterKey> {
    match read_key(path) {
        Ok(key) => Ok(key),
        Err(CgError::Corruption(reason)) => {
            if path.exists() {
                warn!(path = %path.display(), %reason, "replacing unreadable key file");
            } else {
                info!(path = %path.display(), "creating key file");
            }
            let key = MasterKey::generate();
            write_atomic(path, &key.encode())?;
            Ok(key)
        }
        Err(e) => Err(e),
    }
}
