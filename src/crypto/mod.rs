// ClipGuardian - Module crypto
// Chiffrement authentifie ChaCha20-Poly1305 et gestion de la cle
//
// Ce module regroupe les primitives cryptographiques de ClipGuardian.
//
// # Sous-modules
// - `keyfile` : cle maitre (zeroisee a la liberation), lecture et
//               creation du fichier de cle
//
// # Securite
// - Nonce aleatoire de 96 bits (OsRng) a chaque chiffrement
// - Les donnees additionnelles (AAD) lient le chiffre a l'en-tete du fichier
// - Un echec d'authentification est une `Corruption`, jamais une panique
// - Le clair dechiffre est rendu dans un tampon zeroise

/// Cle maitre et fichier de cle.
pub mod keyfile;

pub use keyfile::MasterKey;

use crate::constants::NONCE_SIZE;
use crate::error::{CgError, CgResult};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use zeroize::Zeroizing;

/// Chiffre `plaintext` sous `key`. Retourne le nonce et le chiffre (tag inclus).
pub fn seal(key: &MasterKey, aad: &[u8], plaintext: &[u8]) -> CgResult<([u8; NONCE_SIZE], Vec<u8>)> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|_| CgError::Crypto("encryption failed".into()))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    nonce_bytes.copy_from_slice(&nonce);
    Ok((nonce_bytes, ciphertext))
}

/// Dechiffre et authentifie `ciphertext`.
///
/// # Errors
/// `CgError::Corruption` si la cle, le nonce, l'AAD ou le chiffre ne
/// correspondent pas.
pub fn open(
    key: &MasterKey,
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    ciphertext: &[u8],
) -> CgResult<Zeroizing<Vec<u8>>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map(Zeroizing::new)
        .map_err(|_| CgError::Corruption("authentication failed".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = MasterKey::generate();
        let (nonce, ct) = seal(&key, b"hdr", b"secret").unwrap();
        assert_ne!(&ct[..], b"secret");
        let pt = open(&key, &nonce, b"hdr", &ct).unwrap();
        assert_eq!(&pt[..], b"secret");
    }

    #[test]
    fn test_nonce_is_fresh() {
        let key = MasterKey::generate();
        let (n1, c1) = seal(&key, b"", b"same").unwrap();
        let (n2, c2) = seal(&key, b"", b"same").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_wrong_key_or_aad_is_corruption() {
        let key = MasterKey::generate();
        let (nonce, ct) = seal(&key, b"hdr", b"secret").unwrap();
        let other = MasterKey::generate();
        assert!(open(&other, &nonce, b"hdr", &ct).unwrap_err().is_corruption());
        assert!(open(&key, &nonce, b"other", &ct).unwrap_err().is_corruption());
    }

    #[test]
    fn test_flipped_byte_is_corruption() {
        let key = MasterKey::generate();
        let (nonce, mut ct) = seal(&key, b"", b"secret").unwrap();
        ct[0] ^= 0x01;
        assert!(open(&key, &nonce, b"", &ct).unwrap_err().is_corruption());
    }
}
