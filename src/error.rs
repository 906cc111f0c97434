// ClipGuardian - Types d'erreur centralises
//
// Ce module definit l'enumeration `CgError` et le type alias
// `CgResult<T>` utilises dans toute la crate.
//
// # Categories d'erreurs
// - `TransientIo` : presse-papiers verrouille, fichier occupe (on reessaie au cycle suivant)
// - `Corruption` : cle ou blob invalide, echec d'authentification (on repart d'un historique vide)
// - `Configuration` : parametre manquant ou invalide (on substitue la valeur par defaut)
// - `CapacityViolation` : capacite demandee nulle (rejetee, l'ancienne capacite est conservee)
// - `Clipboard` : echec non transitoire du presse-papiers
// - `Crypto` : echec de chiffrement
// - `Stopped` : action envoyee a une boucle arretee
// - `Io` : erreur d'I/O disque
//
// Aucune de ces erreurs ne doit terminer le processus : la boucle
// principale les absorbe et degrade l'etat (voir app.rs).

use thiserror::Error;

/// Enumeration de toutes les erreurs possibles dans ClipGuardian.
#[derive(Debug, Error)]
pub enum CgError {
    /// Ressource momentanement indisponible (presse-papiers verrouille, etc.)
    #[error("[Transient] {0}")]
    TransientIo(String),
    /// Donnees persistees illisibles (cle, blob, tag d'authentification)
    #[error("[Corruption] {0}")]
    Corruption(String),
    /// Parametre de configuration invalide
    #[error("[Config] {0}")]
    Configuration(String),
    /// Capacite d'historique invalide
    #[error("[Capacity] history capacity must be > 0 (requested {requested})")]
    CapacityViolation { requested: usize },
    /// Erreur non transitoire du presse-papiers
    #[error("[Clipboard] {0}")]
    Clipboard(String),
    /// Erreur de chiffrement
    #[error("[Crypto] {0}")]
    Crypto(String),
    /// La boucle principale est arretee
    #[error("[Engine] guardian loop stopped")]
    Stopped,
    /// Erreur de lecture/ecriture disque
    #[error("[Storage] {0}")]
    Io(#[from] std::io::Error),
}

impl CgError {
    /// Vrai si l'operation peut etre reessayee au prochain cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, CgError::TransientIo(_))
    }

    /// Vrai si l'erreur signale des donnees persistees inutilisables.
    pub fn is_corruption(&self) -> bool {
        matches!(self, CgError::Corruption(_))
    }
}

/// Type Result specialise pour ClipGuardian.
pub type CgResult<T> = Result<T, CgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefix() {
        let e = CgError::Corruption("bad tag".into());
        assert_eq!(e.to_string(), "[Corruption] bad tag");
        let e = CgError::CapacityViolation { requested: 0 };
        assert!(e.to_string().starts_with("[Capacity]"));
    }

    #[test]
    fn test_classification() {
        assert!(CgError::TransientIo("busy".into()).is_transient());
        assert!(!CgError::Clipboard("gone".into()).is_transient());
        assert!(CgError::Corruption("x".into()).is_corruption());
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: CgError = io.into();
        assert!(matches!(e, CgError::Io(_)));
    }
}
