// ClipGuardian - Module clipboard
// Acces au presse-papiers du systeme et detection des changements
//
// Ce module fournit :
// - `ClipboardBackend` : trait d'acces au presse-papiers (lecture/ecriture)
// - `system`  : implementation reelle via arboard
// - `memory`  : implementation en memoire (tests, execution sans affichage)
// - `monitor` : ChangeWatcher, detection des changements par scrutation
//               avec suppression de l'echo de nos propres ecritures
//
// Architecture :
// Le presse-papiers est une ressource externe opaque qu'un autre
// processus peut verrouiller a tout moment. Les erreurs de verrouillage
// sont des `CgError::TransientIo` : le watcher reessaie au cycle suivant.
//
// # Securite
// - Les donnees lues ne sont jamais loguees (taille et format uniquement)

/// Presse-papiers en memoire.
pub mod memory;
/// Detection des changements du presse-papiers.
pub mod monitor;
/// Presse-papiers du systeme via arboard.
pub mod system;

pub use memory::MemoryClipboard;
pub use monitor::ChangeWatcher;
pub use system::SystemClipboard;

use crate::error::CgResult;
use crate::history::EntryFormat;

/// Contenu brut du presse-papiers a un instant donne.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    pub format: EntryFormat,
    pub content: Vec<u8>,
}

impl ClipboardSnapshot {
    pub fn new(format: EntryFormat, content: Vec<u8>) -> Self {
        Self { format, content }
    }

    /// Raccourci pour un texte brut.
    pub fn text(s: &str) -> Self {
        Self::new(EntryFormat::Text, s.as_bytes().to_vec())
    }
}

/// Acces au presse-papiers.
///
/// `read` retourne `Ok(None)` si le presse-papiers est vide ou ne contient
/// aucun format pris en charge. Un verrouillage par un autre processus
/// doit etre signale par `CgError::TransientIo`.
pub trait ClipboardBackend: Send {
    fn read(&mut self) -> CgResult<Option<ClipboardSnapshot>>;
    fn write(&mut self, format: EntryFormat, content: &[u8]) -> CgResult<()>;

    /// Formes sous lesquelles `read` peut relire un contenu ecrit par `write`.
    fn read_back_forms(&self, format: EntryFormat, content: &[u8]) -> Vec<ClipboardSnapshot> {
        vec![ClipboardSnapshot::new(format, content.to_vec())]
    }
}
