// ClipGuardian - Evenements vers l'UI
//
// Le moteur ne dessine rien : il publie des evenements que l'UI
// (overlay, navigateur d'historique) traduit en rendu.

use crate::config::OverlayStyle;
use crate::history::ClipboardEntry;

/// Entree previsualisee et sa position dans l'historique.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewView {
    pub entry: ClipboardEntry,
    /// Position dans l'historique (0 = plus recente)
    pub index: usize,
    pub total: usize,
}

impl PreviewView {
    /// Libelle de position ("2/10").
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.index + 1, self.total)
    }
}

/// Evenement publie vers l'UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Afficher l'apercu d'une entree
    ShowPreview { preview: PreviewView, style: OverlayStyle },
    /// Masquer l'apercu
    HidePreview,
    /// Ouvrir le navigateur d'historique
    OpenBrowser,
    /// Le contenu ou l'ordre de l'historique a change
    HistoryChanged { revision: u64, len: usize },
}
