// ClipGuardian - Navigation dans l'historique
// Machine a etats pilotee par les raccourcis clavier
//
// # Etats
// - `Idle` : aucune session de navigation
// - `Previewing { cursor, revision }` : l'entree `cursor` est affichee
// - `Committed(id)` : l'entree vient d'etre recopiee dans le presse-papiers ;
//   etat transitoire qui se comporte comme `Idle` au prochain evenement
//
// # Transitions
// - Idle --advance/retreat--> Previewing(0) (entree la plus recente)
// - Previewing(i) --advance--> Previewing(i+1), borne a la derniere entree
// - Previewing(i) --retreat--> Previewing(i-1), borne a 0
// - Previewing(i) --commit--> Committed (ecriture + garde d'echo)
// - Previewing(i) --cancel/timeout/focus--> Idle
//
// # Validite du curseur
// Le curseur est un index, jamais une reference. Il est revalide a chaque
// evenement : si le store a change (revision differente) ou si l'index est
// hors bornes, la session se termine (retour a `Idle`), sans erreur.
//
// La navigation ne modifie jamais l'ordre du store : seule la validation
// (equivalente a une nouvelle copie) remonte l'entree en tete.

use crate::clipboard::{ChangeWatcher, ClipboardBackend};
use crate::error::CgResult;
use crate::history::{EntryId, HistoryStore};
use tracing::debug;

/// Etat de la navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Idle,
    Previewing { cursor: usize, revision: u64 },
    Committed(EntryId),
}

/// Effet d'un evenement de navigation, a traduire en evenement UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Rien a afficher ni a masquer
    Unchanged,
    /// Afficher l'entree a cet index
    Preview(usize),
    /// Masquer l'apercu
    Closed,
    /// L'entree a ete recopiee dans le presse-papiers et remontee en tete
    Committed(EntryId),
}

/// Curseur de navigation sur le store.
#[derive(Debug, Default)]
pub struct NavigationController {
    state: NavState,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Index previsualise, `None` hors session.
    pub fn cursor(&self) -> Option<usize> {
        match self.state {
            NavState::Previewing { cursor, .. } => Some(cursor),
            _ => None,
        }
    }

    /// Vrai si une session de navigation est ouverte.
    pub fn is_active(&self) -> bool {
        matches!(self.state, NavState::Previewing { .. })
    }

    /// Entree suivante (plus ancienne).
    pub fn advance(&mut self, store: &HistoryStore) -> NavOutcome {
        self.step(store, |i, len| if i + 1 < len { i + 1 } else { i })
    }

    /// Entree precedente (plus recente).
    pub fn retreat(&mut self, store: &HistoryStore) -> NavOutcome {
        self.step(store, |i, _| i.saturating_sub(1))
    }

    fn step(&mut self, store: &HistoryStore, next: impl Fn(usize, usize) -> usize) -> NavOutcome {
        if !self.is_active() {
            if store.is_empty() {
                return NavOutcome::Unchanged;
            }
            return self.open_at(store, 0);
        }
        match self.validated_cursor(store) {
            Some(cursor) => self.open_at(store, next(cursor, store.len())),
            None => NavOutcome::Closed,
        }
    }

    fn open_at(&mut self, store: &HistoryStore, cursor: usize) -> NavOutcome {
        self.state = NavState::Previewing { cursor, revision: store.revision() };
        NavOutcome::Preview(cursor)
    }

    /// Revalide le curseur ; termine la session s'il n'est plus valide.
    pub fn validated_cursor(&mut self, store: &HistoryStore) -> Option<usize> {
        let NavState::Previewing { cursor, revision } = self.state else {
            return None;
        };
        if revision != store.revision() || store.get(cursor).is_none() {
            debug!(cursor, "history changed under navigation, session ended");
            self.state = NavState::Idle;
            return None;
        }
        Some(cursor)
    }

    /// Ferme la session sans toucher au presse-papiers.
    pub fn cancel(&mut self) -> NavOutcome {
        match self.state {
            NavState::Previewing { .. } => {
                self.state = NavState::Idle;
                NavOutcome::Closed
            }
            _ => {
                self.state = NavState::Idle;
                NavOutcome::Unchanged
            }
        }
    }

    /// Expiration de l'apercu.
    pub fn timeout(&mut self) -> NavOutcome {
        self.cancel()
    }

    /// Perte de focus.
    pub fn focus_lost(&mut self) -> NavOutcome {
        self.cancel()
    }

    /// Recopie l'entree previsualisee dans le presse-papiers.
    ///
    /// La session se termine dans tous les cas. Si l'ecriture echoue, le
    /// store n'est pas modifie et l'erreur est retournee.
    pub fn commit(
        &mut self,
        store: &mut HistoryStore,
        clipboard: &mut dyn ClipboardBackend,
        watcher: &mut ChangeWatcher,
    ) -> CgResult<NavOutcome> {
        let was_active = self.is_active();
        let Some(cursor) = self.validated_cursor(store) else {
            return Ok(if was_active { NavOutcome::Closed } else { NavOutcome::Unchanged });
        };
        self.state = NavState::Idle;
        let id = write_back(store, cursor, clipboard, watcher)?;
        self.state = NavState::Committed(id);
        Ok(NavOutcome::Committed(id))
    }

    /// Recopie une entree choisie dans le navigateur d'historique.
    pub fn activate(
        &mut self,
        id: EntryId,
        store: &mut HistoryStore,
        clipboard: &mut dyn ClipboardBackend,
        watcher: &mut ChangeWatcher,
    ) -> CgResult<NavOutcome> {
        let was_active = self.is_active();
        self.state = NavState::Idle;
        let Some(index) = store.position(id) else {
            return Ok(if was_active { NavOutcome::Closed } else { NavOutcome::Unchanged });
        };
        let id = write_back(store, index, clipboard, watcher)?;
        self.state = NavState::Committed(id);
        Ok(NavOutcome::Committed(id))
    }
}

/// Ecrit l'entree `index` dans le presse-papiers, arme la garde d'echo et
/// remonte l'entree en tete comme une nouvelle copie.
fn write_back(
    store: &mut HistoryStore,
    index: usize,
    clipboard: &mut dyn ClipboardBackend,
    watcher: &mut ChangeWatcher,
) -> CgResult<EntryId> {
    let (format, content) = match store.get(index) {
        Some(entry) => (entry.format(), entry.content().to_vec()),
        None => return Err(crate::error::CgError::Clipboard(format!("no entry at index {}", index))),
    };
    clipboard.write(format, &content)?;
    watcher.arm_echo_forms(&clipboard.read_back_forms(format, &content));
    let id = store.insert(format, content);
    debug!(id = id.0, index, %format, "entry written back to clipboard");
    Ok(id)
}
