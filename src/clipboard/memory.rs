// ClipGuardian - Presse-papiers en memoire
//
// Backend partage (poignee clonable) qui simule le presse-papiers du
// systeme : les tests et l'execution sans affichage l'utilisent a la
// place d'arboard. `set_busy(true)` simule un verrouillage par un autre
// processus (les lectures et ecritures renvoient `TransientIo`).

use crate::clipboard::{ClipboardBackend, ClipboardSnapshot};
use crate::error::{CgError, CgResult};
use crate::history::EntryFormat;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    current: Option<ClipboardSnapshot>,
    busy: bool,
    writes: Vec<ClipboardSnapshot>,
}

/// Presse-papiers en memoire, partage entre ses clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simule une copie externe.
    pub fn set(&self, format: EntryFormat, content: &[u8]) {
        self.state().current = Some(ClipboardSnapshot::new(format, content.to_vec()));
    }

    /// Simule une copie externe de texte.
    pub fn set_text(&self, text: &str) {
        self.set(EntryFormat::Text, text.as_bytes());
    }

    /// Vide le presse-papiers.
    pub fn clear(&self) {
        self.state().current = None;
    }

    /// Simule (ou leve) un verrouillage par un autre processus.
    pub fn set_busy(&self, busy: bool) {
        self.state().busy = busy;
    }

    /// Contenu courant.
    pub fn current(&self) -> Option<ClipboardSnapshot> {
        self.state().current.clone()
    }

    /// Ecritures effectuees par le moteur, dans l'ordre.
    pub fn writes(&self) -> Vec<ClipboardSnapshot> {
        self.state().writes.clone()
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn read(&mut self) -> CgResult<Option<ClipboardSnapshot>> {
        let state = self.state();
        if state.busy {
            return Err(CgError::TransientIo("clipboard locked".into()));
        }
        Ok(state.current.clone())
    }

    fn write(&mut self, format: EntryFormat, content: &[u8]) -> CgResult<()> {
        let mut state = self.state();
        if state.busy {
            return Err(CgError::TransientIo("clipboard locked".into()));
        }
        let snapshot = ClipboardSnapshot::new(format, content.to_vec());
        state.current = Some(snapshot.clone());
        state.writes.push(snapshot);
        Ok(())
    }
}
