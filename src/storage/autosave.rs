// ClipGuardian - Sauvegarde differee de l'historique
//
// L'AutoSaver tourne dans sa propre tache tokio et ecrit le vault hors
// du chemin de capture : la boucle principale ne bloque jamais sur le
// disque.
//
// # Fonctionnement
// - La boucle publie un instantane (generation + entrees) dans un
//   canal `watch` : seul le dernier instantane compte, les rafales de
//   copies sont donc regroupees.
// - Une demande normale attend `debounce` sans nouvelle demande avant
//   d'ecrire, mais jamais plus de SAVE_MAX_WAIT_FACTOR x `debounce` apres
//   la premiere demande en attente : des copies continues sont quand meme
//   ecrites. Une demande immediate (purge) ecrit sans attendre.
// - Une seule sauvegarde a la fois : l'ecriture est faite dans
//   `spawn_blocking` et attendue avant de relire le canal.
// - A la fermeture du canal, le dernier instantane non ecrit est
//   sauvegarde avant la fin de la tache.
//
// Un echec d'ecriture est journalise ; le prochain instantane retentera.

use crate::constants::SAVE_MAX_WAIT_FACTOR;
use crate::history::ClipboardEntry;
use crate::storage::vault::Vault;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Instantane a sauvegarder.
#[derive(Debug, Clone)]
struct SaveRequest {
    generation: u64,
    entries: Arc<[ClipboardEntry]>,
    immediate: bool,
    debounce: Duration,
}

/// Compteurs de la tache de sauvegarde.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveStats {
    pub saves: u64,
    pub failures: u64,
}

/// Poignee vers la tache de sauvegarde.
pub struct AutoSaver {
    tx: watch::Sender<SaveRequest>,
    handle: JoinHandle<SaveStats>,
    generation: u64,
    debounce: Duration,
}

impl AutoSaver {
    /// Demarre la tache de sauvegarde.
    pub fn spawn(vault: Arc<Vault>, debounce: Duration) -> Self {
        let (tx, rx) = watch::channel(SaveRequest {
            generation: 0,
            entries: Arc::from(Vec::new()),
            immediate: false,
            debounce,
        });
        let handle = tokio::spawn(run(vault, rx));
        Self { tx, handle, generation: 0, debounce }
    }

    /// Change le delai de regroupement des prochaines demandes.
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    /// Demande une sauvegarde differee de `entries`.
    pub fn request(&mut self, entries: Arc<[ClipboardEntry]>) {
        self.publish(entries, false);
    }

    /// Demande une sauvegarde sans delai (purge de l'historique).
    pub fn request_now(&mut self, entries: Arc<[ClipboardEntry]>) {
        self.publish(entries, true);
    }

    fn publish(&mut self, entries: Arc<[ClipboardEntry]>, immediate: bool) {
        self.generation += 1;
        self.tx.send_replace(SaveRequest {
            generation: self.generation,
            entries,
            immediate,
            debounce: self.debounce,
        });
    }

    /// Ferme le canal et attend la derniere sauvegarde.
    pub async fn shutdown(self) -> SaveStats {
        drop(self.tx);
        match self.handle.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "autosave task failed");
                SaveStats::default()
            }
        }
    }
}

async fn run(vault: Arc<Vault>, mut rx: watch::Receiver<SaveRequest>) -> SaveStats {
    let mut stats = SaveStats::default();
    let mut saved_generation = 0u64;

    while rx.changed().await.is_ok() {
        let (immediate, debounce) = {
            let request = rx.borrow();
            (request.immediate, request.debounce)
        };
        if !immediate {
            // Attendre un silence de `debounce`, borne par `deadline` ;
            // une demande immediate coupe court
            let first = Instant::now();
            let deadline = first + debounce * SAVE_MAX_WAIT_FACTOR;
            let sleep = tokio::time::sleep_until((first + debounce).min(deadline));
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    changed = rx.changed() => {
                        if changed.is_err() || rx.borrow().immediate {
                            break;
                        }
                        sleep.as_mut().reset((Instant::now() + debounce).min(deadline));
                    }
                }
            }
        }

        let request = rx.borrow_and_update().clone();
        if request.generation > saved_generation {
            save_once(&vault, &request, &mut stats).await;
            saved_generation = request.generation;
        }
    }

    // Canal ferme : ecrire le dernier instantane s'il est en attente
    let request = rx.borrow().clone();
    if request.generation > saved_generation {
        save_once(&vault, &request, &mut stats).await;
    }
    stats
}

async fn save_once(vault: &Arc<Vault>, request: &SaveRequest, stats: &mut SaveStats) {
    let vault = Arc::clone(vault);
    let entries = Arc::clone(&request.entries);
    let count = entries.len();
    match tokio::task::spawn_blocking(move || vault.save(&entries)).await {
        Ok(Ok(())) => {
            stats.saves += 1;
            debug!(generation = request.generation, count, "history saved");
        }
        Ok(Err(e)) => {
            stats.failures += 1;
            warn!(error = %e, "history save failed");
        }
        Err(e) => {
            stats.failures += 1;
            warn!(error = %e, "history save task failed");
        }
    }
}
