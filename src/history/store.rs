// ClipGuardian - Store de l'historique
// Liste ordonnee, bornee et dedupliquee des entrees
//
// Ce module implemente le stockage en memoire des entrees du
// presse-papiers sous forme de liste ordonnee (plus recente en tete).
//
// # Invariants
// - Les empreintes sont uniques dans le store.
// - `last_seen_at` est strictement decroissant de la tete vers la queue.
// - `len() <= capacity()` apres chaque operation.
//
// # Deduplication
// `insert` d'un contenu deja present ne cree pas de nouvelle entree :
// l'entree existante remonte en tete et son `last_seen_at` est rafraichi.
// La detection passe par un index empreinte -> id, independant de la
// taille du contenu.
//
// # Capacite et eviction
// Au-dela de la capacite, l'entree non epinglee la moins recemment vue
// est supprimee. Si toutes les autres entrees sont epinglees, la moins
// recemment vue est supprimee quand meme : la borne de taille prime.
// L'entree qui vient d'etre inseree (la tete) n'est jamais evincee.
//
// # Horloge
// L'horodatage attribue est `max(now, tete.last_seen_at + 1)`, ce qui
// garantit un ordre strict meme si deux copies tombent dans la meme
// milliseconde ou si l'horloge murale recule.
//
// # Dirty flag et revision
// Le flag `dirty` est positionne a chaque modification et remis a
// zero apres une sauvegarde reussie. `revision` est incremente a chaque
// changement de contenu ou d'ordre, pour invalider les curseurs.

use crate::error::{CgError, CgResult};
use crate::history::entry::{now_millis, ClipboardEntry, EntryFormat, EntryId, Fingerprint};
use crate::history::search::Search;
use std::collections::HashMap;
use tracing::debug;

/// Historique du presse-papiers en memoire.
/// Les entrees sont stockees dans un Vec, les plus recentes en tete.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<ClipboardEntry>,
    index: HashMap<Fingerprint, EntryId>,
    capacity: usize,
    next_id: u64,
    next_seq: u64,
    revision: u64,
    dirty: bool,
}

impl HistoryStore {
    /// Cree un store vide avec la capacite donnee.
    ///
    /// # Errors
    /// `CgError::CapacityViolation` si `capacity == 0`.
    pub fn new(capacity: usize) -> CgResult<Self> {
        if capacity == 0 {
            return Err(CgError::CapacityViolation { requested: capacity });
        }
        Ok(Self {
            entries: Vec::with_capacity(capacity.min(1024)),
            index: HashMap::new(),
            capacity,
            next_id: 1,
            next_seq: 1,
            revision: 0,
            dirty: false,
        })
    }

    /// Reconstruit un store a partir d'entrees persistees.
    ///
    /// Les entrees sont retriees (recence puis sequence), les doublons
    /// d'empreinte sont ecartes (la plus recente gagne) et la capacite est
    /// appliquee. Le store resultant n'est pas marque dirty.
    pub fn from_entries(capacity: usize, mut entries: Vec<ClipboardEntry>) -> CgResult<Self> {
        let mut store = Self::new(capacity)?;

        entries.sort_by(|a, b| {
            b.last_seen_at
                .cmp(&a.last_seen_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });

        for entry in entries {
            store.next_id = store.next_id.max(entry.id.0 + 1);
            store.next_seq = store.next_seq.max(entry.seq + 1);
            if store.index.contains_key(&entry.fingerprint) {
                continue;
            }
            store.index.insert(entry.fingerprint, entry.id);
            store.entries.push(entry);
        }

        // Ordre strict : les egalites restantes sont departagees par la sequence
        for i in (0..store.entries.len().saturating_sub(1)).rev() {
            let next = store.entries[i + 1].last_seen_at;
            if store.entries[i].last_seen_at <= next {
                store.entries[i].last_seen_at = next + 1;
            }
        }

        store.enforce_capacity();
        store.dirty = false;
        Ok(store)
    }

    /// Ajoute un contenu en tete de l'historique avec l'horloge courante.
    pub fn insert(&mut self, format: EntryFormat, content: Vec<u8>) -> EntryId {
        self.insert_at(format, content, now_millis())
    }

    /// Ajoute un contenu observe a `now` (ms UTC).
    ///
    /// Si l'empreinte existe deja, l'entree remonte en tete sans croissance.
    /// Sinon une nouvelle entree est creee et la queue est evincee si
    /// necessaire. Retourne l'id de l'entree en tete.
    pub fn insert_at(&mut self, format: EntryFormat, content: Vec<u8>, now: i64) -> EntryId {
        let fingerprint = Fingerprint::compute(format, &content);
        let stamp = self.next_stamp(now);
        let seq = self.bump_seq();

        if self.index.contains_key(&fingerprint) {
            if let Some(pos) = self.entries.iter().position(|e| e.fingerprint == fingerprint) {
                let mut entry = self.entries.remove(pos);
                entry.last_seen_at = stamp;
                entry.seq = seq;
                let id = entry.id;
                self.entries.insert(0, entry);
                self.touch();
                debug!(id = id.0, from = pos, fp = %fingerprint.short(), "history entry promoted");
                return id;
            }
        }

        let id = EntryId(self.next_id);
        self.next_id += 1;
        let size = content.len();
        self.entries.insert(0, ClipboardEntry::new(id, seq, format, content, stamp));
        self.index.insert(fingerprint, id);
        self.enforce_capacity();
        self.touch();
        debug!(id = id.0, %format, size, fp = %fingerprint.short(), "history entry inserted");
        id
    }

    fn next_stamp(&self, now: i64) -> i64 {
        match self.entries.first() {
            Some(front) => now.max(front.last_seen_at + 1),
            None => now,
        }
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    /// Supprime les entrees excedentaires (les moins recemment vues, non epinglees d'abord).
    /// L'entree de tete n'est jamais evincee.
    fn enforce_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            let victim = self.entries[1..]
                .iter()
                .rposition(|e| !e.flags.pinned)
                .map(|i| i + 1)
                .unwrap_or(self.entries.len() - 1);
            let evicted = self.entries.remove(victim);
            self.index.remove(&evicted.fingerprint);
            debug!(id = evicted.id.0, pinned = evicted.flags.pinned, "history entry evicted");
        }
    }

    /// Retourne l'entree a l'index donne (0 = plus recente).
    pub fn get(&self, index: usize) -> Option<&ClipboardEntry> {
        self.entries.get(index)
    }

    /// Retourne l'entree portant l'id donne.
    pub fn get_by_id(&self, id: EntryId) -> Option<&ClipboardEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Position courante de l'entree portant l'id donne.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Vrai si un contenu de meme empreinte est deja present.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.index.contains_key(fingerprint)
    }

    /// Supprime l'entree portant l'id donne.
    pub fn remove(&mut self, id: EntryId) -> Option<ClipboardEntry> {
        let pos = self.position(id)?;
        let entry = self.entries.remove(pos);
        self.index.remove(&entry.fingerprint);
        self.touch();
        debug!(id = id.0, "history entry removed");
        Some(entry)
    }

    /// Epingle ou desepingle l'entree. Retourne le nouvel etat.
    pub fn toggle_pin(&mut self, id: EntryId) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        entry.flags.pinned = !entry.flags.pinned;
        let pinned = entry.flags.pinned;
        self.dirty = true;
        Some(pinned)
    }

    /// Purge tout l'historique. Retourne le nombre d'entrees supprimees.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.index.clear();
        self.touch();
        removed
    }

    /// Purge les entrees non epinglees. Retourne le nombre d'entrees supprimees.
    pub fn clear_unpinned(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.flags.pinned);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.index = self.entries.iter().map(|e| (e.fingerprint, e.id)).collect();
            self.touch();
        }
        removed
    }

    /// Change la capacite. Une capacite nulle est rejetee et l'ancienne conservee.
    pub fn set_capacity(&mut self, capacity: usize) -> CgResult<()> {
        if capacity == 0 {
            return Err(CgError::CapacityViolation { requested: capacity });
        }
        self.capacity = capacity;
        let before = self.entries.len();
        self.enforce_capacity();
        if self.entries.len() != before {
            self.touch();
        }
        Ok(())
    }

    /// Recherche insensible a la casse dans les entrees textuelles.
    pub fn search<'a>(&'a self, query: &str) -> Search<'a> {
        Search::new(&self.entries, query)
    }

    /// Nombre d'entrees dans l'historique.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Retourne true si l'historique est vide.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacite maximale.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Compteur de modifications de contenu ou d'ordre.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Retourne true si l'historique a ete modifie depuis le dernier reset.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marque l'historique comme non modifie.
    pub fn reset_dirty(&mut self) {
        self.dirty = false;
    }

    /// Retourne un iterateur sur les entrees (plus recente en premier).
    pub fn iter(&self) -> std::slice::Iter<'_, ClipboardEntry> {
        self.entries.iter()
    }

    /// Retourne toutes les entrees comme slice.
    pub fn as_slice(&self) -> &[ClipboardEntry] {
        &self.entries
    }
}

impl PartialEq for HistoryStore {
    /// Deux stores sont egaux s'ils ont la meme capacite et les memes entrees.
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity && self.entries == other.entries
    }
}
