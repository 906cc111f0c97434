// ClipGuardian - Module history
// Gestion de l'historique du presse-papiers en memoire
//
// Ce module gere l'historique des entrees de presse-papiers en memoire.
// Il est independant de la plateforme et de la boucle asynchrone.
//
// # Sous-modules
// - `entry`  : structure ClipboardEntry, format, empreinte et identifiant
// - `store`  : HistoryStore borne, deduplique par empreinte, ordonne par recence,
//              avec epinglage et flag dirty
// - `search` : recherche paresseuse insensible a la casse
//
// # Architecture
// Le store est une variante de LRU ou "utiliser" signifie "recopier le
// contenu" et non "le lire" : la navigation ne modifie jamais l'ordre.

/// Structure de donnees d'une entree de presse-papiers.
pub mod entry;
/// Recherche paresseuse insensible a la casse dans les entrees.
pub mod search;
/// Store borne et deduplique de l'historique.
pub mod store;

pub use entry::{ClipboardEntry, EntryFormat, EntryId, Fingerprint};
pub use store::HistoryStore;
