// ClipGuardian - Arbre de modules (crate library)
//
// Ce fichier constitue le point d'entree de la crate library de ClipGuardian.
// Il re-exporte tous les modules pour permettre l'acces depuis le binaire
// et faciliter les tests d'integration.
//
// # Modules
// - `app`        : orchestrateur principal, boucle asynchrone du moteur
// - `clipboard`  : lecture/ecriture du presse-papiers, detection des copies
// - `config`     : reglages utilisateur (toml) et raccourcis
// - `constants`  : constantes globales (tailles, delais, noms de fichiers)
// - `crypto`     : chiffrement authentifie et fichier de cle
// - `error`      : types d'erreur centralises (CgError, CgResult)
// - `history`    : historique en memoire (dedup, eviction, recherche)
// - `navigation` : parcours de l'historique et evenements d'apercu
// - `storage`    : persistance chiffree sur disque, sauvegarde differee

/// Orchestrateur principal du moteur.
pub mod app;
/// Acces au presse-papiers et detection des copies.
pub mod clipboard;
/// Configuration utilisateur et raccourcis.
pub mod config;
/// Constantes globales de l'application.
pub mod constants;
/// Chiffrement authentifie et gestion de la cle.
pub mod crypto;
/// Types d'erreur centralises.
pub mod error;
/// Gestion de l'historique en memoire.
pub mod history;
/// Navigation par raccourcis et apercu.
pub mod navigation;
/// Persistance chiffree sur disque.
pub mod storage;

pub use app::{Action, EngineView, GuardianHandle, GuardianLoop};
pub use error::{CgError, CgResult};
