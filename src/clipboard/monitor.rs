// ClipGuardian - Surveillance du presse-papiers
// Detection des changements par scrutation periodique.
//
// Le ChangeWatcher est appele a cadence fixe par la boucle principale.
// Il lit le presse-papiers et ne retourne un instantane que si le
// contenu (octets + format) differe de la derniere observation.
//
// # Suppression de l'echo
// Quand le moteur ecrit lui-meme dans le presse-papiers (validation
// d'une entree), `arm_echo` arme une garde : les prochaines observations
// identiques au contenu ecrit (au plus ECHO_SUPPRESS_COUNT, et seulement
// pendant la fenetre configuree) sont avalees. Une observation differente
// prouve une copie externe et desarme la garde.
//
// Le systeme peut relire un contenu sous un autre format que celui ecrit
// (HTML relu comme texte, par exemple) : `arm_echo_forms` accepte toutes
// les formes annoncees par `ClipboardBackend::read_back_forms`.
//
// # Filtrage
// - Texte compose uniquement d'espaces : ignore
// - Contenu vide ou plus grand que la taille max : ignore
//
// # Erreurs
// Un presse-papiers verrouille n'est pas une erreur : le cycle est saute
// et la lecture reessayee au cycle suivant.

use crate::clipboard::{ClipboardBackend, ClipboardSnapshot};
use crate::constants::ECHO_SUPPRESS_COUNT;
use crate::history::{EntryFormat, Fingerprint};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Garde armee apres une ecriture du moteur.
#[derive(Debug, Clone)]
struct EchoGuard {
    fingerprints: Vec<Fingerprint>,
    remaining: u8,
    deadline: Instant,
}

/// Detecteur de changements du presse-papiers.
#[derive(Debug)]
pub struct ChangeWatcher {
    last: Option<Fingerprint>,
    echo: Option<EchoGuard>,
    echo_window: Duration,
    max_entry_size: usize,
}

impl ChangeWatcher {
    pub fn new(echo_window: Duration, max_entry_size: usize) -> Self {
        Self { last: None, echo: None, echo_window, max_entry_size }
    }

    pub fn set_echo_window(&mut self, echo_window: Duration) {
        self.echo_window = echo_window;
    }

    pub fn set_max_entry_size(&mut self, max_entry_size: usize) {
        self.max_entry_size = max_entry_size;
    }

    /// Vrai si une garde d'echo est armee.
    pub fn echo_armed(&self) -> bool {
        self.echo.is_some()
    }

    /// Arme la suppression d'echo pour un contenu que le moteur vient d'ecrire.
    pub fn arm_echo(&mut self, format: EntryFormat, content: &[u8]) {
        self.arm_echo_at(format, content, Instant::now());
    }

    pub fn arm_echo_at(&mut self, format: EntryFormat, content: &[u8], now: Instant) {
        self.arm_echo_forms_at(&[ClipboardSnapshot::new(format, content.to_vec())], now);
    }

    /// Arme la suppression d'echo pour chacune des formes relisibles.
    pub fn arm_echo_forms(&mut self, forms: &[ClipboardSnapshot]) {
        self.arm_echo_forms_at(forms, Instant::now());
    }

    pub fn arm_echo_forms_at(&mut self, forms: &[ClipboardSnapshot], now: Instant) {
        let fingerprints: Vec<Fingerprint> =
            forms.iter().map(|f| Fingerprint::compute(f.format, &f.content)).collect();
        if fingerprints.is_empty() {
            self.echo = None;
            return;
        }
        debug!(fp = %fingerprints[0].short(), forms = fingerprints.len(), "echo suppression armed");
        self.echo = Some(EchoGuard {
            fingerprints,
            remaining: ECHO_SUPPRESS_COUNT,
            deadline: now + self.echo_window,
        });
    }

    /// Lit le presse-papiers et retourne le nouveau contenu eventuel.
    pub fn poll(&mut self, backend: &mut dyn ClipboardBackend) -> Option<ClipboardSnapshot> {
        self.poll_at(backend, Instant::now())
    }

    pub fn poll_at(&mut self, backend: &mut dyn ClipboardBackend, now: Instant) -> Option<ClipboardSnapshot> {
        let snapshot = match backend.read() {
            Ok(Some(s)) => s,
            Ok(None) => return None,
            Err(e) if e.is_transient() => {
                trace!(error = %e, "clipboard busy, retrying next cycle");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "clipboard read failed");
                return None;
            }
        };

        let fingerprint = Fingerprint::compute(snapshot.format, &snapshot.content);
        if self.last == Some(fingerprint) {
            return None;
        }
        self.last = Some(fingerprint);

        if self.swallow_echo(fingerprint, now) {
            debug!(fp = %fingerprint.short(), "own clipboard write ignored");
            return None;
        }

        if snapshot.content.is_empty() || is_blank_text(&snapshot) {
            trace!(format = %snapshot.format, "blank clipboard content ignored");
            return None;
        }
        if snapshot.content.len() > self.max_entry_size {
            debug!(
                format = %snapshot.format,
                size = snapshot.content.len(),
                max = self.max_entry_size,
                "clipboard content too large, ignored"
            );
            return None;
        }

        debug!(format = %snapshot.format, size = snapshot.content.len(), fp = %fingerprint.short(), "clipboard changed");
        Some(snapshot)
    }

    /// Consomme la garde d'echo. Vrai si l'observation doit etre avalee.
    fn swallow_echo(&mut self, fingerprint: Fingerprint, now: Instant) -> bool {
        let Some(guard) = self.echo.as_mut() else {
            return false;
        };
        if now >= guard.deadline || !guard.fingerprints.contains(&fingerprint) {
            self.echo = None;
            return false;
        }
        guard.remaining -= 1;
        if guard.remaining == 0 {
            self.echo = None;
        }
        true
    }
}

fn is_blank_text(snapshot: &ClipboardSnapshot) -> bool {
    snapshot.format.is_textual()
        && std::str::from_utf8(&snapshot.content).map(|s| s.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;

    fn watcher() -> ChangeWatcher {
        ChangeWatcher::new(Duration::from_millis(1500), 1024)
    }

    #[test]
    fn test_only_changes_are_reported() {
        let mut cb = MemoryClipboard::new();
        let mut w = watcher();
        assert!(w.poll(&mut cb).is_none());
        cb.set_text("a");
        assert_eq!(w.poll(&mut cb), Some(ClipboardSnapshot::text("a")));
        assert!(w.poll(&mut cb).is_none());
        cb.set_text("b");
        assert_eq!(w.poll(&mut cb), Some(ClipboardSnapshot::text("b")));
    }

    #[test]
    fn test_format_change_is_a_change() {
        let mut cb = MemoryClipboard::new();
        let mut w = watcher();
        cb.set_text("x");
        assert!(w.poll(&mut cb).is_some());
        cb.set(EntryFormat::Html, b"x");
        assert!(w.poll(&mut cb).is_some());
    }

    #[test]
    fn test_busy_clipboard_retried_next_cycle() {
        let mut cb = MemoryClipboard::new();
        let mut w = watcher();
        cb.set_text("locked");
        cb.set_busy(true);
        assert!(w.poll(&mut cb).is_none());
        cb.set_busy(false);
        assert_eq!(w.poll(&mut cb), Some(ClipboardSnapshot::text("locked")));
    }

    #[test]
    fn test_echo_is_swallowed() {
        let mut cb = MemoryClipboard::new();
        let mut w = watcher();
        cb.set_text("c");
        assert!(w.poll(&mut cb).is_some());

        let now = Instant::now();
        cb.write(EntryFormat::Text, b"a").unwrap();
        w.arm_echo_at(EntryFormat::Text, b"a", now);
        assert!(w.poll_at(&mut cb, now + Duration::from_millis(10)).is_none());
        assert!(w.echo_armed());
        // Le meme contenu n'est plus un changement
        assert!(w.poll_at(&mut cb, now + Duration::from_millis(20)).is_none());
    }

    #[test]
    fn test_external_copy_disarms_echo() {
        let mut cb = MemoryClipboard::new();
        let mut w = watcher();
        let now = Instant::now();
        w.arm_echo_at(EntryFormat::Text, b"a", now);
        cb.set_text("external");
        assert!(w.poll_at(&mut cb, now).is_some());
        assert!(!w.echo_armed());
    }

    #[test]
    fn test_echo_window_expires() {
        let mut cb = MemoryClipboard::new();
        let mut w = watcher();
        let now = Instant::now();
        w.arm_echo_at(EntryFormat::Text, b"a", now);
        cb.set_text("a");
        assert!(w.poll_at(&mut cb, now + Duration::from_secs(5)).is_some());
    }

    #[test]
    fn test_echo_count_is_bounded() {
        let mut cb = MemoryClipboard::new();
        let mut w = watcher();
        let now = Instant::now();
        w.arm_echo_at(EntryFormat::Text, b"a", now);
        for _ in 0..ECHO_SUPPRESS_COUNT {
            cb.set_text("a");
            assert!(w.poll_at(&mut cb, now).is_none());
            // Notification parasite : on oublie la derniere observation
            w.last = None;
        }
        cb.set_text("a");
        assert!(w.poll_at(&mut cb, now).is_some());
    }

    #[test]
    fn test_echo_accepts_read_back_forms() {
        let mut cb = MemoryClipboard::new();
        let mut w = watcher();
        cb.set_text("before");
        assert!(w.poll(&mut cb).is_some());

        let html = b"<b>x</b>";
        let forms = [
            ClipboardSnapshot::new(EntryFormat::Html, html.to_vec()),
            ClipboardSnapshot::new(EntryFormat::Text, html.to_vec()),
        ];
        let now = Instant::now();
        w.arm_echo_forms_at(&forms, now);

        // Ecrit en HTML, relu comme texte brut
        cb.set(EntryFormat::Text, html);
        assert!(w.poll_at(&mut cb, now).is_none());
        assert!(w.echo_armed());
    }

    #[test]
    fn test_blank_and_oversized_ignored() {
        let mut cb = MemoryClipboard::new();
        let mut w = ChangeWatcher::new(Duration::from_millis(100), 8);
        cb.set_text("   \n\t");
        assert!(w.poll(&mut cb).is_none());
        cb.set_text("0123456789");
        assert!(w.poll(&mut cb).is_none());
        cb.set(EntryFormat::Image, &[0u8; 8]);
        assert!(w.poll(&mut cb).is_some());
    }
}
