// ClipGuardian - Orchestrateur principal
// Connecte tous les composants : clipboard, history, navigation, storage
// Gere la boucle asynchrone et le cycle de vie du moteur
//
// Ce fichier est le coeur de ClipGuardian. Il orchestre le chargement
// initial, la scrutation du presse-papiers, les actions de l'UI et des
// raccourcis, et la sauvegarde differee.
//
// # Architecture
// `GuardianLoop` est l'unique proprietaire du `HistoryStore` : toutes les
// mutations passent par sa boucle `select!`, une seule a la fois. Les
// autres composants communiquent par canaux :
// - `Action` (mpsc borne) : raccourcis, navigateur, reglages
// - `EngineView` (watch) : instantane en lecture seule pour l'UI
// - `UiEvent` (broadcast) : apercu a afficher ou masquer
// La sauvegarde tourne dans une tache separee (`AutoSaver`) : la boucle
// ne bloque jamais sur le disque.
//
// # Cycle de vie
// 1. `GuardianLoop::new()` : chargement de l'historique (vide si illisible)
// 2. `GuardianLoop::run()` : boucle jusqu'a l'annulation du jeton
// 3. fin de `run()` : sauvegarde finale, attendue avant de rendre la main
//
// # Evenements geres
// - tick de scrutation : nouvelle copie detectee
// - Action              : navigation, validation, purge, recherche...
// - expiration apercu   : fin de la session de navigation
// - tick auto-clear     : purge des entrees non epinglees

use crate::clipboard::{ChangeWatcher, ClipboardBackend};
use crate::config::{HotkeyAction, HotkeyBindings, Hotkey, Settings};
use crate::constants::{ACTION_CHANNEL_SIZE, UI_EVENT_CHANNEL_SIZE};
use crate::error::{CgError, CgResult};
use crate::history::{ClipboardEntry, EntryId, HistoryStore};
use crate::navigation::{NavOutcome, NavigationController, PreviewView, UiEvent};
use crate::storage::{AutoSaver, SaveStats, Vault};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Evenement discret recu par le moteur.
#[derive(Debug)]
pub enum Action {
    /// Entree suivante (plus ancienne)
    Advance,
    /// Entree precedente (plus recente)
    Retreat,
    /// Recopier l'entree previsualisee
    Commit,
    /// Fermer l'apercu sans rien ecrire
    Cancel,
    /// L'apercu a perdu le focus
    FocusLost,
    /// Ouvrir le navigateur d'historique
    OpenBrowser,
    /// Purger tout l'historique (sauvegarde immediate)
    ClearHistory,
    /// Recherche insensible a la casse, resultats plus recents d'abord
    Search { query: String, reply: oneshot::Sender<Vec<ClipboardEntry>> },
    /// Supprimer une entree
    Delete(EntryId),
    /// Recopier une entree choisie dans le navigateur
    Activate(EntryId),
    /// Epingler / desepingler une entree
    TogglePin(EntryId),
    /// Combinaison pressee, resolue via les raccourcis configures
    Hotkey(Hotkey),
    /// Appliquer de nouveaux reglages
    ApplySettings(Box<Settings>),
}

/// Instantane en lecture seule pour l'UI.
#[derive(Debug, Clone)]
pub struct EngineView {
    /// Entrees, plus recente en premier
    pub entries: Arc<[ClipboardEntry]>,
    /// Apercu courant
    pub preview: Option<PreviewView>,
    pub revision: u64,
    pub capacity: usize,
}

impl Default for EngineView {
    fn default() -> Self {
        Self { entries: Arc::from(Vec::new()), preview: None, revision: 0, capacity: 0 }
    }
}

/// Poignee clonable vers le moteur.
#[derive(Debug, Clone)]
pub struct GuardianHandle {
    actions: mpsc::Sender<Action>,
    view: watch::Receiver<EngineView>,
    events: broadcast::Sender<UiEvent>,
    cancel: CancellationToken,
}

impl GuardianHandle {
    /// Envoie une action, en attendant une place dans le canal.
    pub async fn send(&self, action: Action) -> CgResult<()> {
        self.actions.send(action).await.map_err(|_| CgError::Stopped)
    }

    /// Envoie une action sans attendre (callbacks de raccourcis).
    pub fn try_send(&self, action: Action) -> CgResult<()> {
        self.actions.try_send(action).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => CgError::TransientIo("action channel full".into()),
            mpsc::error::TrySendError::Closed(_) => CgError::Stopped,
        })
    }

    /// Recherche dans l'historique.
    pub async fn search(&self, query: &str) -> CgResult<Vec<ClipboardEntry>> {
        let (reply, rx) = oneshot::channel();
        self.send(Action::Search { query: query.to_string(), reply }).await?;
        rx.await.map_err(|_| CgError::Stopped)
    }

    /// Dernier instantane publie.
    pub fn view(&self) -> EngineView {
        self.view.borrow().clone()
    }

    /// Recepteur des instantanes, pour attendre les changements.
    pub fn watch_view(&self) -> watch::Receiver<EngineView> {
        self.view.clone()
    }

    /// Abonnement aux evenements UI.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    /// Demande l'arret du moteur.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Boucle principale, unique proprietaire de l'historique.
pub struct GuardianLoop {
    settings: Settings,
    bindings: HotkeyBindings,
    store: HistoryStore,
    watcher: ChangeWatcher,
    nav: NavigationController,
    clipboard: Box<dyn ClipboardBackend>,
    saver: AutoSaver,
    actions: mpsc::Receiver<Action>,
    view_tx: watch::Sender<EngineView>,
    events: broadcast::Sender<UiEvent>,
    cancel: CancellationToken,
    poll: Interval,
    auto_clear: Option<Interval>,
    preview: Option<PreviewView>,
    preview_deadline: Option<Instant>,
    view_stale: bool,
    save_now: bool,
}

impl GuardianLoop {
    /// Construit le moteur et charge l'historique persiste.
    ///
    /// Doit etre appele dans un runtime tokio (la tache de sauvegarde est
    /// demarree ici). Un historique illisible donne un store vide.
    pub fn new(
        settings: Settings,
        vault: Arc<Vault>,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> CgResult<(Self, GuardianHandle)> {
        let settings = settings.sanitized();
        let store = vault.load(settings.history.capacity)?;
        info!(entries = store.len(), capacity = store.capacity(), "history loaded");
        Ok(Self::with_store(settings, store, vault, clipboard))
    }

    /// Construit le moteur autour d'un store deja charge.
    pub fn with_store(
        settings: Settings,
        store: HistoryStore,
        vault: Arc<Vault>,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> (Self, GuardianHandle) {
        let (action_tx, actions) = mpsc::channel(ACTION_CHANNEL_SIZE);
        let (view_tx, view_rx) = watch::channel(EngineView::default());
        let (events, _) = broadcast::channel(UI_EVENT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        let handle = GuardianHandle {
            actions: action_tx,
            view: view_rx,
            events: events.clone(),
            cancel: cancel.clone(),
        };

        let mut engine = Self {
            bindings: settings.hotkeys.bindings(),
            watcher: ChangeWatcher::new(settings.echo_window(), settings.max_entry_size()),
            saver: AutoSaver::spawn(vault, settings.save_debounce()),
            poll: poll_interval(settings.poll_interval()),
            auto_clear: settings.auto_clear_interval().map(auto_clear_interval),
            settings,
            store,
            nav: NavigationController::new(),
            clipboard,
            actions,
            view_tx,
            events,
            cancel,
            preview: None,
            preview_deadline: None,
            view_stale: true,
            save_now: false,
        };
        engine.publish_view();
        (engine, handle)
    }

    /// Execute la boucle jusqu'a l'annulation, puis attend la sauvegarde finale.
    pub async fn run(mut self) -> SaveStats {
        info!(
            entries = self.store.len(),
            poll_ms = self.settings.watcher.poll_interval_ms,
            "guardian loop started"
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = self.poll.tick() => self.on_poll(),
                Some(action) = self.actions.recv() => self.on_action(action),
                _ = sleep_until_opt(self.preview_deadline) => self.on_preview_timeout(),
                _ = tick_opt(&mut self.auto_clear) => self.on_auto_clear(),
            }
            self.flush_changes();
        }

        let outcome = self.nav.cancel();
        self.apply_outcome(outcome);
        self.flush_changes();
        let stats = self.saver.shutdown().await;
        info!(saves = stats.saves, failures = stats.failures, "guardian loop stopped");
        stats
    }

    fn on_poll(&mut self) {
        if let Some(snapshot) = self.watcher.poll(self.clipboard.as_mut()) {
            self.store.insert(snapshot.format, snapshot.content);
        }
    }

    fn on_action(&mut self, action: Action) {
        match action {
            Action::Advance => {
                let outcome = self.nav.advance(&self.store);
                self.apply_outcome(outcome);
            }
            Action::Retreat => {
                let outcome = self.nav.retreat(&self.store);
                self.apply_outcome(outcome);
            }
            Action::Commit => {
                let result = self.nav.commit(&mut self.store, self.clipboard.as_mut(), &mut self.watcher);
                self.apply_write_back(result);
            }
            Action::Activate(id) => {
                let result = self.nav.activate(id, &mut self.store, self.clipboard.as_mut(), &mut self.watcher);
                self.apply_write_back(result);
            }
            Action::Cancel => {
                let outcome = self.nav.cancel();
                self.apply_outcome(outcome);
            }
            Action::FocusLost => {
                let outcome = self.nav.focus_lost();
                self.apply_outcome(outcome);
            }
            Action::OpenBrowser => {
                let outcome = self.nav.cancel();
                self.apply_outcome(outcome);
                self.emit(UiEvent::OpenBrowser);
            }
            Action::ClearHistory => {
                let removed = self.store.clear();
                self.save_now = true;
                info!(removed, "history cleared");
            }
            Action::Search { query, reply } => {
                let results: Vec<ClipboardEntry> = self.store.search(&query).cloned().collect();
                debug!(results = results.len(), "history searched");
                let _ = reply.send(results);
            }
            Action::Delete(id) => {
                if self.store.remove(id).is_none() {
                    debug!(id = id.0, "delete ignored, unknown entry");
                }
            }
            Action::TogglePin(id) => match self.store.toggle_pin(id) {
                Some(pinned) => debug!(id = id.0, pinned, "pin toggled"),
                None => debug!(id = id.0, "pin ignored, unknown entry"),
            },
            Action::Hotkey(hotkey) => match self.bindings.action_for(&hotkey) {
                Some(action) => self.on_action(hotkey_action(action)),
                None => debug!(%hotkey, "unbound hotkey ignored"),
            },
            Action::ApplySettings(settings) => self.apply_settings(*settings),
        }
    }

    fn apply_write_back(&mut self, result: CgResult<NavOutcome>) {
        match result {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                self.apply_outcome(NavOutcome::Closed);
            }
        }
    }

    /// Traduit l'effet d'un evenement de navigation en evenements UI.
    fn apply_outcome(&mut self, outcome: NavOutcome) {
        match outcome {
            NavOutcome::Unchanged => {}
            NavOutcome::Preview(index) => {
                let Some(entry) = self.store.get(index) else {
                    return;
                };
                let preview = PreviewView { entry: entry.clone(), index, total: self.store.len() };
                self.preview_deadline = Some(Instant::now() + self.settings.preview_duration());
                self.preview = Some(preview.clone());
                self.view_stale = true;
                if self.settings.preview.enabled {
                    self.emit(UiEvent::ShowPreview { preview, style: self.settings.preview.style() });
                }
            }
            NavOutcome::Closed | NavOutcome::Committed(_) => {
                self.preview_deadline = None;
                if self.preview.take().is_some() {
                    self.view_stale = true;
                    self.emit(UiEvent::HidePreview);
                }
            }
        }
    }

    fn on_preview_timeout(&mut self) {
        self.preview_deadline = None;
        let outcome = self.nav.timeout();
        self.apply_outcome(outcome);
    }

    fn on_auto_clear(&mut self) {
        let removed = self.store.clear_unpinned();
        if removed > 0 {
            self.save_now = true;
            info!(removed, "auto-clear removed unpinned entries");
        }
    }

    fn apply_settings(&mut self, mut settings: Settings) {
        let prior = self.store.capacity();
        if settings.history.capacity == 0 {
            let err = CgError::CapacityViolation { requested: 0 };
            warn!(error = %err, kept = prior, "capacity rejected");
            settings.history.capacity = prior;
        }
        let settings = settings.sanitized();

        if let Err(e) = self.store.set_capacity(settings.history.capacity) {
            warn!(error = %e, kept = prior, "capacity rejected");
        }
        self.watcher.set_echo_window(settings.echo_window());
        self.watcher.set_max_entry_size(settings.max_entry_size());
        self.saver.set_debounce(settings.save_debounce());
        if settings.watcher.poll_interval_ms != self.settings.watcher.poll_interval_ms {
            self.poll = poll_interval(settings.poll_interval());
        }
        if settings.auto_clear_interval() != self.settings.auto_clear_interval() {
            self.auto_clear = settings.auto_clear_interval().map(auto_clear_interval);
        }
        self.bindings = settings.hotkeys.bindings();
        let preview_disabled = !settings.preview.enabled;
        self.settings = settings;
        if preview_disabled {
            let outcome = self.nav.cancel();
            self.apply_outcome(outcome);
        }
        self.view_stale = true;
        info!(capacity = self.store.capacity(), "settings applied");
    }

    /// Publie les changements de l'historique : vue, evenement, sauvegarde.
    fn flush_changes(&mut self) {
        if self.store.is_dirty() {
            if self.nav.is_active() && self.nav.validated_cursor(&self.store).is_none() {
                self.apply_outcome(NavOutcome::Closed);
            }
            let entries: Arc<[ClipboardEntry]> = Arc::from(self.store.as_slice().to_vec());
            if std::mem::take(&mut self.save_now) {
                self.saver.request_now(Arc::clone(&entries));
            } else {
                self.saver.request(Arc::clone(&entries));
            }
            self.store.reset_dirty();
            self.publish_entries(entries);
            self.emit(UiEvent::HistoryChanged { revision: self.store.revision(), len: self.store.len() });
        } else if self.view_stale {
            self.publish_view();
        }
    }

    fn publish_view(&mut self) {
        let entries: Arc<[ClipboardEntry]> = Arc::from(self.store.as_slice().to_vec());
        self.publish_entries(entries);
    }

    fn publish_entries(&mut self, entries: Arc<[ClipboardEntry]>) {
        self.view_tx.send_replace(EngineView {
            entries,
            preview: self.preview.clone(),
            revision: self.store.revision(),
            capacity: self.store.capacity(),
        });
        self.view_stale = false;
    }

    fn emit(&self, event: UiEvent) {
        // Aucun abonne : evenement perdu, la vue reste consultable
        let _ = self.events.send(event);
    }
}

fn hotkey_action(action: HotkeyAction) -> Action {
    match action {
        HotkeyAction::Advance => Action::Advance,
        HotkeyAction::Retreat => Action::Retreat,
        HotkeyAction::Commit => Action::Commit,
        HotkeyAction::Cancel => Action::Cancel,
        HotkeyAction::OpenBrowser => Action::OpenBrowser,
    }
}

fn poll_interval(period: Duration) -> Interval {
    let mut poll = interval(period);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    poll
}

fn auto_clear_interval(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn tick_opt(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardSnapshot, MemoryClipboard};

    fn engine(dir: &std::path::Path) -> (GuardianLoop, GuardianHandle, MemoryClipboard, Arc<Vault>) {
        let clipboard = MemoryClipboard::new();
        let vault = Arc::new(Vault::new(dir));
        let (engine, handle) =
            GuardianLoop::new(Settings::default(), Arc::clone(&vault), Box::new(clipboard.clone())).unwrap();
        (engine, handle, clipboard, vault)
    }

    fn copy(engine: &mut GuardianLoop, clipboard: &MemoryClipboard, text: &str) {
        clipboard.set_text(text);
        engine.on_poll();
        engine.flush_changes();
    }

    fn texts(engine: &GuardianLoop) -> Vec<String> {
        engine.store.iter().map(|e| e.text().into_owned()).collect()
    }

    #[tokio::test]
    async fn test_poll_inserts_and_publishes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, handle, clipboard, _) = engine(dir.path());
        let mut events = handle.subscribe();
        copy(&mut engine, &clipboard, "hello");
        assert_eq!(handle.view().entries.len(), 1);
        assert!(matches!(events.try_recv(), Ok(UiEvent::HistoryChanged { len: 1, .. })));
    }

    #[tokio::test]
    async fn test_navigation_emits_preview_events() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, handle, clipboard, _) = engine(dir.path());
        for s in ["A", "B", "C"] {
            copy(&mut engine, &clipboard, s);
        }
        let mut events = handle.subscribe();
        engine.on_action(Action::Advance);
        engine.on_action(Action::Advance);
        engine.flush_changes();

        match events.try_recv().unwrap() {
            UiEvent::ShowPreview { preview, .. } => assert_eq!(preview.index, 0),
            other => panic!("unexpected event {:?}", other),
        }
        match events.try_recv().unwrap() {
            UiEvent::ShowPreview { preview, .. } => {
                assert_eq!(preview.index, 1);
                assert_eq!(preview.entry.text(), "B");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(handle.view().preview.unwrap().index, 1);

        engine.on_action(Action::Cancel);
        assert!(matches!(events.try_recv(), Ok(UiEvent::HidePreview)));
        assert!(clipboard.writes().is_empty());
    }

    #[tokio::test]
    async fn test_commit_then_echo_poll() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _handle, clipboard, _) = engine(dir.path());
        for s in ["A", "B", "C"] {
            copy(&mut engine, &clipboard, s);
        }
        for _ in 0..3 {
            engine.on_action(Action::Advance);
        }
        engine.on_action(Action::Commit);
        engine.flush_changes();
        assert_eq!(clipboard.current(), Some(ClipboardSnapshot::text("A")));
        assert_eq!(texts(&engine), vec!["A", "C", "B"]);

        let revision = engine.store.revision();
        engine.on_poll();
        assert_eq!(engine.store.revision(), revision);
        assert_eq!(texts(&engine), vec!["A", "C", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_expires() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, handle, clipboard, _) = engine(dir.path());
        copy(&mut engine, &clipboard, "x");
        let mut events = handle.subscribe();
        let task = tokio::spawn(engine.run());

        handle.send(Action::Advance).await.unwrap();
        let mut shown = false;
        loop {
            match events.recv().await.unwrap() {
                UiEvent::ShowPreview { .. } => shown = true,
                UiEvent::HidePreview => break,
                _ => {}
            }
        }
        assert!(shown);
        assert!(handle.view().preview.is_none());

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_hotkey_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _handle, clipboard, _) = engine(dir.path());
        copy(&mut engine, &clipboard, "only");
        let advance = Hotkey::parse("Ctrl+Alt+Down").unwrap();
        engine.on_action(Action::Hotkey(advance));
        assert_eq!(engine.nav.cursor(), Some(0));
        engine.on_action(Action::Hotkey(Hotkey::parse("Shift+Q").unwrap()));
        assert_eq!(engine.nav.cursor(), Some(0));
    }

    #[tokio::test]
    async fn test_new_copy_ends_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, handle, clipboard, _) = engine(dir.path());
        copy(&mut engine, &clipboard, "A");
        engine.on_action(Action::Advance);
        let mut events = handle.subscribe();
        copy(&mut engine, &clipboard, "B");
        assert!(!engine.nav.is_active());
        assert!(matches!(events.try_recv(), Ok(UiEvent::HidePreview)));
    }

    #[tokio::test]
    async fn test_apply_settings_rejects_zero_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _handle, clipboard, _) = engine(dir.path());
        for s in ["a", "b", "c"] {
            copy(&mut engine, &clipboard, s);
        }
        let mut settings = Settings::default();
        settings.history.capacity = 0;
        settings.preview.enabled = false;
        engine.on_action(Action::ApplySettings(Box::new(settings)));
        assert_eq!(engine.store.capacity(), 50);
        assert!(!engine.settings.preview.enabled);

        let mut settings = Settings::default();
        settings.history.capacity = 2;
        engine.on_action(Action::ApplySettings(Box::new(settings)));
        assert_eq!(texts(&engine), vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_disabling_preview_hides_open_preview() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, handle, clipboard, _) = engine(dir.path());
        copy(&mut engine, &clipboard, "shown");
        engine.on_action(Action::Advance);
        assert!(engine.nav.is_active());

        let mut events = handle.subscribe();
        let mut settings = Settings::default();
        settings.preview.enabled = false;
        engine.on_action(Action::ApplySettings(Box::new(settings)));
        engine.flush_changes();

        assert!(!engine.nav.is_active());
        assert!(matches!(events.try_recv(), Ok(UiEvent::HidePreview)));
        assert!(handle.view().preview.is_none());
    }

    #[tokio::test]
    async fn test_search_delete_pin() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _handle, clipboard, _) = engine(dir.path());
        for s in ["hello world", "goodbye", "Hello there"] {
            copy(&mut engine, &clipboard, s);
        }
        let (reply, mut rx) = oneshot::channel();
        engine.on_action(Action::Search { query: "hello".into(), reply });
        let found: Vec<String> = rx.try_recv().unwrap().iter().map(|e| e.text().into_owned()).collect();
        assert_eq!(found, vec!["Hello there", "hello world"]);

        let goodbye = engine.store.get(1).unwrap().id();
        engine.on_action(Action::TogglePin(goodbye));
        assert!(engine.store.get(1).unwrap().is_pinned());
        engine.on_action(Action::Delete(goodbye));
        assert_eq!(texts(&engine), vec!["Hello there", "hello world"]);
    }

    #[tokio::test]
    async fn test_clear_saves_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _handle, clipboard, vault) = engine(dir.path());
        copy(&mut engine, &clipboard, "secret");
        engine.on_action(Action::ClearHistory);
        engine.flush_changes();
        assert!(engine.store.is_empty());

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if vault.blob_path().exists() && vault.try_load().map(|e| e.is_empty()).unwrap_or(false) {
                break;
            }
            assert!(Instant::now() < deadline, "clear was not saved");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(vault.load(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_flushes_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, handle, clipboard, vault) = engine(dir.path());
        copy(&mut engine, &clipboard, "persist me");
        handle.shutdown();
        let stats = engine.run().await;
        assert_eq!(stats.failures, 0);
        let loaded = vault.load(10).unwrap();
        assert_eq!(loaded.get(0).unwrap().text(), "persist me");
    }
}
