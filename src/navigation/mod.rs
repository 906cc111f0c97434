// ClipGuardian - Module navigation
// Parcours de l'historique par raccourcis et apercu
//
// # Sous-modules
// - `controller` : machine a etats Idle / Previewing / Committed,
//                  curseur revalide a chaque evenement
// - `overlay`    : evenements publies vers l'UI (apercu, navigateur)

/// Machine a etats de navigation.
pub mod controller;
/// Evenements vers l'UI.
pub mod overlay;

pub use controller::{NavOutcome, NavState, NavigationController};
pub use overlay::{PreviewView, UiEvent};
