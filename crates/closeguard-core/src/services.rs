//! Narrow interfaces to the subsystems a closing window talks to.
//!
//! Each collaborator is a separate trait so hosts and tests can supply
//! exactly the pieces they care about. Everything runs on the UI thread,
//! so implementations use interior mutability behind `&self`.

use crate::close::{ConfirmationPrompt, DownloadBlock};
use crate::event_loop::TaskRunner;
use crate::profile::Profile;
use crate::window::{Tab, WindowId};
use std::rc::Rc;

/// A window as seen through the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredWindow {
    pub id: WindowId,
    pub profile: Profile,
    /// Already running its own close; does not count as an open window
    pub closing: bool,
}

/// Process-wide list of open windows
pub trait WindowRegistry {
    fn register(&self, window: WindowId, profile: &Profile);
    fn unregister(&self, window: WindowId);
    fn set_closing(&self, window: WindowId, closing: bool);
    /// Broadcast that the window has passed every warning and is tearing down
    fn notify_close_started(&self, window: WindowId);
    fn windows(&self) -> Vec<RegisteredWindow>;
}

/// In-flight download counts
pub trait DownloadService {
    /// Downloads that would block shutdown, across every profile
    fn total_in_progress(&self) -> usize;
    fn in_progress_for_profile(&self, profile: &Profile) -> usize;
    fn cancel_all(&self);
}

/// Session persistence
pub trait SessionService {
    fn window_closing(&self, window: WindowId);
    fn window_closed(&self, window: WindowId);
}

/// Recently-closed tracking
pub trait TabRestoreService {
    fn browser_closing(&self, window: WindowId, tabs: &[Tab]);
    fn browser_closed(&self, window: WindowId);
}

/// Runs beforeunload/unload handlers for a window's pages.
///
/// When [`should_close_window`](UnloadController::should_close_window)
/// returns `false` the controller has started the handlers and takes care of
/// re-requesting the close once they finish.
pub trait UnloadController {
    fn should_close_window(&mut self) -> bool;

    /// Start confirming the close. Returns `true` when the user is being
    /// prompted, in which case `on_close_confirmed` receives the answer later.
    fn try_to_close_window(
        &mut self,
        skip_beforeunload: bool,
        on_close_confirmed: Box<dyn FnMut(bool)>,
    ) -> bool;

    fn reset_try_to_close_window(&mut self);
    fn cancel_window_close(&mut self);
    fn is_attempting_to_close(&self) -> bool;
}

/// Modal surfaces. Answers come back through
/// [`Window::on_policy_response`](crate::Window::on_policy_response).
pub trait ClosePrompts {
    fn confirm_close_with_pending_downloads(&self, window: WindowId, block: DownloadBlock);
    fn confirm_close(&self, window: WindowId, prompt: &ConfirmationPrompt);
    /// Open the downloads page so the user can deal with what is still running
    fn show_downloads(&self, window: WindowId);
}

/// Collaborators handed to a window at construction
#[derive(Clone)]
pub struct Services {
    pub registry: Rc<dyn WindowRegistry>,
    /// Absent when the host runs without a profile manager (bare test
    /// harness); every blocking check is then bypassed.
    pub downloads: Option<Rc<dyn DownloadService>>,
    /// Absent for profiles that are not persisted
    pub sessions: Option<Rc<dyn SessionService>>,
    pub tab_restore: Option<Rc<dyn TabRestoreService>>,
    pub prompts: Rc<dyn ClosePrompts>,
    pub tasks: Rc<dyn TaskRunner>,
}

impl Services {
    pub fn has_profile_manager(&self) -> bool {
        self.downloads.is_some()
    }
}

/// Other windows that would stay open if this one closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCensus {
    pub others: usize,
    pub same_profile: usize,
}

impl WindowCensus {
    /// Count windows, skipping `window` itself and any window already closing
    pub fn take(registry: &dyn WindowRegistry, window: WindowId, profile: &Profile) -> Self {
        registry
            .windows()
            .iter()
            .filter(|entry| entry.id != window && !entry.closing)
            .fold(Self::default(), |mut census, entry| {
                census.others += 1;
                if entry.profile == *profile {
                    census.same_profile += 1;
                }
                census
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBrowser;

    #[test]
    fn test_census_skips_self_and_closing_windows() {
        let registry = FakeBrowser::default();
        let default = Profile::regular("default");
        let work = Profile::regular("work");

        registry.register(WindowId::new(1), &default);
        registry.register(WindowId::new(2), &default);
        registry.register(WindowId::new(3), &work);
        registry.register(WindowId::new(4), &default);
        registry.set_closing(WindowId::new(4), true);

        let census = WindowCensus::take(&registry, WindowId::new(1), &default);
        assert_eq!(
            census,
            WindowCensus {
                others: 2,
                same_profile: 1
            }
        );
    }

    #[test]
    fn test_census_of_lone_window() {
        let registry = FakeBrowser::default();
        let default = Profile::regular("default");
        registry.register(WindowId::new(1), &default);

        let census = WindowCensus::take(&registry, WindowId::new(1), &default);
        assert_eq!(census, WindowCensus::default());
    }
}
