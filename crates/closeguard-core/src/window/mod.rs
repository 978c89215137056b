//! A browser window and its close sequence.
//!
//! Closing goes through three stages:
//!
//! 1. Close warnings (downloads, then the multi-tab confirmation). Either may
//!    show a modal prompt and suspend the close until it is answered.
//! 2. The unload controller runs beforeunload handlers. It may suspend the
//!    close as well and re-requests it when done.
//! 3. Teardown: session and tab-restore notifications, the close-started
//!    broadcast, then the tabs are closed. Once the strip is empty the window
//!    posts its own deletion to the host's event loop.

mod tab_strip;

pub use tab_strip::{NEW_TAB_URL, Tab, TabId, TabStrip};

use crate::close::{
    CloseContext, CloseCoordinator, CloseDecision, ClosePolicy, ConfirmationState, DownloadBlock,
    DownloadCloseType, PendingClose,
};
use crate::config::CloseSettings;
use crate::event_loop::Task;
use crate::profile::Profile;
use crate::services::{Services, UnloadController};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(u32);

impl WindowId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Continuation receiving the outcome of the close warnings
pub type WarnBeforeClosingCallback = PendingClose<Window>;

pub struct Window {
    id: WindowId,
    profile: Rc<Profile>,
    tabs: TabStrip,
    coordinator: CloseCoordinator<Window>,
    unload: Box<dyn UnloadController>,
    services: Services,
    browser_outlives_windows: bool,
    close_started: bool,
    delete_scheduled: bool,
}

impl Window {
    /// Create a window and register it with the window registry
    pub fn new(
        id: WindowId,
        profile: Rc<Profile>,
        tabs: TabStrip,
        settings: &CloseSettings,
        unload: Box<dyn UnloadController>,
        services: Services,
    ) -> Self {
        services.registry.register(id, &profile);
        tracing::debug!(
            "Window {} opened for profile '{}' with {} tab(s)",
            id,
            profile.name(),
            tabs.count()
        );

        Self {
            id,
            profile,
            tabs,
            coordinator: CloseCoordinator::new(settings),
            unload,
            services,
            browser_outlives_windows: settings.browser_outlives_windows,
            close_started: false,
            delete_scheduled: false,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabStrip {
        &mut self.tabs
    }

    pub fn confirmation_state(&self, policy: ClosePolicy) -> ConfirmationState {
        self.coordinator.state(policy)
    }

    /// A close warning is showing and waiting for the user
    pub fn has_pending_close_warning(&self) -> bool {
        self.coordinator.has_pending()
    }

    pub fn is_close_started(&self) -> bool {
        self.close_started
    }

    pub fn is_delete_scheduled(&self) -> bool {
        self.delete_scheduled
    }

    pub fn set_skip_close_warnings(&mut self, skip: bool) {
        self.coordinator.set_skip_close_warnings(skip);
    }

    /// How in-progress downloads would be affected if this window closed now
    pub fn ok_to_close_with_in_progress_downloads(&self) -> DownloadBlock {
        DownloadBlock::for_window(self.id, &self.profile, &self.services)
    }

    /// Show whatever warnings the user must see before this window closes.
    ///
    /// `OkToClose` means nothing needed asking and `warn_callback` is dropped.
    /// `DoNotClose` means a prompt is up and `warn_callback` runs with the
    /// user's answer.
    pub fn maybe_warn_before_closing(
        &mut self,
        warn_callback: WarnBeforeClosingCallback,
    ) -> CloseDecision {
        let mut ctx = CloseContext {
            window: self.id,
            profile: &self.profile,
            tabs: &mut self.tabs,
            services: &self.services,
        };
        self.coordinator.request_close(&mut ctx, warn_callback)
    }

    /// Whether the window may close now: close warnings first, then
    /// beforeunload handlers. `false` means one of them is still running.
    pub fn should_close_window(&mut self) -> bool {
        if self.coordinator.skip_close_warnings() {
            return true;
        }

        // Once teardown has begun the warnings were already answered
        if !self.close_started
            && self.maybe_warn_before_closing(Box::new(Window::finish_warn_before_closing))
                == CloseDecision::DoNotClose
        {
            return false;
        }

        self.unload.should_close_window()
    }

    /// The user answered the prompt shown for `policy`
    pub fn on_policy_response(&mut self, policy: ClosePolicy, approved: bool) -> Result<()> {
        let (callback, decision) = self.coordinator.on_policy_response(
            self.id,
            policy,
            approved,
            self.services.prompts.as_ref(),
        )?;
        callback(self, decision);
        self.sync_close_attempt();
        Ok(())
    }

    fn finish_warn_before_closing(&mut self, decision: CloseDecision) {
        match decision {
            CloseDecision::OkToClose => self.on_window_closing(),
            // Leaves the unload controller idle so closing single tabs
            // does not prompt again
            CloseDecision::DoNotClose => self.unload.cancel_window_close(),
        }
    }

    /// The user (or the host) asked for this window to close
    pub fn on_window_closing(&mut self) {
        if self.delete_scheduled {
            return;
        }

        let approved = self.should_close_window();
        self.sync_close_attempt();
        if !approved {
            return;
        }

        if !self.close_started {
            self.start_teardown();
        }

        if !self.tabs.is_empty() {
            let closed = self.tabs.close_all();
            tracing::debug!("Closed {} tab(s) of window {}", closed.len(), self.id);
            // The emptied strip brings us back here to schedule deletion
            self.services.tasks.post(Task::CloseWindow(self.id));
        } else {
            tracing::debug!("Scheduling deletion of window {}", self.id);
            self.delete_scheduled = true;
            self.services.tasks.post(Task::DeleteWindow(self.id));
        }
    }

    fn start_teardown(&mut self) {
        tracing::info!("Window {} is closing", self.id);
        self.close_started = true;

        if let Some(sessions) = &self.services.sessions {
            sessions.window_closing(self.id);
        }

        if !self.tabs.is_empty() {
            if let Some(tab_restore) = &self.services.tab_restore {
                tab_restore.browser_closing(self.id, self.tabs.tabs());
            }
        }

        self.services.registry.notify_close_started(self.id);
        self.sync_close_attempt();
    }

    /// Begin confirming the close through the unload controller, treating
    /// the download warning as already answered. Returns `true` while the
    /// user is being asked; `on_close_confirmed` then gets the answer.
    pub fn try_to_close_window(
        &mut self,
        skip_beforeunload: bool,
        on_close_confirmed: Box<dyn FnMut(bool)>,
    ) -> bool {
        self.coordinator.mark_downloads_confirmed();
        let prompting = self
            .unload
            .try_to_close_window(skip_beforeunload, on_close_confirmed);
        self.sync_close_attempt();
        prompting
    }

    /// Clear the answers gathered by an abandoned close attempt
    pub fn reset_try_to_close_window(&mut self) {
        self.coordinator.reset();
        self.unload.reset_try_to_close_window();
        self.sync_close_attempt();
    }

    /// Beforeunload handlers cancelled the close. Answers given to the
    /// close warnings during this attempt no longer count.
    pub fn on_unload_cancelled(&mut self) {
        tracing::debug!("Window {} close cancelled by beforeunload", self.id);
        self.coordinator.reset();
        self.sync_close_attempt();
    }

    pub fn is_attempting_to_close(&self) -> bool {
        self.close_started || self.unload.is_attempting_to_close()
    }

    /// Publish the current close attempt state to the window registry.
    /// Hosts call this after resolving unload handlers themselves.
    pub fn sync_close_attempt(&self) {
        self.services
            .registry
            .set_closing(self.id, self.is_attempting_to_close());
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("profile", &self.profile)
            .field("tabs", &self.tabs)
            .field("coordinator", &self.coordinator)
            .field("close_started", &self.close_started)
            .field("delete_scheduled", &self.delete_scheduled)
            .finish()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if !self.tabs.is_empty() {
            tracing::warn!(
                "Window {} destroyed with {} tab(s) still open",
                self.id,
                self.tabs.count()
            );
        }

        self.services.registry.unregister(self.id);

        if !self.browser_outlives_windows {
            let block = self.ok_to_close_with_in_progress_downloads();
            if block.close_type == DownloadCloseType::BrowserShutdownWouldCancel {
                if let Some(downloads) = &self.services.downloads {
                    tracing::info!("Cancelling {} download(s) at shutdown", block.blocking);
                    downloads.cancel_all();
                }
            }
        }

        if let Some(sessions) = &self.services.sessions {
            sessions.window_closed(self.id);
        }
        if let Some(tab_restore) = &self.services.tab_restore {
            tab_restore.browser_closed(self.id);
        }
    }
}
