use super::{
    CloseDecision, ClosePolicy, ConfirmationState, DownloadBlockPolicy, MultiTabPolicy,
};
use crate::config::CloseSettings;
use crate::profile::Profile;
use crate::services::{ClosePrompts, Services};
use crate::window::{TabStrip, WindowId};
use crate::{Error, Result};
use std::fmt;

/// Continuation run once the user has answered a close warning. It gets the
/// owner back as an argument instead of capturing it.
pub type PendingClose<T> = Box<dyn FnOnce(&mut T, CloseDecision)>;

/// What the policies get to see of the closing window
pub struct CloseContext<'a> {
    pub window: WindowId,
    pub profile: &'a Profile,
    pub tabs: &'a mut TabStrip,
    pub services: &'a Services,
}

/// Runs the close warnings for one window.
///
/// Downloads are checked before the multi-tab confirmation on every attempt,
/// and at most one of them is showing a prompt at any time. While a prompt is
/// up the coordinator holds the single [`PendingClose`] continuation; asking
/// to close again before it has been answered is a bug in the caller.
pub struct CloseCoordinator<T> {
    downloads: DownloadBlockPolicy,
    multi_tab: MultiTabPolicy,
    skip_close_warnings: bool,
    pending: Option<PendingClose<T>>,
}

impl<T> CloseCoordinator<T> {
    pub fn new(settings: &CloseSettings) -> Self {
        Self {
            downloads: DownloadBlockPolicy::new(settings.browser_outlives_windows),
            multi_tab: MultiTabPolicy::new(settings.close_confirmation),
            skip_close_warnings: settings.skip_close_warnings,
            pending: None,
        }
    }

    /// Warn the user if closing needs their approval.
    ///
    /// Returns `OkToClose` when nothing needs asking; `on_resolved` is then
    /// dropped without being called. Returns `DoNotClose` when a prompt is
    /// showing; `on_resolved` runs once it is answered.
    ///
    /// # Panics
    ///
    /// If a previous request is still waiting for the user.
    pub fn request_close(
        &mut self,
        ctx: &mut CloseContext<'_>,
        on_resolved: PendingClose<T>,
    ) -> CloseDecision {
        assert!(
            self.pending.is_none(),
            "Close of window {} requested during a close warning; the warning should be modal",
            ctx.window
        );

        if self.skip_close_warnings {
            return CloseDecision::OkToClose;
        }

        if self.downloads.can_close(ctx) && self.multi_tab.can_close(ctx) {
            return CloseDecision::OkToClose;
        }

        self.pending = Some(on_resolved);
        CloseDecision::DoNotClose
    }

    /// Record the user's answer to `policy`'s prompt.
    ///
    /// Hands back the stored continuation together with the decision; the
    /// caller must run it. Declining cancels the whole attempt: every policy
    /// is reset so the next attempt asks again, and for downloads the
    /// downloads page opens.
    pub fn on_policy_response(
        &mut self,
        window: WindowId,
        policy: ClosePolicy,
        approved: bool,
        prompts: &dyn ClosePrompts,
    ) -> Result<(PendingClose<T>, CloseDecision)> {
        let no_prompt = move || Error::NoPendingPrompt { window, policy };

        if self.state(policy) != ConfirmationState::WaitingForResponse {
            return Err(no_prompt());
        }
        let callback = self.pending.take().ok_or_else(no_prompt)?;

        let decision = if approved {
            self.set_state(policy, ConfirmationState::ResponseReceived);
            CloseDecision::OkToClose
        } else {
            self.reset();
            if policy == ClosePolicy::Downloads {
                prompts.show_downloads(window);
            }
            CloseDecision::DoNotClose
        };

        tracing::debug!(
            "Window {} {} prompt answered: {:?}",
            window,
            policy,
            decision
        );
        Ok((callback, decision))
    }

    pub fn state(&self, policy: ClosePolicy) -> ConfirmationState {
        match policy {
            ClosePolicy::Downloads => self.downloads.state(),
            ClosePolicy::MultipleTabs => self.multi_tab.state(),
        }
    }

    fn set_state(&mut self, policy: ClosePolicy, state: ConfirmationState) {
        match policy {
            ClosePolicy::Downloads => self.downloads.set_state(state),
            ClosePolicy::MultipleTabs => self.multi_tab.set_state(state),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn skip_close_warnings(&self) -> bool {
        self.skip_close_warnings
    }

    pub fn set_skip_close_warnings(&mut self, skip: bool) {
        self.skip_close_warnings = skip;
    }

    /// Treat the download warning as answered for this attempt
    pub fn mark_downloads_confirmed(&mut self) {
        self.downloads
            .set_state(ConfirmationState::ResponseReceived);
    }

    /// Forget every answer so the next attempt starts clean
    pub fn reset(&mut self) {
        self.downloads.set_state(ConfirmationState::NotPrompted);
        self.multi_tab.set_state(ConfirmationState::NotPrompted);
    }
}

impl<T> fmt::Debug for CloseCoordinator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseCoordinator")
            .field("downloads", &self.downloads)
            .field("multi_tab", &self.multi_tab)
            .field("skip_close_warnings", &self.skip_close_warnings)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}
