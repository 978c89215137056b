use super::{CloseContext, ConfirmationState};
use crate::profile::{Profile, ProfileKind};
use crate::services::{Services, WindowCensus};
use crate::window::WindowId;
use serde::Serialize;

/// Why in-progress downloads would keep a window open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadCloseType {
    /// Closing is not blocked by downloads
    Ok,
    /// This is the last window; the browser would shut down and cancel
    /// every download
    BrowserShutdownWouldCancel,
    /// Last window of an incognito or guest profile that still has
    /// downloads; they die with the profile. The kind only changes the
    /// dialog copy.
    LastWindowForOffTheRecordProfile(ProfileKind),
}

/// Download check result plus how many downloads the close would cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadBlock {
    pub close_type: DownloadCloseType,
    pub blocking: usize,
}

impl DownloadBlock {
    pub const OK: DownloadBlock = DownloadBlock {
        close_type: DownloadCloseType::Ok,
        blocking: 0,
    };

    pub fn is_ok(&self) -> bool {
        self.close_type == DownloadCloseType::Ok
    }

    /// Classify a close from raw counts.
    ///
    /// `total` covers every profile; `profile_downloads` only the closing
    /// window's profile. `census` must already exclude the closing window.
    pub fn evaluate(
        total: usize,
        profile_downloads: usize,
        census: WindowCensus,
        kind: ProfileKind,
    ) -> Self {
        if total == 0 {
            return Self::OK;
        }

        if census.others == 0 {
            return DownloadBlock {
                close_type: DownloadCloseType::BrowserShutdownWouldCancel,
                blocking: total,
            };
        }

        if census.same_profile == 0 && profile_downloads > 0 && kind.is_off_the_record() {
            return DownloadBlock {
                close_type: DownloadCloseType::LastWindowForOffTheRecordProfile(kind),
                blocking: profile_downloads,
            };
        }

        Self::OK
    }

    /// Regular downloads keep going when the browser survives its last
    /// window, so they never hold a close. Off-the-record ones still die
    /// with their profile.
    pub fn survives_close(browser_outlives_windows: bool, kind: ProfileKind) -> bool {
        browser_outlives_windows && !kind.is_off_the_record()
    }

    /// Query the services for `window`. Has no side effects.
    pub fn for_window(window: WindowId, profile: &Profile, services: &Services) -> Self {
        // No profile manager means nothing owns downloads, so nothing blocks
        let Some(downloads) = services.downloads.as_ref() else {
            return Self::OK;
        };

        let total = downloads.total_in_progress();
        if total == 0 {
            return Self::OK;
        }

        let census = WindowCensus::take(services.registry.as_ref(), window, profile);
        Self::evaluate(
            total,
            downloads.in_progress_for_profile(profile),
            census,
            profile.kind(),
        )
    }
}

/// Prompts before a close would cancel downloads
#[derive(Debug, Default)]
pub struct DownloadBlockPolicy {
    state: ConfirmationState,
    browser_outlives_windows: bool,
}

impl DownloadBlockPolicy {
    pub fn new(browser_outlives_windows: bool) -> Self {
        Self {
            state: ConfirmationState::NotPrompted,
            browser_outlives_windows,
        }
    }

    pub fn state(&self) -> ConfirmationState {
        self.state
    }

    pub(super) fn set_state(&mut self, state: ConfirmationState) {
        self.state = state;
    }

    /// Returns `true` if downloads allow the close. Otherwise a dialog has
    /// been shown (or is still showing) and the answer arrives later.
    pub fn can_close(&mut self, ctx: &CloseContext<'_>) -> bool {
        if DownloadBlock::survives_close(self.browser_outlives_windows, ctx.profile.kind()) {
            return true;
        }

        if let Some(answer) = self.state.settled() {
            return answer;
        }

        let block = DownloadBlock::for_window(ctx.window, ctx.profile, ctx.services);
        if block.is_ok() {
            return true;
        }

        tracing::debug!(
            "Window {} close would cancel {} download(s): {:?}",
            ctx.window,
            block.blocking,
            block.close_type
        );
        self.state = ConfirmationState::WaitingForResponse;
        ctx.services
            .prompts
            .confirm_close_with_pending_downloads(ctx.window, block);
        false
    }
}
