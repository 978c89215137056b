use super::{CloseContext, ConfirmationState};
use crate::config::CloseConfirmation;
use crate::services::WindowCensus;
use serde::Serialize;

/// Text of the yes/no question shown before closing a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub message: &'static str,
    pub accept_label: &'static str,
    pub cancel_label: &'static str,
}

pub const CLOSE_WINDOW_PROMPT: ConfirmationPrompt = ConfirmationPrompt {
    message: "Do you want to close this window?",
    accept_label: "Close",
    cancel_label: "Cancel",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiTabDecision {
    Ok,
    NeedsPrompt,
}

impl MultiTabDecision {
    /// Decide from the switch mode, the number of other open windows and
    /// the closing window's tab count.
    pub fn evaluate(mode: CloseConfirmation, other_windows: usize, tab_count: usize) -> Self {
        let ok = match mode {
            CloseConfirmation::Disabled => true,
            CloseConfirmation::LastWindow => other_windows >= 1 || tab_count <= 1,
            CloseConfirmation::OtherWindowsOpen => other_windows == 0,
        };

        if ok {
            MultiTabDecision::Ok
        } else {
            MultiTabDecision::NeedsPrompt
        }
    }
}

/// Asks before closing a window, as configured by `close-confirmation`
#[derive(Debug, Default)]
pub struct MultiTabPolicy {
    mode: CloseConfirmation,
    state: ConfirmationState,
}

impl MultiTabPolicy {
    pub fn new(mode: CloseConfirmation) -> Self {
        Self {
            mode,
            state: ConfirmationState::NotPrompted,
        }
    }

    pub fn state(&self) -> ConfirmationState {
        self.state
    }

    pub(super) fn set_state(&mut self, state: ConfirmationState) {
        self.state = state;
    }

    /// Returns `true` if the window may close without asking. Otherwise the
    /// question has been shown (or is still showing).
    pub fn can_close(&mut self, ctx: &mut CloseContext<'_>) -> bool {
        if !self.mode.is_enabled() {
            return true;
        }

        if let Some(answer) = self.state.settled() {
            return answer;
        }

        if !ctx.services.has_profile_manager() {
            return true;
        }

        let census = WindowCensus::take(ctx.services.registry.as_ref(), ctx.window, ctx.profile);
        if MultiTabDecision::evaluate(self.mode, census.others, ctx.tabs.count())
            == MultiTabDecision::Ok
        {
            return true;
        }

        // A window left with no content after a cancel would be unusable
        if ctx.tabs.is_empty() {
            let tab = ctx.tabs.add_placeholder();
            tracing::debug!("Added placeholder tab {} to window {}", tab, ctx.window);
        }

        tracing::debug!(
            "Asking before closing window {} ({} other window(s) open)",
            ctx.window,
            census.others
        );
        self.state = ConfirmationState::WaitingForResponse;
        ctx.services.prompts.confirm_close(ctx.window, &CLOSE_WINDOW_PROMPT);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_never_prompts() {
        for others in 0..3 {
            for tabs in 0..3 {
                assert_eq!(
                    MultiTabDecision::evaluate(CloseConfirmation::Disabled, others, tabs),
                    MultiTabDecision::Ok
                );
            }
        }
    }

    #[test]
    fn test_last_mode_prompts_only_for_last_window_with_several_tabs() {
        let mode = CloseConfirmation::LastWindow;
        assert_eq!(MultiTabDecision::evaluate(mode, 0, 2), MultiTabDecision::NeedsPrompt);
        assert_eq!(MultiTabDecision::evaluate(mode, 0, 1), MultiTabDecision::Ok);
        assert_eq!(MultiTabDecision::evaluate(mode, 0, 0), MultiTabDecision::Ok);
        assert_eq!(MultiTabDecision::evaluate(mode, 1, 5), MultiTabDecision::Ok);
    }

    #[test]
    fn test_other_windows_mode_prompts_while_other_windows_exist() {
        let mode = CloseConfirmation::OtherWindowsOpen;
        assert_eq!(MultiTabDecision::evaluate(mode, 0, 4), MultiTabDecision::Ok);
        assert_eq!(MultiTabDecision::evaluate(mode, 1, 1), MultiTabDecision::NeedsPrompt);
        assert_eq!(MultiTabDecision::evaluate(mode, 2, 0), MultiTabDecision::NeedsPrompt);
    }

    #[test]
    fn test_prompt_copy() {
        assert_eq!(CLOSE_WINDOW_PROMPT.message, "Do you want to close this window?");
        assert_eq!(CLOSE_WINDOW_PROMPT.accept_label, "Close");
    }
}
