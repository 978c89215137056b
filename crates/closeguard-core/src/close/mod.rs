//! Close warnings: the policies that may hold a window open and the
//! coordinator that folds them into one decision per close attempt.

mod coordinator;
mod downloads;
mod multi_tab;

pub use coordinator::{CloseContext, CloseCoordinator, PendingClose};
pub use downloads::{DownloadBlock, DownloadBlockPolicy, DownloadCloseType};
pub use multi_tab::{ConfirmationPrompt, MultiTabDecision, MultiTabPolicy, CLOSE_WINDOW_PROMPT};

use serde::Serialize;
use std::fmt;

/// Outcome of warning the user before a close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseDecision {
    OkToClose,
    DoNotClose,
}

impl CloseDecision {
    pub fn is_ok(self) -> bool {
        matches!(self, CloseDecision::OkToClose)
    }
}

/// The warnings a close attempt may have to get past, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosePolicy {
    Downloads,
    MultipleTabs,
}

impl fmt::Display for ClosePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClosePolicy::Downloads => f.write_str("download"),
            ClosePolicy::MultipleTabs => f.write_str("close confirmation"),
        }
    }
}

/// Where a policy stands within the current close attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationState {
    #[default]
    NotPrompted,
    WaitingForResponse,
    ResponseReceived,
}

impl ConfirmationState {
    /// Answer for a policy that has already prompted during this attempt,
    /// or `None` if it still has to evaluate.
    fn settled(self) -> Option<bool> {
        match self {
            ConfirmationState::NotPrompted => None,
            ConfirmationState::WaitingForResponse => Some(false),
            ConfirmationState::ResponseReceived => Some(true),
        }
    }
}
