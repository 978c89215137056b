//! Close-behaviour settings.
//!
//! The multi-tab confirmation is driven by a single browser switch,
//! `--close-confirmation`, whose presence and value select the mode:
//!
//! - absent: never ask
//! - `last`: ask only when closing the last window and it holds several tabs
//! - anything else (including an empty value): ask unless no other window is open

use serde::Deserialize;

/// Mode selected by the `close-confirmation` switch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum CloseConfirmation {
    #[default]
    Disabled,
    LastWindow,
    OtherWindowsOpen,
}

impl CloseConfirmation {
    /// Name of the browser switch carrying this setting
    pub const SWITCH: &'static str = "close-confirmation";

    /// Interpret the switch value; `None` means the switch was not given
    pub fn from_switch(value: Option<&str>) -> Self {
        match value {
            None => CloseConfirmation::Disabled,
            Some("last") => CloseConfirmation::LastWindow,
            Some(_) => CloseConfirmation::OtherWindowsOpen,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, CloseConfirmation::Disabled)
    }
}

impl From<Option<String>> for CloseConfirmation {
    fn from(value: Option<String>) -> Self {
        Self::from_switch(value.as_deref())
    }
}

/// Settings every window's close logic consults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CloseSettings {
    /// Multi-tab confirmation mode
    pub close_confirmation: CloseConfirmation,

    /// Skip every close warning (forced shutdown)
    pub skip_close_warnings: bool,

    /// The browser process keeps running with no windows open, so
    /// regular-profile downloads survive their window (macOS behaviour)
    pub browser_outlives_windows: bool,
}

impl CloseSettings {
    pub fn with_close_confirmation(mut self, mode: CloseConfirmation) -> Self {
        self.close_confirmation = mode;
        self
    }

    pub fn with_skip_close_warnings(mut self, skip: bool) -> Self {
        self.skip_close_warnings = skip;
        self
    }

    pub fn with_browser_outlives_windows(mut self, outlives: bool) -> Self {
        self.browser_outlives_windows = outlives;
        self
    }
}
