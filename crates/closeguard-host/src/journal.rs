use closeguard_core::close::{ConfirmationPrompt, DownloadCloseType};
use closeguard_core::services::{ClosePrompts, SessionService, TabRestoreService};
use closeguard_core::{ClosePolicy, DownloadBlock, Tab, WindowId};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

/// Something the browser did that a user or a service would notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    WindowOpened {
        window: WindowId,
        profile: String,
        tabs: usize,
    },
    DownloadWarningShown {
        window: WindowId,
        block: DownloadBlock,
    },
    CloseConfirmationShown {
        window: WindowId,
        message: String,
    },
    DownloadsPageShown {
        window: WindowId,
    },
    SessionWindowClosing {
        window: WindowId,
    },
    SessionWindowClosed {
        window: WindowId,
    },
    TabRestoreBrowserClosing {
        window: WindowId,
        tabs: usize,
    },
    TabRestoreBrowserClosed {
        window: WindowId,
    },
    CloseStarted {
        window: WindowId,
    },
    DownloadsCancelled {
        count: usize,
    },
    WindowDestroyed {
        window: WindowId,
    },
}

impl Event {
    pub fn is_prompt(&self) -> bool {
        matches!(
            self,
            Event::DownloadWarningShown { .. } | Event::CloseConfirmationShown { .. }
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::WindowOpened {
                window,
                profile,
                tabs,
            } => write!(
                f,
                "window {} opened for profile '{}' with {} tab(s)",
                window, profile, tabs
            ),
            Event::DownloadWarningShown { window, block } => {
                let reason = match block.close_type {
                    DownloadCloseType::Ok => "nothing".to_string(),
                    DownloadCloseType::BrowserShutdownWouldCancel => {
                        "browser shutdown".to_string()
                    }
                    DownloadCloseType::LastWindowForOffTheRecordProfile(kind) => {
                        format!("last {} window", kind)
                    }
                };
                write!(
                    f,
                    "window {} asks to cancel {} download(s) ({})",
                    window, block.blocking, reason
                )
            }
            Event::CloseConfirmationShown { window, message } => {
                write!(f, "window {} asks \"{}\"", window, message)
            }
            Event::DownloadsPageShown { window } => {
                write!(f, "window {} shows the downloads page", window)
            }
            Event::SessionWindowClosing { window } => {
                write!(f, "session service: window {} closing", window)
            }
            Event::SessionWindowClosed { window } => {
                write!(f, "session service: window {} closed", window)
            }
            Event::TabRestoreBrowserClosing { window, tabs } => write!(
                f,
                "tab restore: window {} closing with {} tab(s)",
                window, tabs
            ),
            Event::TabRestoreBrowserClosed { window } => {
                write!(f, "tab restore: window {} closed", window)
            }
            Event::CloseStarted { window } => write!(f, "window {} close started", window),
            Event::DownloadsCancelled { count } => write!(f, "{} download(s) cancelled", count),
            Event::WindowDestroyed { window } => write!(f, "window {} destroyed", window),
        }
    }
}

/// Records what the browser shows and tells its services, and stands in
/// for the session, tab-restore and prompt surfaces.
#[derive(Debug, Default)]
pub struct Journal {
    events: RefCell<Vec<Event>>,
    open_prompts: RefCell<BTreeMap<WindowId, ClosePolicy>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: Event) {
        tracing::debug!("{}", event);
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Prompts shown so far, across all windows
    pub fn prompts_shown(&self) -> usize {
        self.events.borrow().iter().filter(|e| e.is_prompt()).count()
    }

    /// Which prompt `window` is currently showing
    pub fn open_prompt(&self, window: WindowId) -> Option<ClosePolicy> {
        self.open_prompts.borrow().get(&window).copied()
    }

    /// Dismiss the prompt `window` is showing, returning which one it was
    pub fn take_open_prompt(&self, window: WindowId) -> Option<ClosePolicy> {
        self.open_prompts.borrow_mut().remove(&window)
    }

    /// Put back a prompt whose answer was rejected
    pub fn restore_open_prompt(&self, window: WindowId, policy: ClosePolicy) {
        self.open_prompts.borrow_mut().insert(window, policy);
    }

    fn open(&self, window: WindowId, policy: ClosePolicy) {
        if let Some(previous) = self.open_prompts.borrow_mut().insert(window, policy) {
            tracing::warn!(
                "Window {} showed a {} prompt over an open {} prompt",
                window,
                policy,
                previous
            );
        }
    }
}

impl SessionService for Journal {
    fn window_closing(&self, window: WindowId) {
        self.record(Event::SessionWindowClosing { window });
    }

    fn window_closed(&self, window: WindowId) {
        self.record(Event::SessionWindowClosed { window });
    }
}

impl TabRestoreService for Journal {
    fn browser_closing(&self, window: WindowId, tabs: &[Tab]) {
        self.record(Event::TabRestoreBrowserClosing {
            window,
            tabs: tabs.len(),
        });
    }

    fn browser_closed(&self, window: WindowId) {
        self.record(Event::TabRestoreBrowserClosed { window });
    }
}

impl ClosePrompts for Journal {
    fn confirm_close_with_pending_downloads(&self, window: WindowId, block: DownloadBlock) {
        self.open(window, ClosePolicy::Downloads);
        self.record(Event::DownloadWarningShown { window, block });
    }

    fn confirm_close(&self, window: WindowId, prompt: &ConfirmationPrompt) {
        self.open(window, ClosePolicy::MultipleTabs);
        self.record(Event::CloseConfirmationShown {
            window,
            message: prompt.message.to_string(),
        });
    }

    fn show_downloads(&self, window: WindowId) {
        self.record(Event::DownloadsPageShown { window });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use closeguard_core::close::CLOSE_WINDOW_PROMPT;

    #[test]
    fn test_prompts_track_open_dialog() {
        let journal = Journal::new();
        let window = WindowId::new(1);

        journal.confirm_close(window, &CLOSE_WINDOW_PROMPT);
        assert_eq!(journal.open_prompt(window), Some(ClosePolicy::MultipleTabs));
        assert_eq!(journal.prompts_shown(), 1);

        assert_eq!(journal.take_open_prompt(window), Some(ClosePolicy::MultipleTabs));
        assert_eq!(journal.open_prompt(window), None);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = Event::DownloadWarningShown {
            window: WindowId::new(2),
            block: DownloadBlock {
                close_type: DownloadCloseType::BrowserShutdownWouldCancel,
                blocking: 3,
            },
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "download_warning_shown");
        assert_eq!(json["window"], 2);
        assert_eq!(json["block"]["blocking"], 3);
        assert_eq!(json["block"]["close_type"], "browser_shutdown_would_cancel");
    }

    #[test]
    fn test_event_display() {
        let event = Event::CloseConfirmationShown {
            window: WindowId::new(4),
            message: CLOSE_WINDOW_PROMPT.message.to_string(),
        };
        assert_eq!(
            event.to_string(),
            "window 4 asks \"Do you want to close this window?\""
        );
    }
}
