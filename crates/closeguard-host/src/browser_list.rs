use crate::journal::{Event, Journal};
use closeguard_core::services::{RegisteredWindow, WindowRegistry};
use closeguard_core::{Profile, WindowId};
use std::cell::RefCell;
use std::rc::Rc;

/// Open windows in creation order
#[derive(Debug)]
pub struct BrowserList {
    windows: RefCell<Vec<RegisteredWindow>>,
    journal: Rc<Journal>,
}

impl BrowserList {
    pub fn new(journal: Rc<Journal>) -> Self {
        Self {
            windows: RefCell::new(Vec::new()),
            journal,
        }
    }

    pub fn len(&self) -> usize {
        self.windows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.borrow().is_empty()
    }

    pub fn is_closing(&self, window: WindowId) -> bool {
        self.windows
            .borrow()
            .iter()
            .any(|entry| entry.id == window && entry.closing)
    }
}

impl WindowRegistry for BrowserList {
    fn register(&self, window: WindowId, profile: &Profile) {
        self.windows.borrow_mut().push(RegisteredWindow {
            id: window,
            profile: profile.clone(),
            closing: false,
        });
    }

    fn unregister(&self, window: WindowId) {
        self.windows.borrow_mut().retain(|entry| entry.id != window);
    }

    fn set_closing(&self, window: WindowId, closing: bool) {
        if let Some(entry) = self
            .windows
            .borrow_mut()
            .iter_mut()
            .find(|entry| entry.id == window)
        {
            entry.closing = closing;
        }
    }

    fn notify_close_started(&self, window: WindowId) {
        self.set_closing(window, true);
        self.journal.record(Event::CloseStarted { window });
    }

    fn windows(&self) -> Vec<RegisteredWindow> {
        self.windows.borrow().clone()
    }
}
