//! In-memory collaborators for unit tests. Every call worth asserting on is
//! appended to one shared log so tests can check ordering across services.

use crate::close::{ConfirmationPrompt, DownloadBlock};
use crate::event_loop::TaskQueue;
use crate::profile::Profile;
use crate::services::{
    ClosePrompts, DownloadService, RegisteredWindow, Services, SessionService,
    TabRestoreService, UnloadController, WindowRegistry,
};
use crate::window::{Tab, WindowId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct FakeBrowser {
    windows: RefCell<Vec<RegisteredWindow>>,
    downloads: RefCell<HashMap<String, usize>>,
    log: RefCell<Vec<String>>,
}

impl FakeBrowser {
    pub fn set_downloads(&self, profile: &Profile, count: usize) {
        self.downloads
            .borrow_mut()
            .insert(profile.name().to_string(), count);
    }

    pub fn is_closing(&self, window: WindowId) -> bool {
        self.windows
            .borrow()
            .iter()
            .any(|entry| entry.id == window && entry.closing)
    }

    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|entry| entry.contains("_prompt:"))
            .collect()
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl WindowRegistry for FakeBrowser {
    fn register(&self, window: WindowId, profile: &Profile) {
        self.windows.borrow_mut().push(RegisteredWindow {
            id: window,
            profile: profile.clone(),
            closing: false,
        });
    }

    fn unregister(&self, window: WindowId) {
        self.windows.borrow_mut().retain(|entry| entry.id != window);
        self.record(format!("unregister:{}", window));
    }

    fn set_closing(&self, window: WindowId, closing: bool) {
        for entry in self.windows.borrow_mut().iter_mut() {
            if entry.id == window {
                entry.closing = closing;
            }
        }
    }

    fn notify_close_started(&self, window: WindowId) {
        self.record(format!("close_started:{}", window));
    }

    fn windows(&self) -> Vec<RegisteredWindow> {
        self.windows.borrow().clone()
    }
}

impl DownloadService for FakeBrowser {
    fn total_in_progress(&self) -> usize {
        self.downloads.borrow().values().sum()
    }

    fn in_progress_for_profile(&self, profile: &Profile) -> usize {
        self.downloads
            .borrow()
            .get(profile.name())
            .copied()
            .unwrap_or(0)
    }

    fn cancel_all(&self) {
        self.downloads.borrow_mut().clear();
        self.record("cancel_all".to_string());
    }
}

impl SessionService for FakeBrowser {
    fn window_closing(&self, window: WindowId) {
        self.record(format!("window_closing:{}", window));
    }

    fn window_closed(&self, window: WindowId) {
        self.record(format!("window_closed:{}", window));
    }
}

impl TabRestoreService for FakeBrowser {
    fn browser_closing(&self, window: WindowId, tabs: &[Tab]) {
        self.record(format!("browser_closing:{}:{}", window, tabs.len()));
    }

    fn browser_closed(&self, window: WindowId) {
        self.record(format!("browser_closed:{}", window));
    }
}

impl ClosePrompts for FakeBrowser {
    fn confirm_close_with_pending_downloads(&self, window: WindowId, block: DownloadBlock) {
        self.record(format!("downloads_prompt:{}:{}", window, block.blocking));
    }

    fn confirm_close(&self, window: WindowId, _prompt: &ConfirmationPrompt) {
        self.record(format!("confirm_prompt:{}", window));
    }

    fn show_downloads(&self, window: WindowId) {
        self.record(format!("show_downloads:{}", window));
    }
}

pub fn services(fake: &Rc<FakeBrowser>, tasks: &Rc<TaskQueue>) -> Services {
    Services {
        registry: fake.clone(),
        downloads: Some(fake.clone()),
        sessions: Some(fake.clone()),
        tab_restore: Some(fake.clone()),
        prompts: fake.clone(),
        tasks: tasks.clone(),
    }
}

/// Services of a host running without a profile manager
pub fn bare_services(fake: &Rc<FakeBrowser>, tasks: &Rc<TaskQueue>) -> Services {
    Services {
        downloads: None,
        ..services(fake, tasks)
    }
}

/// Unload controller whose handlers block while `blocks` is set
#[derive(Debug, Default)]
pub struct FakeUnload {
    pub blocks: Rc<Cell<bool>>,
    attempting: bool,
}

impl UnloadController for FakeUnload {
    fn should_close_window(&mut self) -> bool {
        if self.blocks.get() {
            self.attempting = true;
            return false;
        }
        true
    }

    fn try_to_close_window(
        &mut self,
        skip_beforeunload: bool,
        _on_close_confirmed: Box<dyn FnMut(bool)>,
    ) -> bool {
        if skip_beforeunload || !self.blocks.get() {
            return false;
        }
        self.attempting = true;
        true
    }

    fn reset_try_to_close_window(&mut self) {
        self.attempting = false;
    }

    fn cancel_window_close(&mut self) {
        self.attempting = false;
    }

    fn is_attempting_to_close(&self) -> bool {
        self.attempting
    }
}
