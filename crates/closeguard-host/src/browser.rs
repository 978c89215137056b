use crate::browser_list::BrowserList;
use crate::downloads::DownloadTracker;
use crate::journal::{Event, Journal};
use crate::unload::{ScriptedUnload, UnloadScript};
use crate::{Error, Result};
use closeguard_core::event_loop::{Task, TaskQueue, TaskRunner};
use closeguard_core::services::{DownloadService, Services, SessionService, TabRestoreService};
use closeguard_core::{CloseSettings, ClosePolicy, Profile, TabStrip, Window, WindowId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A single-threaded browser process: profiles, windows and the services
/// they report to. Every public operation drains the task queue before
/// returning, so callers always observe a settled state.
pub struct Browser {
    settings: CloseSettings,
    profile_manager: bool,
    profiles: BTreeMap<String, Rc<Profile>>,
    windows: BTreeMap<WindowId, Window>,
    unload_scripts: BTreeMap<WindowId, Rc<RefCell<UnloadScript>>>,
    registry: Rc<BrowserList>,
    downloads: Rc<DownloadTracker>,
    journal: Rc<Journal>,
    tasks: Rc<TaskQueue>,
    next_window_id: u32,
}

impl Browser {
    pub fn new(settings: CloseSettings) -> Self {
        let journal = Rc::new(Journal::new());
        Self {
            settings,
            profile_manager: true,
            profiles: BTreeMap::new(),
            windows: BTreeMap::new(),
            unload_scripts: BTreeMap::new(),
            registry: Rc::new(BrowserList::new(journal.clone())),
            downloads: Rc::new(DownloadTracker::new(journal.clone())),
            journal,
            tasks: Rc::new(TaskQueue::new()),
            next_window_id: 1,
        }
    }

    /// A host with no profile manager. Nothing tracks downloads, and the
    /// multi-tab confirmation is never shown.
    pub fn without_profile_manager(settings: CloseSettings) -> Self {
        Self {
            profile_manager: false,
            ..Self::new(settings)
        }
    }

    /// Register a profile, replacing any existing one of the same name
    pub fn add_profile(&mut self, profile: Profile) -> Rc<Profile> {
        let profile = Rc::new(profile);
        self.profiles
            .insert(profile.name().to_string(), profile.clone());
        profile
    }

    pub fn profile(&self, name: &str) -> Result<Rc<Profile>> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownProfile(name.to_string()))
    }

    pub fn open_window(&mut self, profile: &str, tabs: usize) -> Result<WindowId> {
        self.open_window_with_beforeunload(profile, tabs, false)
    }

    /// Open a window whose pages run beforeunload handlers when
    /// `has_beforeunload` is set
    pub fn open_window_with_beforeunload(
        &mut self,
        profile: &str,
        tabs: usize,
        has_beforeunload: bool,
    ) -> Result<WindowId> {
        let profile = self.profile(profile)?;
        let id = WindowId::new(self.next_window_id);
        self.next_window_id += 1;

        let urls = (1..=tabs).map(|i| format!("https://example.com/{}", i));
        let (unload, script) = ScriptedUnload::new(has_beforeunload);
        let services = self.services_for(&profile);
        let window = Window::new(
            id,
            profile.clone(),
            TabStrip::with_urls(urls),
            &self.settings,
            Box::new(unload),
            services,
        );

        self.journal.record(Event::WindowOpened {
            window: id,
            profile: profile.name().to_string(),
            tabs,
        });
        self.windows.insert(id, window);
        self.unload_scripts.insert(id, script);
        Ok(id)
    }

    fn services_for(&self, profile: &Profile) -> Services {
        // Off-the-record windows are neither saved nor restorable
        let persisted = !profile.is_off_the_record();
        Services {
            registry: self.registry.clone(),
            downloads: self
                .profile_manager
                .then(|| self.downloads.clone() as Rc<dyn DownloadService>),
            sessions: persisted.then(|| self.journal.clone() as Rc<dyn SessionService>),
            tab_restore: persisted.then(|| self.journal.clone() as Rc<dyn TabRestoreService>),
            prompts: self.journal.clone(),
            tasks: self.tasks.clone(),
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Result<&mut Window> {
        self.windows.get_mut(&id).ok_or(Error::UnknownWindow(id))
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Ask `id` to close, as if the user clicked its close button.
    ///
    /// # Panics
    ///
    /// If the window is still showing a close warning from an earlier request.
    pub fn request_close(&mut self, id: WindowId) -> Result<()> {
        tracing::debug!("Close requested for window {}", id);
        self.window_mut(id)?.on_window_closing();
        self.run_until_idle();
        Ok(())
    }

    /// The prompt `id` is showing, if any
    pub fn open_prompt(&self, id: WindowId) -> Option<ClosePolicy> {
        self.journal.open_prompt(id)
    }

    /// Answer the close prompt `id` is showing
    pub fn respond(&mut self, id: WindowId, approve: bool) -> Result<()> {
        let window = self.windows.get_mut(&id).ok_or(Error::UnknownWindow(id))?;
        // The dialog is dismissed before its answer is acted on, so a
        // follow-up prompt can open in its place
        let policy = self
            .journal
            .take_open_prompt(id)
            .ok_or(Error::NoOpenPrompt(id))?;
        tracing::debug!(
            "Window {} {} the {} prompt",
            id,
            if approve { "accepted" } else { "declined" },
            policy
        );
        if let Err(err) = window.on_policy_response(policy, approve) {
            // The coordinator rejected the answer; the dialog stays up
            self.journal.restore_open_prompt(id, policy);
            return Err(err.into());
        }

        self.run_until_idle();
        Ok(())
    }

    /// Answer the beforeunload dialog `id` is showing
    pub fn resolve_unload(&mut self, id: WindowId, proceed: bool) -> Result<()> {
        let script = self
            .unload_scripts
            .get(&id)
            .cloned()
            .ok_or(Error::UnknownWindow(id))?;
        if !script.borrow().is_awaiting_user() {
            return Err(Error::Scenario(format!(
                "Window {} is not running beforeunload handlers",
                id
            )));
        }

        let callback = script.borrow_mut().resolve(proceed);
        match callback {
            Some(mut on_close_confirmed) => on_close_confirmed(proceed),
            // The unload controller re-requests the close once handlers pass
            None if proceed => self.tasks.post(Task::CloseWindow(id)),
            None => {}
        }

        if let Some(window) = self.windows.get_mut(&id) {
            if proceed {
                window.sync_close_attempt();
            } else {
                window.on_unload_cancelled();
            }
        }
        self.run_until_idle();
        Ok(())
    }

    pub fn start_download(&self, profile: &str) -> Result<()> {
        self.profile(profile)?;
        self.downloads.start(profile);
        Ok(())
    }

    pub fn finish_download(&self, profile: &str) -> Result<()> {
        self.profile(profile)?;
        if !self.downloads.finish(profile) {
            tracing::warn!("Profile '{}' has no download in progress", profile);
        }
        Ok(())
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    pub fn registry(&self) -> &BrowserList {
        &self.registry
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn events(&self) -> Vec<Event> {
        self.journal.events()
    }

    /// Run posted tasks until the queue is empty
    pub fn run_until_idle(&mut self) {
        while let Some(task) = self.tasks.pop() {
            let Some(window) = self.windows.get_mut(&task.window()) else {
                tracing::debug!("Dropping {:?}: window already gone", task);
                continue;
            };
            match task {
                Task::CloseWindow(_) => window.on_window_closing(),
                Task::DeleteWindow(id) => {
                    // Dropping the window sends its final notifications
                    self.windows.remove(&id);
                    self.unload_scripts.remove(&id);
                    tracing::info!("Window {} destroyed", id);
                    self.journal.record(Event::WindowDestroyed { window: id });
                }
            }
        }
    }
}
