//! Scripted close flows.
//!
//! A scenario describes the profiles and windows a browser starts with and
//! a list of steps to play against it. Window names in steps refer to the
//! `name` given in `windows`.
//!
//! ```json
//! {
//!   "settings": { "close_confirmation": "last" },
//!   "profiles": [{ "name": "default", "downloads": 2 }],
//!   "windows": [{ "name": "main", "tabs": 3 }],
//!   "steps": [
//!     { "action": "close", "window": "main" },
//!     { "action": "respond", "window": "main", "approve": true }
//!   ]
//! }
//! ```

use crate::browser::Browser;
use crate::journal::Event;
use crate::{Error, Result};
use closeguard_core::{CloseSettings, ClosePolicy, Profile, ProfileKind, WindowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Profile every window uses unless it names another
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub settings: CloseSettings,

    #[serde(default = "default_profile_manager")]
    pub profile_manager: bool,

    #[serde(default)]
    pub profiles: Vec<ProfileSpec>,

    pub windows: Vec<WindowSpec>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_profile_manager() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSpec {
    pub name: String,

    #[serde(default)]
    pub kind: ProfileKind,

    /// Downloads already in progress when the scenario starts
    #[serde(default)]
    pub downloads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowSpec {
    pub name: String,

    #[serde(default = "default_profile_name")]
    pub profile: String,

    #[serde(default = "default_tabs")]
    pub tabs: usize,

    /// Pages in the window run beforeunload handlers
    #[serde(default)]
    pub beforeunload: bool,
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_tabs() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Close { window: String },
    Respond { window: String, approve: bool },
    ResolveUnload { window: String, proceed: bool },
    StartDownload { profile: String },
    FinishDownload { profile: String },
    SkipCloseWarnings { window: String },
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Final state of a scenario run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub events: Vec<Event>,
    pub windows: Vec<WindowSummary>,
}

impl Report {
    /// Names of windows that survived the scenario
    pub fn open_windows(&self) -> Vec<&str> {
        self.windows
            .iter()
            .filter(|window| window.open)
            .map(|window| window.name.as_str())
            .collect()
    }

    pub fn prompts_shown(&self) -> usize {
        self.events.iter().filter(|event| event.is_prompt()).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub name: String,
    pub id: WindowId,
    pub open: bool,
    pub tabs: usize,
    pub prompt: Option<ClosePolicy>,
}

/// Build the browser a scenario describes and play its steps
pub fn run_scenario(scenario: &Scenario) -> Result<Report> {
    let mut browser = if scenario.profile_manager {
        Browser::new(scenario.settings.clone())
    } else {
        Browser::without_profile_manager(scenario.settings.clone())
    };

    if scenario.profiles.is_empty() {
        browser.add_profile(Profile::regular(DEFAULT_PROFILE));
    }
    for spec in &scenario.profiles {
        browser.add_profile(Profile::new(spec.name.clone(), spec.kind));
        for _ in 0..spec.downloads {
            browser.start_download(&spec.name)?;
        }
    }

    let mut names: Vec<(String, WindowId)> = Vec::new();
    let mut ids: BTreeMap<String, WindowId> = BTreeMap::new();
    for spec in &scenario.windows {
        if ids.contains_key(&spec.name) {
            return Err(Error::Scenario(format!(
                "Window name '{}' is used more than once",
                spec.name
            )));
        }
        let id = browser.open_window_with_beforeunload(&spec.profile, spec.tabs, spec.beforeunload)?;
        ids.insert(spec.name.clone(), id);
        names.push((spec.name.clone(), id));
    }

    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!("Step {}: {:?}", index + 1, step);
        play(&mut browser, &ids, step)
            .map_err(|err| step_error(index, err))?;
    }

    let windows = names
        .into_iter()
        .map(|(name, id)| {
            let window = browser.window(id);
            WindowSummary {
                name,
                id,
                open: window.is_some(),
                tabs: window.map(|window| window.tabs().count()).unwrap_or(0),
                prompt: browser.open_prompt(id),
            }
        })
        .collect();

    Ok(Report {
        events: browser.events(),
        windows,
    })
}

fn step_error(index: usize, err: Error) -> Error {
    Error::Scenario(format!("step {} failed: {}", index + 1, err))
}

fn play(browser: &mut Browser, ids: &BTreeMap<String, WindowId>, step: &Step) -> Result<()> {
    match step {
        Step::Close { window } => {
            let id = lookup(ids, window)?;
            let pending = browser
                .window(id)
                .map(|window| window.has_pending_close_warning())
                .ok_or(Error::UnknownWindow(id))?;
            if pending {
                return Err(Error::Scenario(format!(
                    "window '{}' is still waiting for an answer to its close warning",
                    window
                )));
            }
            browser.request_close(id)
        }
        Step::Respond { window, approve } => browser.respond(lookup(ids, window)?, *approve),
        Step::ResolveUnload { window, proceed } => {
            browser.resolve_unload(lookup(ids, window)?, *proceed)
        }
        Step::StartDownload { profile } => browser.start_download(profile),
        Step::FinishDownload { profile } => browser.finish_download(profile),
        Step::SkipCloseWarnings { window } => {
            let id = lookup(ids, window)?;
            browser.window_mut(id)?.set_skip_close_warnings(true);
            Ok(())
        }
    }
}

fn lookup(ids: &BTreeMap<String, WindowId>, name: &str) -> Result<WindowId> {
    ids.get(name)
        .copied()
        .ok_or_else(|| Error::Scenario(format!("no window named '{}'", name)))
}
