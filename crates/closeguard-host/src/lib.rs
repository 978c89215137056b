mod browser;
mod browser_list;
mod downloads;
mod error;
mod journal;
pub mod scenario;
mod unload;

pub use browser::Browser;
pub use browser_list::BrowserList;
pub use downloads::DownloadTracker;
pub use error::{Error, Result};
pub use journal::{Event, Journal};
pub use scenario::{Report, Scenario, run_scenario};
pub use unload::{ScriptedUnload, UnloadScript};
