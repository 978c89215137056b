pub mod close;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod profile;
pub mod services;
pub mod window;

#[cfg(test)]
mod test_support;

pub use close::{
    CloseCoordinator, CloseDecision, ClosePolicy, ConfirmationState, DownloadBlock,
    DownloadCloseType, MultiTabDecision,
};
pub use config::{CloseConfirmation, CloseSettings};
pub use error::{Error, Result};
pub use profile::{Profile, ProfileKind};
pub use window::{Tab, TabId, TabStrip, Window, WindowId};
