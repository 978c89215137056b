use closeguard_core::WindowId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Close(#[from] closeguard_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid scenario: {0}")]
    Scenario(String),

    #[error("Profile '{0}' not found")]
    UnknownProfile(String),

    #[error("Window {0} is not open")]
    UnknownWindow(WindowId),

    #[error("Window {0} is not showing a close prompt")]
    NoOpenPrompt(WindowId),
}

pub type Result<T> = std::result::Result<T, Error>;
