use crate::close::ClosePolicy;
use crate::window::WindowId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Window {window} has no {policy} prompt awaiting a response")]
    NoPendingPrompt {
        window: WindowId,
        policy: ClosePolicy,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
