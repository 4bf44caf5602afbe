use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Reference generation aborted after {0} failed attempts")]
    ReferenceGeneration(u32),
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

impl From<reqwest::Error> for DebitError {
    fn from(e: reqwest::Error) -> Self {
        DebitError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DebitError>;
