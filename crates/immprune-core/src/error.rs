use thiserror::Error;

/// Failure classes that abort a run. Every one of them is fatal.
#[derive(Debug, Error)]
pub enum ImmpruneError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unsupported platform: {0}")]
    Platform(String),

    #[error("`{0}` is not installed or not on PATH")]
    ToolNotInstalled(String),

    #[error("unable to read Photos library via macOS Automation (check Photos/Automation permissions): {0}")]
    AutomationDenied(String),

    #[error("invalid {source_name} response: {message}")]
    Parse {
        source_name: &'static str,
        message: String,
    },

    #[error("{0}")]
    InvalidInput(String),
}

impl ImmpruneError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True for errors raised before any fetch from bad user input.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
