use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures talking to the marketplace API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status.
    ///
    /// `message` carries the human-readable `message` field of the error
    /// body when the server sent one.
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("no credential available for authenticated request")]
    Unauthenticated,
}

impl ApiError {
    /// Human-readable message supplied by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Edit-session misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no listing is open for editing")]
    NotOpen,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("listing not found: {0}")]
    ListingNotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Message the server attached to a rejected request.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api(api) => api.server_message(),
            _ => None,
        }
    }

    /// Text to show the user: the server's message when present, otherwise
    /// `fallback`.
    #[must_use]
    pub fn display_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Api(ApiError::Transport(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
