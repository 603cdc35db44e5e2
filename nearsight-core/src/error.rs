use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid geometry or settings detected at startup. Never recovered per frame.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed distance sample (NaN, infinite or negative).
    #[error("Sensor read error: {0}")]
    SensorRead(String),

    /// A capability the session depends on is missing (e.g. no depth sensing).
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Failure reported by one of the component crates.
    #[error("Component error: {0}")]
    Component(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Configuration(format!("Invalid TOML: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
