use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoopError {
    #[error("Dependency not wired: {0}")]
    MissingDependency(&'static str),

    #[error("Player path rejected mutation: {0}")]
    PathMutation(String),

    #[error("Action index out of range: {0}")]
    InvalidIndex(usize),

    #[error("Action cannot be removed from the queue: {0}")]
    NotRemovable(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoopError>;
