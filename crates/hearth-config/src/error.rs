use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(hearth_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(hearth_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Repository `{0}` is already registered")]
    #[diagnostic(
        code(hearth_config::duplicate_repository),
        help("Each repository URL can only be registered once")
    )]
    RepositoryAlreadyRegistered(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(hearth_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(hearth_config::filesystem))]
    FileSystem(#[from] hearth_utils::error::FileSystemError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
