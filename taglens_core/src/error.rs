use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Tag name must not be empty")]
    EmptyTagName,

    #[error("Tag configured more than once: {0}")]
    DuplicateTag(String),

    #[error("Command name must not be empty")]
    EmptyCommandName,

    #[error("Command configured more than once: {0}")]
    DuplicateCommand(String),

    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}
