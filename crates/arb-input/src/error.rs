use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("binding profile parse error: {0}")]
    Parse(String),

    #[error("role {0:?} bound twice in one profile")]
    DuplicateRole(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type InputResult<T> = Result<T, InputError>;
