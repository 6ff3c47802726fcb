
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecurrenceError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Decode error: {message}")]
    Decode { message: String },
    #[error("Encode error: {message}")]
    Encode { message: String },
    #[error("Unknown session: {0}")]
    UnknownSession(u64),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
