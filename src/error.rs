use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("dictionary error: {0}")]
    Dictionary(#[from] vibrato::errors::VibratoError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("word count {0} is too large to store")]
    CountOverflow(u64),
    #[error("malformed subtitle at line {line}: {message}")]
    Subtitle { line : usize, message : String },
}

impl Error {
    pub(crate) fn subtitle(line : usize, message : impl Into<String>) -> Error
    {
        Error::Subtitle { line, message : message.into() }
    }
}
