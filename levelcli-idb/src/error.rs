use thiserror::Error;

/// A key that does not follow the IndexedDB encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("malformed IndexedDB key: {0}")]
    MalformedKey(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
