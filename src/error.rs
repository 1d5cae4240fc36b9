use thiserror::Error;

/// Errors returned by keyed value access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Error {
    /// The tree holds no entry for the requested key.
    #[error("key not found")]
    KeyNotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
