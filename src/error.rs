use thiserror::Error as ThisError;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures reported by map operations. A failing call leaves the map unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ThisError)]
pub enum Error {
    /// The key is not in the map.
    #[error("key not found")]
    KeyNotFound,

    /// `insert` was called with a key that is already in the map.
    #[error("key is already present")]
    DuplicateKey,
}
