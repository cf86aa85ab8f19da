use thiserror::Error;

use crate::term::Loc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The bump allocator ran past the configured capacity. Nothing was allocated.
    #[error(
        "Heap exhausted: requested {requested} cells with {used} of {capacity} already in use."
    )]
    OutOfMemory {
        requested: u64,
        used: u64,
        capacity: u64,
    },

    /// Term payloads are 32 bits wide, so no address past this bound is representable.
    #[error("Heap capacity {capacity} exceeds the addressable maximum of {max} cells.")]
    CapacityTooLarge { capacity: u64, max: Loc },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse heap configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Heap(#[from] HeapError),
}
