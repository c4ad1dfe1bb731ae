use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Out of bounds: {0}")]
    OutOfRange(#[from] OutOfRangeError),

    #[error("Bad command: {0}")]
    Command(#[from] CommandError),

    #[error("Failed to parse trace file '{0}': {1}")]
    TraceParse(PathBuf, String),

    #[error("Usage: {0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building a cache or memory.
/// These are fatal: nothing is constructed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be nonzero")]
    ZeroSize(&'static str),

    #[error("{name} must be a power of two, got {value}")]
    NotPowerOfTwo { name: &'static str, value: usize },

    #[error(
        "associativity {associativity} does not divide {lines} cache lines"
    )]
    AssociativityMismatch { associativity: usize, lines: usize },

    #[error("block size {block_size} exceeds cache size {cache_size}")]
    BlockLargerThanCache { block_size: usize, cache_size: usize },

    #[error("cache size {cache_size} exceeds memory size {memory_size}")]
    CacheLargerThanMemory { cache_size: usize, memory_size: usize },
}

/// Errors for requests outside the configured memory or cache.
/// Returned before any state is touched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OutOfRangeError {
    #[error("address {address:#x} is outside memory of {size} bytes")]
    Address { address: usize, size: usize },

    #[error("block [{start:#x}, {end:#x}) is outside memory of {size} bytes")]
    Block { start: usize, end: usize, size: usize },

    #[error("lines {start}..{start}+{amount} exceed {lines} cache lines")]
    CacheLines {
        start: usize,
        amount: usize,
        lines: usize,
    },

    #[error("{amount} blocks from {start:#x} exceed memory of {size} bytes")]
    MemoryBlocks {
        start: usize,
        amount: usize,
        size: usize,
    },

    #[error("block of {actual} bytes does not match block size {expected}")]
    BlockLength { expected: usize, actual: usize },

    #[error("no power-of-two memory can hold address {address:#x}")]
    AddressSpace { address: usize },
}

/// Errors from parsing an interactive command
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid command: {0}")]
    Invalid(String),

    #[error("incorrect syntax: {0}")]
    Syntax(String),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
