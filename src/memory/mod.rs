//! Memory structure: a flat main memory fronted by one set-associative cache

pub mod cache;
pub mod line;
pub mod policy;
pub mod ram;

pub use cache::{Cache, CacheConfig, Eviction};
pub use line::Line;
pub use ram::Memory;

/// Which line of a full set gives way to an incoming block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// Least recently used, tracked with per-line stack counters
    #[default]
    Lru,
    /// Least frequently used, tracked with per-line hit counters
    Lfu,
    /// First in, first out, by insertion time
    Fifo,
    /// Uniformly random line in the set
    Random,
}

/// Reference:
/// <https://inst.eecs.berkeley.edu/~cs61c/su20/pdfs/lectures/lec15.pdf>
///
/// Write-back always pairs with write-allocate,
/// write-through always pairs with no-write-allocate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WritePolicy {
    #[default]
    WriteBack,
    WriteThrough,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    Read,
    Write,
}
