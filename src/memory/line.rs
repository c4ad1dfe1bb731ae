//! A single cache line

/// One cache slot: a block of data plus its bookkeeping bits.
/// Lines are allocated once with the cache and overwritten in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub tag: usize,
    pub valid: bool,
    pub dirty: bool,

    /// Replacement bookkeeping; meaning depends on the policy.
    /// LRU/FIFO: stack position in [0, associativity], higher is newer.
    /// LFU: hit count since the line was filled.
    pub use_bits: usize,

    pub data: Vec<u8>,
}

impl Line {
    pub fn make(block_size: usize) -> Self {
        Self {
            tag: 0,
            valid: false,
            dirty: false,
            use_bits: 0,
            data: vec![0; block_size],
        }
    }

    /// Whether this line currently holds the block with `tag`
    pub fn holds(&self, tag: usize) -> bool {
        self.valid && self.tag == tag
    }

    /// Fill the line with a fresh block from memory
    pub fn fill(&mut self, tag: usize, block: &[u8]) {
        self.dirty = false;
        self.valid = true;
        self.tag = tag;
        self.data.copy_from_slice(block);
    }
}
