//! Cache implementation

use std::fmt::Write;
use std::ops::Range;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::line::Line;
use super::{ReplacementPolicy, WritePolicy};
use crate::error::{ConfigError, OutOfRangeError};
use crate::format::{bin_str, dec_str, dec_width, hex_bytes};

pub fn get_log_2(value: usize) -> usize {
    assert!(value > 0);
    (usize::BITS - 1 - value.leading_zeros()) as usize
}

pub fn is_pow_2(value: usize) -> bool {
    value != 0 && value & (value - 1) == 0
}

pub fn get_mask(bits: usize) -> usize {
    (1 << bits) - 1
}

/// Geometry and policies of a cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    pub cache_size: usize,
    pub memory_size: usize,
    pub block_size: usize,
    pub associativity: usize,

    pub replacement: ReplacementPolicy,
    pub write: WritePolicy,
}

impl Default for CacheConfig {
    /// 1 KiB, 4-way, 16-byte blocks in front of 64 KiB
    fn default() -> Self {
        Self::make(
            1024,
            64 * 1024,
            16,
            4,
            ReplacementPolicy::default(),
            WritePolicy::default(),
        )
    }
}

impl CacheConfig {
    pub fn make(
        cache_size: usize,
        memory_size: usize,
        block_size: usize,
        associativity: usize,
        replacement: ReplacementPolicy,
        write: WritePolicy,
    ) -> Self {
        Self {
            cache_size,
            memory_size,
            block_size,
            associativity,
            replacement,
            write,
        }
    }

    /// Number of lines in the cache
    pub fn line_num(&self) -> usize {
        self.cache_size / self.block_size
    }

    /// Number of sets in the cache
    pub fn set_num(&self) -> usize {
        self.line_num() / self.associativity
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("cache size", self.cache_size),
            ("memory size", self.memory_size),
            ("block size", self.block_size),
            ("associativity", self.associativity),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(ConfigError::ZeroSize(name));
            }
            if !is_pow_2(value) {
                return Err(ConfigError::NotPowerOfTwo { name, value });
            }
        }
        if self.block_size > self.cache_size {
            return Err(ConfigError::BlockLargerThanCache {
                block_size: self.block_size,
                cache_size: self.cache_size,
            });
        }
        if self.cache_size > self.memory_size {
            return Err(ConfigError::CacheLargerThanMemory {
                cache_size: self.cache_size,
                memory_size: self.memory_size,
            });
        }
        // Both are powers of two, so this also rejects associativity > lines
        if self.line_num() % self.associativity != 0 {
            return Err(ConfigError::AssociativityMismatch {
                associativity: self.associativity,
                lines: self.line_num(),
            });
        }
        Ok(())
    }
}

/// A dirty block pushed out of the cache.
/// The caller must write it back to memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eviction {
    pub address: usize,
    pub data: Vec<u8>,
}

/// Set-associative cache
#[derive(Clone, Debug)]
pub struct Cache {
    config: CacheConfig,

    // Constants
    offset_bits: usize,
    tag_shift: usize,
    index_mask: usize,

    lines: Vec<Line>,
    rng: StdRng,
}

// An address looks like this:
// | tag | set index | offset |
impl Cache {
    pub fn make(config: CacheConfig) -> Result<Self, ConfigError> {
        Self::make_seeded(config, StdRng::from_entropy())
    }

    /// Make a cache whose random replacement is reproducible
    pub fn with_seed(
        config: CacheConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::make_seeded(config, StdRng::seed_from_u64(seed))
    }

    fn make_seeded(
        config: CacheConfig,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let offset_bits = get_log_2(config.block_size);
        let tag_shift = get_log_2(config.cache_size / config.associativity);
        let index_mask = get_mask(tag_shift - offset_bits);

        Ok(Self {
            config,
            offset_bits,
            tag_shift,
            index_mask,
            lines: vec![Line::make(config.block_size); config.line_num()],
            rng,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn get_tag(&self, address: usize) -> usize {
        address >> self.tag_shift
    }

    pub fn get_index(&self, address: usize) -> usize {
        (address >> self.offset_bits) & self.index_mask
    }

    pub fn get_offset(&self, address: usize) -> usize {
        address & (self.config.block_size - 1)
    }

    /// Base address of the block held by line `i`
    pub fn get_physical_address(&self, i: usize) -> usize {
        let set_num = i / self.config.associativity;
        (self.lines[i].tag << self.tag_shift) | (set_num << self.offset_bits)
    }

    /// Line indices of the set that `address` maps to
    fn set_range(&self, address: usize) -> Range<usize> {
        let begin = self.get_index(address) * self.config.associativity;
        begin..begin + self.config.associativity
    }

    /// Return the line index holding `address`, if any
    pub fn lookup(&self, address: usize) -> Option<usize> {
        let tag = self.get_tag(address);
        let range = self.set_range(address);
        let begin = range.start;
        self.lines[range]
            .iter()
            .position(|line| line.holds(tag))
            .map(|way| begin + way)
    }

    pub fn is_in_cache(&self, address: usize) -> bool {
        self.lookup(address).is_some()
    }

    /// Read the block containing `address`.
    /// Returns None on a miss, which leaves the cache untouched.
    pub fn read(&mut self, address: usize) -> Option<&[u8]> {
        let i = self.lookup(address)?;
        self.touch(address, i);
        trace!("read hit {:#x} in line {}", address, i);
        Some(&self.lines[i].data)
    }

    /// Write one byte if the block containing `address` is resident.
    /// Returns whether it was a hit; a miss leaves the cache untouched.
    pub fn write(&mut self, address: usize, byte: u8) -> bool {
        let Some(i) = self.lookup(address) else {
            return false;
        };

        let offset = self.get_offset(address);
        let line = &mut self.lines[i];
        line.data[offset] = byte;
        // A write-through line always matches memory
        if self.config.write == WritePolicy::WriteBack {
            line.dirty = true;
        }
        self.touch(address, i);
        trace!("write hit {:#x} in line {}", address, i);
        true
    }

    /// Install `block` as the block containing `address`,
    /// evicting a line of its set.
    /// Returns the evicted block if it has to be written back.
    pub fn load(&mut self, address: usize, block: &[u8]) -> Option<Eviction> {
        assert_eq!(block.len(), self.config.block_size);

        let tag = self.get_tag(address);
        let range = self.set_range(address);
        let begin = range.start;
        let way = self
            .config
            .replacement
            .select_victim(&mut self.lines[range], &mut self.rng);
        let i = begin + way;

        // Capture before the tag is overwritten
        let eviction = if self.lines[i].dirty {
            let eviction = Eviction {
                address: self.get_physical_address(i),
                data: self.lines[i].data.clone(),
            };
            debug!(
                "evicting dirty line {} holding {:#x}",
                i, eviction.address
            );
            Some(eviction)
        } else {
            None
        };

        self.lines[i].fill(tag, block);
        debug!("loaded {:#x} into line {}", address, i);
        eviction
    }

    /// Credit a hit on line `i` to the replacement policy
    fn touch(&mut self, address: usize, i: usize) {
        let range = self.set_range(address);
        let way = i - range.start;
        self.config.replacement.on_hit(&mut self.lines[range], way);
    }

    /// Render lines `start..start + amount`
    pub fn dump(
        &self,
        start: usize,
        amount: usize,
    ) -> Result<String, OutOfRangeError> {
        let line_num = self.lines.len();
        let end = start
            .checked_add(amount)
            .filter(|end| *end <= line_num)
            .ok_or(OutOfRangeError::CacheLines {
                start,
                amount,
                lines: line_num,
            })?;

        let line_len = dec_width(line_num - 1);
        let use_len = self
            .lines
            .iter()
            .map(|line| dec_width(line.use_bits))
            .max()
            .unwrap_or(1);
        let config = &self.config;
        let tag_len = get_log_2(
            config.associativity * config.memory_size / config.cache_size,
        );
        let address_len = get_log_2(self.config.memory_size);

        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{}{} U M V T{}<DATA @ ADDRESS>",
            " ".repeat(line_len),
            " ".repeat(use_len),
            " ".repeat(tag_len)
        );
        for i in start..end {
            let line = &self.lines[i];
            let _ = writeln!(
                out,
                "{}: {} {} {} {} <{} @ {}>",
                dec_str(i, line_len),
                dec_str(line.use_bits, use_len),
                bin_str(line.dirty as usize, 1),
                bin_str(line.valid as usize, 1),
                bin_str(line.tag, tag_len),
                hex_bytes(&line.data),
                bin_str(self.get_physical_address(i), address_len)
            );
        }
        Ok(out)
    }
}
