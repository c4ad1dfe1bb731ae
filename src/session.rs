//! Driver that routes reads and writes through the cache to memory

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimConfig;
use crate::error::SimulatorResult;
use crate::memory::{Cache, CacheConfig, Eviction, Memory, WritePolicy};

/// Access counters of a session
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct CacheHistory {
    pub num_hit: u64,
    pub num_miss: u64,
    /// Dirty blocks written back to memory on eviction
    pub num_writeback: u64,
}

impl CacheHistory {
    /// Fraction of accesses that hit, 0 before any access
    pub fn get_hit_rate(&self) -> f64 {
        let total = self.num_hit + self.num_miss;
        if total == 0 {
            0.
        } else {
            self.num_hit as f64 / total as f64
        }
    }

    pub fn get_miss_rate(&self) -> f64 {
        let total = self.num_hit + self.num_miss;
        if total == 0 {
            0.
        } else {
            self.num_miss as f64 / total as f64
        }
    }
}

/// A cache in front of main memory, plus the counters of one run
#[derive(Debug)]
pub struct Session {
    pub memory: Memory,
    pub cache: Cache,
    pub history: CacheHistory,
    rng: StdRng,
}

impl Session {
    /// Build a session with random memory contents
    pub fn make(config: &SimConfig) -> SimulatorResult<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cache = Cache::with_seed(config.cache, rng.gen())?;
        let memory = Memory::make(
            config.cache.memory_size,
            config.cache.block_size,
            &mut rng,
        );
        Ok(Self::with_parts(memory, cache, rng))
    }

    /// Build a session over zeroed memory
    pub fn zeroed(config: CacheConfig, seed: u64) -> SimulatorResult<Self> {
        let cache = Cache::with_seed(config, seed)?;
        let memory = Memory::zeroed(config.memory_size, config.block_size);
        Ok(Self::with_parts(memory, cache, StdRng::seed_from_u64(seed)))
    }

    fn with_parts(memory: Memory, cache: Cache, rng: StdRng) -> Self {
        Self {
            memory,
            cache,
            history: CacheHistory::default(),
            rng,
        }
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.cache.config().write
    }

    /// Read one byte
    pub fn read(&mut self, address: usize) -> SimulatorResult<u8> {
        self.memory.check_address(address)?;
        let offset = self.cache.get_offset(address);

        if let Some(block) = self.cache.read(address) {
            self.history.num_hit += 1;
            return Ok(block[offset]);
        }

        self.history.num_miss += 1;
        debug!("read miss {:#x}", address);
        let byte = self.memory.get_block(address)?[offset];
        self.allocate(address)?;
        // The follow-up read credits the new line to the replacement policy
        let _ = self.cache.read(address);
        Ok(byte)
    }

    /// Write one byte
    pub fn write(&mut self, address: usize, byte: u8) -> SimulatorResult<()> {
        self.memory.check_address(address)?;
        let written = self.cache.write(address, byte);

        if written {
            self.history.num_hit += 1;
        } else {
            self.history.num_miss += 1;
            debug!("write miss {:#x}", address);
        }

        match self.write_policy() {
            WritePolicy::WriteThrough => {
                // No-write-allocate: memory is updated on hits and misses
                let offset = self.cache.get_offset(address);
                let mut block = self.memory.get_block(address)?.to_vec();
                block[offset] = byte;
                self.memory.set_block(address, &block)?;
            }
            WritePolicy::WriteBack => {
                if !written {
                    self.allocate(address)?;
                    self.cache.write(address, byte);
                }
            }
        }
        Ok(())
    }

    /// Read `amount` random bytes
    pub fn random_reads(&mut self, amount: usize) -> SimulatorResult<()> {
        for _ in 0..amount {
            let address = self.rng.gen_range(0..self.memory.size());
            self.read(address)?;
        }
        Ok(())
    }

    /// Write `amount` random bytes to random addresses
    pub fn random_writes(&mut self, amount: usize) -> SimulatorResult<()> {
        for _ in 0..amount {
            let address = self.rng.gen_range(0..self.memory.size());
            let byte = self.rng.gen();
            self.write(address, byte)?;
        }
        Ok(())
    }

    /// Bring the block containing `address` into the cache,
    /// writing back whatever dirty block it displaces.
    /// The new line gets no replacement credit here.
    fn allocate(&mut self, address: usize) -> SimulatorResult<()> {
        let block = self.memory.get_block(address)?;
        if let Some(eviction) = self.cache.load(address, block) {
            self.write_back(eviction)?;
        }
        Ok(())
    }

    fn write_back(&mut self, eviction: Eviction) -> SimulatorResult<()> {
        debug!("writing back {:#x}", eviction.address);
        self.memory.set_block(eviction.address, &eviction.data)?;
        self.history.num_writeback += 1;
        Ok(())
    }
}
