//! Flat main memory

use std::fmt::Write;
use std::ops::Range;

use rand::Rng;

use crate::error::OutOfRangeError;
use crate::format::{dec_str, dec_width, hex_bytes};

/// Main memory as a flat array of bytes,
/// transferred to and from the cache one block at a time
#[derive(Clone, Debug)]
pub struct Memory {
    size: usize,
    block_size: usize,
    data: Vec<u8>,
}

impl Memory {
    /// Make a memory filled with random bytes
    pub fn make(size: usize, block_size: usize, rng: &mut impl Rng) -> Self {
        let mut memory = Self::zeroed(size, block_size);
        rng.fill(memory.data.as_mut_slice());
        memory
    }

    /// Make a memory filled with zeros
    pub fn zeroed(size: usize, block_size: usize) -> Self {
        assert!(block_size > 0 && size % block_size == 0);
        Self {
            size,
            block_size,
            data: vec![0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn check_address(&self, address: usize) -> Result<(), OutOfRangeError> {
        if address >= self.size {
            return Err(OutOfRangeError::Address {
                address,
                size: self.size,
            });
        }
        Ok(())
    }

    /// Range of the aligned block containing `address`
    fn block_range(
        &self,
        address: usize,
    ) -> Result<Range<usize>, OutOfRangeError> {
        let start = address - (address % self.block_size);
        let end = start + self.block_size;
        if end > self.size {
            return Err(OutOfRangeError::Block {
                start,
                end,
                size: self.size,
            });
        }
        Ok(start..end)
    }

    /// Get the block that contains the byte at `address`
    pub fn get_block(&self, address: usize) -> Result<&[u8], OutOfRangeError> {
        let range = self.block_range(address)?;
        Ok(&self.data[range])
    }

    /// Overwrite the block that contains the byte at `address`
    pub fn set_block(
        &mut self,
        address: usize,
        block: &[u8],
    ) -> Result<(), OutOfRangeError> {
        let range = self.block_range(address)?;
        if block.len() != self.block_size {
            return Err(OutOfRangeError::BlockLength {
                expected: self.block_size,
                actual: block.len(),
            });
        }
        self.data[range].copy_from_slice(block);
        Ok(())
    }

    /// Render `amount` blocks starting from the block containing `start`
    pub fn dump(
        &self,
        start: usize,
        amount: usize,
    ) -> Result<String, OutOfRangeError> {
        let address_len = dec_width(self.size - 1);
        let begin = start - (start % self.block_size);
        let end = amount
            .checked_mul(self.block_size)
            .and_then(|bytes| bytes.checked_add(begin))
            .filter(|end| *end <= self.size)
            .ok_or(OutOfRangeError::MemoryBlocks {
                start,
                amount,
                size: self.size,
            })?;

        let mut out = String::new();
        for address in (begin..end).step_by(self.block_size) {
            let block = &self.data[address..address + self.block_size];
            // Writing into a String cannot fail
            let _ = writeln!(
                out,
                "{}: {}",
                dec_str(address, address_len),
                hex_bytes(block)
            );
        }
        Ok(out)
    }
}
