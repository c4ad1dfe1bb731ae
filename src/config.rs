//! Command line configuration

use std::str::FromStr;

use crate::error::{SimulatorError, SimulatorResult};
use crate::memory::{CacheConfig, ReplacementPolicy, WritePolicy};

pub const USAGE: &str =
    "sim MEMORY CACHE BLOCK MAPPING REPLACE WRITE [-v] [-s SEED]\n\
     \n\
     MEMORY   size of main memory in 2^N bytes\n\
     CACHE    size of the cache in 2^N bytes\n\
     BLOCK    size of a block in 2^N bytes\n\
     MAPPING  associativity in 2^N ways\n\
     REPLACE  replacement policy {LRU, LFU, FIFO, RAND}\n\
     WRITE    write policy {WB, WT}\n\
     -v       log misses, evictions and writebacks\n\
     -s SEED  seed memory contents and random choices";

impl FromStr for ReplacementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LRU" => Ok(ReplacementPolicy::Lru),
            "LFU" => Ok(ReplacementPolicy::Lfu),
            "FIFO" => Ok(ReplacementPolicy::Fifo),
            "RAND" => Ok(ReplacementPolicy::Random),
            _ => Err(format!(
                "Invalid replacement policy: '{}'. \
                 Expected LRU, LFU, FIFO or RAND.",
                s
            )),
        }
    }
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WB" => Ok(WritePolicy::WriteBack),
            "WT" => Ok(WritePolicy::WriteThrough),
            _ => Err(format!(
                "Invalid write policy: '{}'. Expected 'WB' or 'WT'.",
                s
            )),
        }
    }
}

/// Simulation configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimConfig {
    pub cache: CacheConfig,
    /// Seed for memory contents and random choices; entropy when absent
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl SimConfig {
    /// Parse the arguments after the program name
    pub fn from_args(
        args: impl IntoIterator<Item = String>,
    ) -> SimulatorResult<Self> {
        let mut args = args.into_iter();
        let mut positional: Vec<String> = Vec::new();
        let mut config = SimConfig::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-v" => config.verbose = true,
                "-s" => {
                    let seed = args.next().ok_or_else(|| {
                        usage("You should specify a seed after -s")
                    })?;
                    let parsed = seed.parse().map_err(|_| {
                        usage(&format!("Invalid seed: '{}'", seed))
                    })?;
                    config.seed = Some(parsed);
                }
                _ if arg.starts_with('-') => {
                    return Err(usage(&format!("Unknown parameter: {}", arg)))
                }
                _ => positional.push(arg),
            }
        }

        let [memory, cache, block, mapping, replace, write] =
            positional.as_slice()
        else {
            return Err(usage(&format!(
                "Expected 6 positional arguments, got {}",
                positional.len()
            )));
        };

        config.cache = CacheConfig::make(
            exponent("CACHE", cache)?,
            exponent("MEMORY", memory)?,
            exponent("BLOCK", block)?,
            exponent("MAPPING", mapping)?,
            replace.parse().map_err(|e: String| usage(&e))?,
            write.parse().map_err(|e: String| usage(&e))?,
        );
        config.cache.validate()?;

        Ok(config)
    }
}

/// Parse a base-2 exponent into the size it stands for
fn exponent(name: &str, arg: &str) -> SimulatorResult<usize> {
    let bits: u32 = arg.parse().map_err(|_| {
        usage(&format!(
            "{} must be a non-negative integer, got '{}'",
            name, arg
        ))
    })?;
    1usize
        .checked_shl(bits)
        .filter(|_| bits < usize::BITS - 1)
        .ok_or_else(|| {
            usage(&format!("{} exponent {} is too large", name, bits))
        })
}

fn usage(message: &str) -> SimulatorError {
    SimulatorError::Usage(format!("{}\n\n{}", message, USAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_from_args() {
        let config =
            SimConfig::from_args(args("10 6 3 1 lru WT -v -s 42")).unwrap();
        assert_eq!(
            config.cache,
            CacheConfig::make(
                64,
                1024,
                8,
                2,
                ReplacementPolicy::Lru,
                WritePolicy::WriteThrough
            )
        );
        assert_eq!(config.seed, Some(42));
        assert!(config.verbose);
    }

    #[test]
    fn test_flags_anywhere() {
        let config =
            SimConfig::from_args(args("-s 1 16 8 4 0 RAND WB")).unwrap();
        assert_eq!(config.cache.associativity, 1);
        assert_eq!(config.cache.replacement, ReplacementPolicy::Random);
        assert_eq!(config.seed, Some(1));
        assert!(!config.verbose);
    }

    #[test]
    fn test_bad_args() {
        assert!(matches!(
            SimConfig::from_args(args("10 6 3 1 LRU")),
            Err(SimulatorError::Usage(_))
        ));
        assert!(matches!(
            SimConfig::from_args(args("10 6 3 1 MRU WB")),
            Err(SimulatorError::Usage(_))
        ));
        assert!(matches!(
            SimConfig::from_args(args("10 6 3 x LRU WB")),
            Err(SimulatorError::Usage(_))
        ));
        assert!(matches!(
            SimConfig::from_args(args("10 6 3 1 LRU WB -s")),
            Err(SimulatorError::Usage(_))
        ));
        assert!(matches!(
            SimConfig::from_args(args("10 6 3 1 LRU WB -q")),
            Err(SimulatorError::Usage(_))
        ));
        assert!(matches!(
            SimConfig::from_args(args("99 6 3 1 LRU WB")),
            Err(SimulatorError::Usage(_))
        ));
    }

    #[test]
    fn test_inconsistent_sizes() {
        // 8 lines cannot be 16-way
        assert!(matches!(
            SimConfig::from_args(args("10 6 3 4 LRU WB")),
            Err(SimulatorError::Config(
                ConfigError::AssociativityMismatch { .. }
            ))
        ));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "fifo".parse::<ReplacementPolicy>(),
            Ok(ReplacementPolicy::Fifo)
        );
        assert_eq!(
            "LFU".parse::<ReplacementPolicy>(),
            Ok(ReplacementPolicy::Lfu)
        );
        assert_eq!("wt".parse::<WritePolicy>(), Ok(WritePolicy::WriteThrough));
        assert!("WA".parse::<WritePolicy>().is_err());
    }
}
