//! Trace replay

use std::path::Path;

use crate::error::{OutOfRangeError, SimulatorError, SimulatorResult};
use crate::memory::AccessType;
use crate::session::{CacheHistory, Session};

/// One access of a trace
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
    pub access: AccessType,
    pub address: usize,
    /// Byte stored by a write
    pub byte: u8,
}

/// Fetch operations from the trace file
pub fn fetch_operations(
    trace_path: &Path,
) -> SimulatorResult<Vec<Operation>> {
    let content = std::fs::read_to_string(trace_path)?;
    parse_operations(trace_path, &content)
}

/// Parse trace text, one `r ADDR` or `w ADDR [BYTE]` per line
pub fn parse_operations(
    trace_path: &Path,
    content: &str,
) -> SimulatorResult<Vec<Operation>> {
    let mut operations: Vec<Operation> = Vec::new();
    let error = |line_num: usize, message: String| {
        SimulatorError::TraceParse(
            trace_path.into(),
            format!("{} at line {}", message, line_num + 1),
        )
    };

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let (access, address_str, byte_str) = match parts.as_slice() {
            ["r", address] => (AccessType::Read, *address, None),
            ["w", address] => (AccessType::Write, *address, None),
            ["w", address, byte] => {
                (AccessType::Write, *address, Some(*byte))
            }
            _ => {
                return Err(error(
                    line_num,
                    format!(
                        "Invalid format '{}': expected 'r ADDR' or \
                         'w ADDR [BYTE]'",
                        line
                    ),
                ))
            }
        };

        let address = address_str
            .strip_prefix("0x")
            .and_then(|hex| usize::from_str_radix(hex, 16).ok())
            .ok_or_else(|| {
                error(
                    line_num,
                    format!(
                        "Invalid address '{}': expected hexadecimal \
                         starting with '0x'",
                        address_str
                    ),
                )
            })?;

        let byte = match byte_str {
            None => 0,
            Some(byte_str) => {
                let parsed = match byte_str.strip_prefix("0x") {
                    Some(hex) => u8::from_str_radix(hex, 16),
                    None => byte_str.parse(),
                };
                parsed.map_err(|_| {
                    error(line_num, format!("Invalid byte '{}'", byte_str))
                })?
            }
        };

        operations.push(Operation {
            access,
            address,
            byte,
        });
    }

    Ok(operations)
}

/// Smallest power-of-two memory that covers every address of the trace,
/// but no smaller than `minimum`
pub fn memory_size_for(
    operations: &[Operation],
    minimum: usize,
) -> SimulatorResult<usize> {
    let mut size = minimum;
    for operation in operations {
        let address = operation.address;
        let needed = address
            .checked_add(1)
            .and_then(usize::checked_next_power_of_two)
            .ok_or(OutOfRangeError::AddressSpace { address })?;
        size = size.max(needed);
    }
    Ok(size)
}

/// Replay a trace and return the counters it produced
pub fn run_trace(
    session: &mut Session,
    operations: &[Operation],
) -> SimulatorResult<CacheHistory> {
    for operation in operations {
        match operation.access {
            AccessType::Read => {
                session.read(operation.address)?;
            }
            AccessType::Write => {
                session.write(operation.address, operation.byte)?;
            }
        }
    }
    Ok(session.history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CacheConfig, ReplacementPolicy, WritePolicy};

    fn parse(content: &str) -> SimulatorResult<Vec<Operation>> {
        parse_operations(Path::new("test.trace"), content)
    }

    #[test]
    fn test_parse_operations() {
        let operations =
            parse("# header\nr 0x10\n\nw 0x1f\n  w 0x20 0xab\nw 0x21 7\n")
                .unwrap();
        assert_eq!(
            operations,
            vec![
                Operation {
                    access: AccessType::Read,
                    address: 0x10,
                    byte: 0
                },
                Operation {
                    access: AccessType::Write,
                    address: 0x1f,
                    byte: 0
                },
                Operation {
                    access: AccessType::Write,
                    address: 0x20,
                    byte: 0xab
                },
                Operation {
                    access: AccessType::Write,
                    address: 0x21,
                    byte: 7
                },
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        let bad_lines = [
            "x 0x10",
            "r 16",
            "r 0xgg",
            "r",
            "r 0x1 2",
            "w 0x1 0x100",
            "w 0x1 -3",
        ];
        for bad in bad_lines {
            match parse(bad) {
                Err(SimulatorError::TraceParse(path, message)) => {
                    assert_eq!(path, Path::new("test.trace"));
                    assert!(message.ends_with("at line 1"), "{}", message);
                }
                other => panic!("expected an error for '{}': {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_memory_size_for() {
        let operations = parse("r 0x10\nw 0x1000\n").unwrap();
        assert_eq!(memory_size_for(&operations, 1024).unwrap(), 0x2000);
        assert_eq!(memory_size_for(&operations, 0x10000).unwrap(), 0x10000);
        assert_eq!(memory_size_for(&[], 64).unwrap(), 64);
    }

    #[test]
    fn test_memory_size_for_top_of_address_space() {
        // No power of two above these fits in a usize
        for address in [usize::MAX, (1 << (usize::BITS - 1)) + 1] {
            let operations = vec![Operation {
                access: AccessType::Read,
                address,
                byte: 0,
            }];
            assert!(matches!(
                memory_size_for(&operations, 1024),
                Err(SimulatorError::OutOfRange(
                    OutOfRangeError::AddressSpace { .. }
                ))
            ));
        }

        let operations = parse("r 0xffffffffffffffff\n").unwrap();
        assert!(memory_size_for(&operations, 1024).is_err());
    }

    #[test]
    fn test_run_trace() {
        let config = CacheConfig::make(
            64,
            1024,
            8,
            2,
            ReplacementPolicy::Fifo,
            WritePolicy::WriteBack,
        );
        let mut session = Session::zeroed(config, 0).unwrap();
        let operations =
            parse("w 0x0 1\nr 0x1\nr 0x40\nr 0x80\nr 0x0\n").unwrap();

        let history = run_trace(&mut session, &operations).unwrap();
        assert_eq!(history.num_hit, 1);
        assert_eq!(history.num_miss, 4);
        // Block 0 was dirty when FIFO pushed it out
        assert_eq!(history.num_writeback, 1);
        assert_eq!(session.memory.get_block(0).unwrap()[0], 1);
    }

    #[test]
    fn test_run_trace_out_of_range() {
        let mut session = Session::zeroed(CacheConfig::default(), 0).unwrap();
        let operations = parse("r 0x10000\n").unwrap();
        assert!(matches!(
            run_trace(&mut session, &operations),
            Err(SimulatorError::OutOfRange(_))
        ));
    }
}
