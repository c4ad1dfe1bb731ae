//! Interactive commands

use std::str::FromStr;

use crate::error::{CommandError, SimulatorResult};
use crate::format::{bin_str, hex_str};
use crate::memory::cache::get_log_2;
use crate::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Read(usize),
    Write(usize, u8),
    RandRead(usize),
    RandWrite(usize),
    PrintCache(usize, usize),
    PrintMem(usize, usize),
    Stats,
    Quit,
}

/// Parse a decimal, `0x` hexadecimal or `0b` binary number
fn parse_number<T: TryFrom<u64>>(token: &str) -> Result<T, CommandError> {
    let (digits, radix) = if let Some(hex) = token.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = token.strip_prefix("0b") {
        (bin, 2)
    } else {
        (token, 10)
    };
    u64::from_str_radix(digits, radix)
        .ok()
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| {
            CommandError::Syntax(format!("'{}' is not a valid number", token))
        })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let Some((name, params)) = tokens.split_first() else {
            return Err(CommandError::Invalid(String::new()));
        };

        let command = match (*name, params) {
            ("read", [address]) => Command::Read(parse_number(address)?),
            ("write", [address, byte]) => {
                Command::Write(parse_number(address)?, parse_number(byte)?)
            }
            ("randread", [amount]) => Command::RandRead(parse_number(amount)?),
            ("randwrite", [amount]) => {
                Command::RandWrite(parse_number(amount)?)
            }
            ("printcache", [start, amount]) => {
                Command::PrintCache(parse_number(start)?, parse_number(amount)?)
            }
            ("printmem", [start, amount]) => {
                Command::PrintMem(parse_number(start)?, parse_number(amount)?)
            }
            ("stats", []) => Command::Stats,
            ("quit", []) => Command::Quit,
            _ => return Err(CommandError::Invalid(s.trim().to_string())),
        };
        Ok(command)
    }
}

impl Command {
    /// Run the command and return the text to show
    pub fn execute(self, session: &mut Session) -> SimulatorResult<String> {
        let address_len = get_log_2(session.memory.size());
        let output = match self {
            Command::Read(address) => {
                let byte = session.read(address)?;
                format!(
                    "Byte 0x{} read from {}",
                    hex_str(byte as usize, 2),
                    bin_str(address, address_len)
                )
            }
            Command::Write(address, byte) => {
                session.write(address, byte)?;
                format!(
                    "Byte 0x{} written to {}",
                    hex_str(byte as usize, 2),
                    bin_str(address, address_len)
                )
            }
            Command::RandRead(amount) => {
                session.random_reads(amount)?;
                format!("{} bytes read from memory", amount)
            }
            Command::RandWrite(amount) => {
                session.random_writes(amount)?;
                format!("{} bytes written to memory", amount)
            }
            Command::PrintCache(start, amount) => {
                session.cache.dump(start, amount)?
            }
            Command::PrintMem(start, amount) => {
                session.memory.dump(start, amount)?
            }
            Command::Stats => {
                let history = &session.history;
                format!(
                    "Hits: {} | Misses: {} | Writebacks: {}\n\
                     Hit/Miss Ratio: {:.2}%",
                    history.num_hit,
                    history.num_miss,
                    history.num_writeback,
                    history.get_hit_rate() * 100.
                )
            }
            Command::Quit => String::new(),
        };
        Ok(output.trim_end().to_string())
    }
}
