use std::io::{self, BufRead, Write};
use std::process;

use cache_lib::command::Command;
use cache_lib::config::SimConfig;
use cache_lib::error::{CommandError, SimulatorError, SimulatorResult};
use cache_lib::memory::cache::get_log_2;
use cache_lib::session::Session;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> SimulatorResult<()> {
    let config = SimConfig::from_args(std::env::args().skip(1))?;

    let default_filter = if config.verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    env_logger::Builder::from_env(env).init();

    let mut session = Session::make(&config)?;
    print_banner(&config);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            // EOF
            println!();
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = line
            .parse::<Command>()
            .map_err(SimulatorError::from)
            .and_then(|command| {
                if command == Command::Quit {
                    return Ok(None);
                }
                command.execute(&mut session).map(Some)
            });

        match result {
            Ok(None) => break,
            Ok(Some(output)) => println!("\n{}\n", output),
            Err(SimulatorError::OutOfRange(e)) => {
                log::debug!("{}", e);
                println!("\nERROR: out of bounds\n");
            }
            Err(SimulatorError::Command(CommandError::Invalid(_))) => {
                println!("\nERROR: invalid command\n")
            }
            Err(SimulatorError::Command(CommandError::Syntax(_))) => {
                println!("\nERROR: incorrect syntax\n")
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn print_banner(config: &SimConfig) {
    let cache = &config.cache;
    let mapping = if cache.associativity == 1 {
        "direct".to_string()
    } else {
        format!("2^{}-way associative", get_log_2(cache.associativity))
    };

    println!(
        "\nMemory size: {} bytes ({} blocks)",
        cache.memory_size,
        cache.memory_size / cache.block_size
    );
    println!(
        "Cache size: {} bytes ({} lines)",
        cache.cache_size,
        cache.line_num()
    );
    println!("Block size: {} bytes", cache.block_size);
    println!("Mapping policy: {}", mapping);
    println!("Replacement policy: {:?}", cache.replacement);
    println!("Write policy: {:?}\n", cache.write);
}
