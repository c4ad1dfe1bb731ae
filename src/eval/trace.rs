use std::path::Path;

use cache_lib::memory::{CacheConfig, ReplacementPolicy, WritePolicy};
use cache_lib::run_wrapper::{fetch_operations, memory_size_for, run_trace};
use cache_lib::session::Session;

const REPLACEMENT_POLICIES: [(&str, ReplacementPolicy); 4] = [
    ("LRU", ReplacementPolicy::Lru),
    ("LFU", ReplacementPolicy::Lfu),
    ("FIFO", ReplacementPolicy::Fifo),
    ("RAND", ReplacementPolicy::Random),
];

const WRITE_POLICIES: [(&str, WritePolicy); 2] = [
    ("WB", WritePolicy::WriteBack),
    ("WT", WritePolicy::WriteThrough),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = env_logger::Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();

    let param_tokens: Vec<String> = std::env::args().collect();
    let trace_path = param_tokens
        .get(1)
        .ok_or("You should specify exactly one trace file")?;
    let trace_path = Path::new(trace_path);
    let trace_base_name = trace_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or("The trace path has no file name")?;
    let output_path = format!("eval/trace_eval_{}.csv", trace_base_name);

    let operations = fetch_operations(trace_path)?;
    let base = CacheConfig::default();
    let memory_size = memory_size_for(&operations, base.memory_size)?;

    let mut writer = csv::Writer::from_path(&output_path)?;
    writer.write_record([
        "Replacement",
        "Write",
        "Hits",
        "Misses",
        "Writebacks",
        "Hit rate",
        "Miss rate",
    ])?;

    for (replace_name, replacement) in REPLACEMENT_POLICIES {
        for (write_name, write) in WRITE_POLICIES {
            let config = CacheConfig {
                memory_size,
                replacement,
                write,
                ..base
            };
            let mut session = Session::zeroed(config, 0)?;
            let history = run_trace(&mut session, &operations)?;
            eprintln!(
                "{} {}: {:?}, hit rate {:.3}",
                replace_name,
                write_name,
                history,
                history.get_hit_rate()
            );
            writer.write_record([
                replace_name,
                write_name,
                &history.num_hit.to_string(),
                &history.num_miss.to_string(),
                &history.num_writeback.to_string(),
                &format!("{:.3}", history.get_hit_rate()),
                &format!("{:.3}", history.get_miss_rate()),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}
