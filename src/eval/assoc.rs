
use cache_lib::memory::{CacheConfig, ReplacementPolicy, WritePolicy};
use cache_lib::run_wrapper::{fetch_operations, memory_size_for, run_trace};
use cache_lib::session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = env_logger::Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();

    let param_tokens: Vec<String> = std::env::args().collect();
    let trace_path = param_tokens
        .get(1)
        .ok_or("You should specify exactly one trace file")?;
    let trace_path = std::path::Path::new(trace_path);
    let operations = fetch_operations(trace_path)?;

    // Plot line series for each replacement policy
    // For a fixed cache size, vary the associativity
    // Performance metric: hit rate
    let policies = vec![
        ("LRU", ReplacementPolicy::Lru),
        ("LFU", ReplacementPolicy::Lfu),
        ("FIFO", ReplacementPolicy::Fifo),
        ("RAND", ReplacementPolicy::Random),
    ];
    let associativities = vec![1, 2, 4, 8, 16];
    let memory_size =
        memory_size_for(&operations, CacheConfig::default().memory_size)?;
    let base = CacheConfig {
        memory_size,
        write: WritePolicy::WriteBack,
        ..CacheConfig::default()
    };

    // Propagate the data
    let mut data: Vec<Vec<(usize, f64)>> = vec![vec![]; policies.len()];
    for (i, (_, replacement)) in policies.iter().enumerate() {
        for associativity in associativities.iter() {
            let config = CacheConfig {
                associativity: *associativity,
                replacement: *replacement,
                ..base
            };
            let mut session = Session::zeroed(config, 0)?;
            let history = run_trace(&mut session, &operations)?;
            data[i].push((*associativity, history.get_hit_rate()));
        }
    }

    // Plot the data
    use plotters::prelude::*;

    let trace_base_name = trace_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or("The trace path has no file name")?;
    let plot_title = format!("Hit rate by associativity: {}", trace_base_name);
    let output_path = format!("eval/assoc_eval_{}.svg", trace_base_name);

    let root =
        SVGBackend::new(output_path.as_str(), (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    // Ways are plotted on a log2 axis
    let x_max = associativities.len() as i32 - 1;
    let mut ctx = ChartBuilder::on(&root)
        .caption(plot_title.as_str(), ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..x_max, 0.0..1.0)?;
    ctx.configure_mesh()
        .x_desc("Associativity (ways)")
        .x_label_formatter(&|x| format!("{}", 1 << x))
        .y_desc("Hit rate")
        .draw()?;

    for (i, (name, _)) in policies.iter().enumerate() {
        let series = data[i]
            .iter()
            .map(|(ways, rate)| (ways.trailing_zeros() as i32, *rate));
        let color = Palette99::pick(i).to_rgba();
        ctx.draw_series(LineSeries::new(series, color))?
            .label(*name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color)
            });
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
