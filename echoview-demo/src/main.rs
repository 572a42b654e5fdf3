mod cli;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let level = if args.iter().any(|a| a == "--verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match args.get(1).map(String::as_str) {
        Some("--mirror") => cli::run_mirror_hall(),
        Some("--glass") => cli::run_glass_partition(),
        _ => cli::run_all(),
    }
}
