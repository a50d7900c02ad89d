use std::io::Write;

/// Set up `env_logger`. `RUST_LOG`, when present, overrides the flags.
pub fn init_logger(verbose: bool, quiet: bool) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
        return;
    }

    let level = if quiet {
        log::LevelFilter::Error
    } else if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format(|buf, record| {
        if record.level() >= log::Level::Debug {
            writeln!(buf, "[{}] {}", record.level(), record.args())
        } else {
            writeln!(buf, "{}", record.args())
        }
    });

    // Our own crates get debug output; dependencies stay at the base level.
    if verbose {
        builder.filter_module("immprune_core", log::LevelFilter::Debug);
        builder.filter_module("immprune", log::LevelFilter::Debug);
        builder.filter_module("ureq", log::LevelFilter::Info);
    }

    builder.init();
}
