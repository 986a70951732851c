use env_logger::Env;

/// Initialises `env_logger`. `RUST_LOG` wins over the verbosity flag.
///
/// - 0: warnings and errors
/// - 1: info
/// - 2 or more: debug
pub fn init(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_target(false)
        .try_init();
}
