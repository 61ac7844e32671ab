use env_logger::Env;

/// Environment variable selecting the log level, `info` when unset.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

pub fn init() {
    let env = Env::new().filter_or(LOG_LEVEL_ENV, "info");
    if let Err(e) = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init()
    {
        eprintln!("Failed to initialize logger: {e}");
    }
}
