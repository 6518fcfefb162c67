//! Logging setup for the command line tool

/// Initialize the logger with `default_level`, overridable through RUST_LOG.
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(default_level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "\r[{} {:5} {}] {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .try_init();
}
