use log::LevelFilter;

/// Installs the process logger. Later calls are no-ops.
#[cfg(target_os = "android")]
pub fn init(level: LevelFilter) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(level)
            .with_tag("inputbridge"),
    );
}

/// Installs the process logger. `RUST_LOG` overrides the configured level.
#[cfg(not(target_os = "android"))]
pub fn init(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
