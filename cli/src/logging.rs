use tracing_subscriber::EnvFilter;

/// Initialize structured logging on stderr with `RUST_LOG` support.
///
/// Defaults to `neta=info,neta_cli=info,neta_core=info` (or `debug` with
/// `verbose`) when `RUST_LOG` is not set. Subsequent calls are ignored.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("neta={level},neta_cli={level},neta_core={level}"))
    });

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .try_init();
}
