use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(quiet: bool) -> &'static str {
    if quiet {
        "issue_backup=warn"
    } else {
        "issue_backup=info"
    }
}

/// Installs the stderr diagnostics subscriber.
///
/// Issue records go to stdout, so diagnostics must never be written there.
/// `quiet` takes precedence over `RUST_LOG`.
pub fn init(quiet: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if !quiet => filter,
        _ => EnvFilter::new(default_filter(quiet)),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
