use tracing_subscriber::EnvFilter;

/// Which part of the program is running; the relay is chattier by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogProfile {
    Relay,
    Chat,
}

fn default_directive(profile: LogProfile, verbose: u8) -> &'static str {
    match (profile, verbose) {
        (LogProfile::Chat, 0) => "warn",
        (LogProfile::Relay, 0) => "info,tower_http=info",
        (_, 1) => "info,invoicechat=debug,tower_http=debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
/// Logs go to stderr so they never interleave with chat output on stdout.
pub fn init_tracing(profile: LogProfile, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(profile, verbose)));

    // A second init (tests, embedding) is harmless; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(profile == LogProfile::Relay)
        .with_writer(std::io::stderr)
        .try_init();
}
